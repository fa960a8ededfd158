//! Partition layout: per-partition state arrays and their boundaries
//!
//! # Format
//!
//! ```text
//! ┌─────────┬─────────────┬──────────────────────────┬─────────┬─────┐
//! │ "RCPL"  │ version u32 │ header (bincode)         │ block 0 │ ... │
//! │ 4 bytes │ LE          │ total states, partitions │         │     │
//! └─────────┴─────────────┴──────────────────────────┴─────────┴─────┘
//! ```
//!
//! Each block holds the partition's own states followed by its boundary
//! states, both bincode-encoded through serde.

use std::io::{Read, Write};

use bincode::config;
use reachcert_partition::Partitioning;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CheckError, Result};
use crate::reached::ReachedSet;

/// Leading bytes of a persisted layout
pub const LAYOUT_MAGIC: [u8; 4] = *b"RCPL";

/// Current layout format version
pub const LAYOUT_VERSION: u32 = 1;

/// States of one partition plus the external states its nodes lead to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionBlock<S> {
    /// States the partition is responsible for
    pub own: Vec<S>,
    /// Successor states owned by other partitions
    pub boundary: Vec<S>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct LayoutHeader {
    total_state_count: usize,
    partition_count: usize,
}

/// A certificate split into partitions, ready to be checked or persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionLayout<S> {
    /// Number of states in the original certificate
    pub total_state_count: usize,
    /// One block per partition
    pub partitions: Vec<PartitionBlock<S>>,
}

impl<S: Clone> PartitionLayout<S> {
    /// Derive the blocks for a partitioning of a certificate
    ///
    /// Empty partitions are skipped.
    ///
    /// # Errors
    ///
    /// [`CheckError::Partition`] if the partitioning does not exactly cover
    /// the certificate's states.
    pub fn compute(reached: &ReachedSet<S>, partitioning: &Partitioning) -> Result<Self> {
        let graph = reached.to_weighted_graph()?;
        partitioning.validate(reached.len())?;

        let states = reached.states();
        let mut partitions = Vec::with_capacity(partitioning.len());
        for (index, part) in partitioning.parts().iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let boundary = partitioning.boundary(&graph, index)?;
            partitions.push(PartitionBlock {
                own: part.iter().map(|&v| states[v].clone()).collect(),
                boundary: boundary.iter().map(|&v| states[v].clone()).collect(),
            });
        }

        debug!(
            partitions = partitions.len(),
            states = reached.len(),
            boundary = partitions.iter().map(|b| b.boundary.len()).sum::<usize>(),
            "computed partition layout"
        );
        Ok(Self {
            total_state_count: reached.len(),
            partitions,
        })
    }
}

impl<S> PartitionLayout<S> {
    /// Number of partitions
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of own states across all partitions
    pub fn own_state_count(&self) -> usize {
        self.partitions.iter().map(|b| b.own.len()).sum()
    }
}

impl<S: Serialize> PartitionLayout<S> {
    /// Persist the layout
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&LAYOUT_MAGIC)?;
        writer.write_all(&LAYOUT_VERSION.to_le_bytes())?;

        let header = LayoutHeader {
            total_state_count: self.total_state_count,
            partition_count: self.partitions.len(),
        };
        bincode::serde::encode_into_std_write(header, &mut writer, config::standard())?;
        for block in &self.partitions {
            bincode::serde::encode_into_std_write(block, &mut writer, config::standard())?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<S: DeserializeOwned> PartitionLayout<S> {
    /// Read a layout written by [`PartitionLayout::write_to`]
    ///
    /// # Errors
    ///
    /// [`CheckError::Format`] for a wrong magic or an unknown version.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != LAYOUT_MAGIC {
            return Err(CheckError::Format(format!("unexpected magic {magic:?}")));
        }
        let mut version = [0u8; 4];
        reader.read_exact(&mut version)?;
        let version = u32::from_le_bytes(version);
        if version != LAYOUT_VERSION {
            return Err(CheckError::Format(format!(
                "unsupported version {version} (expected {LAYOUT_VERSION})"
            )));
        }

        let header: LayoutHeader = bincode::serde::decode_from_std_read(&mut reader, config::standard())?;
        let mut partitions = Vec::with_capacity(header.partition_count.min(1 << 16));
        for _ in 0..header.partition_count {
            let block: PartitionBlock<S> =
                bincode::serde::decode_from_std_read(&mut reader, config::standard())?;
            partitions.push(block);
        }
        Ok(Self {
            total_state_count: header.total_state_count,
            partitions,
        })
    }
}
