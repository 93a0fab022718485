/*
 * Copyright 2024 Cargill Incorporated
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 * -----------------------------------------------------------------------------
 */

//! Checkpointing for resumable event streams.
//!
//! A checkpoint records the reader's progress through a channel's event
//! history. Completing a block advances to the start of the next block;
//! completing a transaction within a block stays on that block so a resumed
//! stream can skip past events already processed.

mod file;

use std::error::Error as StdError;
use std::fmt;

use crate::event::chaincode::ChaincodeEvent;

pub use file::FileCheckpointer;

/// Read-only view of stream progress, consumed by the event builders.
pub trait Checkpoint {
    /// The block to resume from; zero with an empty transaction ID means no
    /// progress has been recorded.
    fn block_number(&self) -> u64;

    /// The last processed transaction within the block, or empty if the
    /// position is a block boundary.
    fn transaction_id(&self) -> &str;
}

/// Records stream progress as events are processed.
pub trait Checkpointer: Checkpoint {
    /// Marks an entire block as processed, moving the position to the start
    /// of the following block.
    fn checkpoint_block(&mut self, block_number: u64) -> Result<(), CheckpointError>;

    /// Marks a transaction within a block as processed.
    fn checkpoint_transaction(
        &mut self,
        block_number: u64,
        transaction_id: &str,
    ) -> Result<(), CheckpointError>;

    /// Marks a chaincode event as processed, positioning after its
    /// transaction.
    fn checkpoint_chaincode_event(&mut self, event: &ChaincodeEvent) -> Result<(), CheckpointError> {
        self.checkpoint_transaction(event.block_number(), event.transaction_id())
    }
}

/// Volatile progress tracking, lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointer {
    block_number: u64,
    transaction_id: String,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checkpoint for InMemoryCheckpointer {
    fn block_number(&self) -> u64 {
        self.block_number
    }

    fn transaction_id(&self) -> &str {
        &self.transaction_id
    }
}

impl Checkpointer for InMemoryCheckpointer {
    fn checkpoint_block(&mut self, block_number: u64) -> Result<(), CheckpointError> {
        self.block_number = block_number + 1;
        self.transaction_id.clear();
        Ok(())
    }

    fn checkpoint_transaction(
        &mut self,
        block_number: u64,
        transaction_id: &str,
    ) -> Result<(), CheckpointError> {
        self.block_number = block_number;
        self.transaction_id = transaction_id.to_string();
        Ok(())
    }
}

/// Errors raised while persisting checkpoint state.
#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
}

impl StdError for CheckpointError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CheckpointError::Io(err) => Some(err),
            CheckpointError::Serialization(err) => Some(err),
        }
    }
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CheckpointError::Io(err) => write!(f, "checkpoint I/O failed: {}", err),
            CheckpointError::Serialization(err) => {
                write!(f, "checkpoint state was not valid JSON: {}", err)
            }
        }
    }
}

impl From<std::io::Error> for CheckpointError {
    fn from(err: std::io::Error) -> Self {
        CheckpointError::Io(err)
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(err: serde_json::Error) -> Self {
        CheckpointError::Serialization(err)
    }
}
