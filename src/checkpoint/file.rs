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

//! File-backed checkpoint persistence.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Checkpoint, CheckpointError, Checkpointer};

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    #[serde(rename = "blockNumber")]
    block_number: u64,
    #[serde(rename = "transactionId")]
    transaction_id: String,
}

/// Checkpoint state persisted to a JSON file, durable across restarts.
///
/// Every recorded position is written through and fsynced before the call
/// returns, so a crash never loses acknowledged progress.
#[derive(Debug)]
pub struct FileCheckpointer {
    path: PathBuf,
    state: State,
}

impl FileCheckpointer {
    /// Opens or creates the checkpoint file at `path`.
    ///
    /// An existing file must hold previously saved state; a file that cannot
    /// be parsed is an error rather than a silent reset. The state is written
    /// back immediately so an unusable location fails here, not on the first
    /// event.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let file = File::open(&path)?;
            serde_json::from_reader(file)?
        } else {
            State::default()
        };

        let mut checkpointer = FileCheckpointer { path, state };
        checkpointer.save()?;
        Ok(checkpointer)
    }

    fn save(&mut self) -> Result<(), CheckpointError> {
        let contents = serde_json::to_vec(&self.state)?;
        let mut file = File::create(&self.path)?;
        file.write_all(&contents)?;
        file.sync_all()?;
        Ok(())
    }
}

impl Checkpoint for FileCheckpointer {
    fn block_number(&self) -> u64 {
        self.state.block_number
    }

    fn transaction_id(&self) -> &str {
        &self.state.transaction_id
    }
}

impl Checkpointer for FileCheckpointer {
    fn checkpoint_block(&mut self, block_number: u64) -> Result<(), CheckpointError> {
        self.state.block_number = block_number + 1;
        self.state.transaction_id.clear();
        self.save()
    }

    fn checkpoint_transaction(
        &mut self,
        block_number: u64,
        transaction_id: &str,
    ) -> Result<(), CheckpointError> {
        self.state.block_number = block_number;
        self.state.transaction_id = transaction_id.to_string();
        self.save()
    }
}
