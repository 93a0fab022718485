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

//! Commit handles for querying a submitted transaction's final outcome.

use std::sync::Arc;

use protobuf::Message;

use crate::client::CallOptions;
use crate::error::{CommitStatusError, TransactionError};
use crate::gateway::GatewayCore;
use crate::protos::{self, gateway::TxValidationCode, ProtoConversionError};

/// Tracks a submitted transaction until its validation outcome is known.
pub struct Commit {
    core: Arc<GatewayCore>,
    signed_request: protos::gateway::SignedCommitStatusRequest,
    transaction_id: String,
}

impl Commit {
    pub(crate) fn new(
        core: Arc<GatewayCore>,
        signed_request: protos::gateway::SignedCommitStatusRequest,
        transaction_id: String,
    ) -> Self {
        Commit {
            core,
            signed_request,
            transaction_id,
        }
    }

    pub(crate) fn from_bytes(
        core: Arc<GatewayCore>,
        bytes: &[u8],
    ) -> Result<Commit, ProtoConversionError> {
        let signed_request: protos::gateway::SignedCommitStatusRequest =
            Message::parse_from_bytes(bytes).map_err(|err| {
                ProtoConversionError::DeserializationError(format!(
                    "unable to get SignedCommitStatusRequest from bytes: {}",
                    err
                ))
            })?;
        let request: protos::gateway::CommitStatusRequest =
            Message::parse_from_bytes(signed_request.get_request()).map_err(|err| {
                ProtoConversionError::DeserializationError(format!(
                    "unable to get CommitStatusRequest from bytes: {}",
                    err
                ))
            })?;
        Ok(Commit {
            core,
            signed_request,
            transaction_id: request.get_transaction_id().to_string(),
        })
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// The serialized form, suitable for off-line signing round trips.
    pub fn bytes(&self) -> Result<Vec<u8>, ProtoConversionError> {
        self.signed_request.write_to_bytes().map_err(|err| {
            ProtoConversionError::SerializationError(format!(
                "unable to get bytes from SignedCommitStatusRequest: {}",
                err
            ))
        })
    }

    /// The bytes a signature must cover.
    pub fn digest(&self) -> Vec<u8> {
        self.core
            .signing_identity
            .hash(self.signed_request.get_request())
    }

    pub(crate) fn set_signature(&mut self, signature: Vec<u8>) {
        self.signed_request.set_signature(signature);
    }

    fn is_signed(&self) -> bool {
        !self.signed_request.get_signature().is_empty()
    }

    fn sign(&mut self) -> Result<(), crate::signing::SigningError> {
        if self.is_signed() {
            return Ok(());
        }
        let signature = self.core.signing_identity.sign(&self.digest())?;
        self.set_signature(signature);
        Ok(())
    }

    /// Blocks until the transaction's validation outcome is available, or the
    /// call's deadline expires.
    pub fn status(&mut self, options: &CallOptions) -> Result<Status, CommitStatusError> {
        self.sign().map_err(|err| {
            CommitStatusError::new(TransactionError::from_signing(&self.transaction_id, err))
        })?;

        let call = options.resolve(self.core.timeouts.commit_status);
        let response = self
            .core
            .service
            .commit_status(self.signed_request.clone(), &call)
            .map_err(|status| {
                CommitStatusError::new(TransactionError::from_rpc(&self.transaction_id, status))
            })?;

        Ok(Status {
            code: response.get_result(),
            transaction_id: self.transaction_id.clone(),
            block_number: response.get_block_number(),
        })
    }
}

/// The final validation outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: TxValidationCode,
    transaction_id: String,
    block_number: u64,
}

impl Status {
    pub fn code(&self) -> TxValidationCode {
        self.code
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// The block in which the transaction was recorded, valid or not.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Only `VALID` transactions update the ledger; any other code means the
    /// transaction was recorded but its effects were discarded.
    pub fn is_successful(&self) -> bool {
        self.code == TxValidationCode::VALID
    }
}
