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

//! Endorsed transactions, ready for submission to the ordering service.

use std::fmt;
use std::sync::Arc;

use protobuf::Message;

use crate::client::CallOptions;
use crate::error::{SubmitError, TransactionError};
use crate::gateway::GatewayCore;
use crate::protos::{self, ProtoConversionError};

use super::commit::Commit;

/// A proposal plus sufficient endorsements, produced only by a successful
/// [`Proposal::endorse`](super::proposal::Proposal::endorse).
///
/// A successful submit means the ordering service accepted the envelope; it
/// does not imply the transaction will commit successfully.
pub struct Transaction {
    core: Arc<GatewayCore>,
    prepared: protos::gateway::PreparedTransaction,
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("prepared", &self.prepared)
            .finish_non_exhaustive()
    }
}

impl Transaction {
    pub(crate) fn new(
        core: Arc<GatewayCore>,
        prepared: protos::gateway::PreparedTransaction,
    ) -> Self {
        Transaction { core, prepared }
    }

    pub(crate) fn from_bytes(
        core: Arc<GatewayCore>,
        bytes: &[u8],
    ) -> Result<Transaction, ProtoConversionError> {
        let prepared = Message::parse_from_bytes(bytes).map_err(|err| {
            ProtoConversionError::DeserializationError(format!(
                "unable to get PreparedTransaction from bytes: {}",
                err
            ))
        })?;
        Ok(Transaction { core, prepared })
    }

    pub fn transaction_id(&self) -> &str {
        self.prepared.get_transaction_id()
    }

    /// The invocation result attached at endorsement time.
    pub fn result(&self) -> &[u8] {
        self.prepared.get_result()
    }

    /// The serialized form, suitable for off-line signing round trips.
    pub fn bytes(&self) -> Result<Vec<u8>, ProtoConversionError> {
        self.prepared.write_to_bytes().map_err(|err| {
            ProtoConversionError::SerializationError(format!(
                "unable to get bytes from PreparedTransaction: {}",
                err
            ))
        })
    }

    /// The bytes a signature must cover.
    pub fn digest(&self) -> Vec<u8> {
        self.core
            .signing_identity
            .hash(self.prepared.get_envelope().get_payload())
    }

    pub(crate) fn set_signature(&mut self, signature: Vec<u8>) {
        self.prepared.mut_envelope().set_signature(signature);
    }

    fn is_signed(&self) -> bool {
        !self.prepared.get_envelope().get_signature().is_empty()
    }

    fn sign(&mut self) -> Result<(), crate::signing::SigningError> {
        if self.is_signed() {
            return Ok(());
        }
        let signature = self.core.signing_identity.sign(&self.digest())?;
        self.set_signature(signature);
        Ok(())
    }

    /// Submits the endorsed envelope to the ordering service, returning a
    /// commit handle bound to the same transaction ID and channel.
    pub fn submit(&mut self, options: &CallOptions) -> Result<Commit, SubmitError> {
        self.sign().map_err(|err| {
            SubmitError::new(TransactionError::from_signing(self.transaction_id(), err))
        })?;

        let mut request = protos::gateway::SubmitRequest::new();
        request.set_transaction_id(self.prepared.get_transaction_id().to_string());
        request.set_channel_id(self.prepared.get_channel_id().to_string());
        request.set_prepared_transaction(self.prepared.get_envelope().clone());

        let call = options.resolve(self.core.timeouts.submit);
        self.core
            .service
            .submit(request, &call)
            .map_err(|status| {
                SubmitError::new(TransactionError::from_rpc(self.transaction_id(), status))
            })?;

        let mut status_request = protos::gateway::CommitStatusRequest::new();
        status_request.set_channel_id(self.prepared.get_channel_id().to_string());
        status_request.set_transaction_id(self.prepared.get_transaction_id().to_string());
        status_request.set_identity(self.core.signing_identity.creator());

        let request_bytes = status_request.write_to_bytes().map_err(|err| {
            SubmitError::new(TransactionError::from_serialization(
                self.transaction_id(),
                ProtoConversionError::SerializationError(format!(
                    "unable to get bytes from CommitStatusRequest: {}",
                    err
                )),
            ))
        })?;

        let mut signed_request = protos::gateway::SignedCommitStatusRequest::new();
        signed_request.set_request(request_bytes);

        Ok(Commit::new(
            self.core.clone(),
            signed_request,
            self.prepared.get_transaction_id().to_string(),
        ))
    }
}
