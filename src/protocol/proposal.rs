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

//! Chaincode invocation proposals.

use std::collections::HashMap;
use std::sync::Arc;

use protobuf::{Message, RepeatedField};
use rand::Rng;

use crate::client::CallOptions;
use crate::error::{BuildError, EndorseError, TransactionError};
use crate::gateway::GatewayCore;
use crate::protos::{self, ProtoConversionError};

use super::transaction::Transaction;

const NONCE_LENGTH: usize = 24;

/// An unendorsed request to invoke a chaincode function.
///
/// The transaction ID is derived from a random nonce and the creator
/// identity when the proposal is built and is stable across serialization.
pub struct Proposal {
    core: Arc<GatewayCore>,
    proposed: protos::gateway::ProposedTransaction,
}

impl Proposal {
    pub(crate) fn new(core: Arc<GatewayCore>, proposed: protos::gateway::ProposedTransaction) -> Self {
        Proposal { core, proposed }
    }

    pub(crate) fn from_bytes(
        core: Arc<GatewayCore>,
        bytes: &[u8],
    ) -> Result<Proposal, ProtoConversionError> {
        let proposed = Message::parse_from_bytes(bytes).map_err(|err| {
            ProtoConversionError::DeserializationError(format!(
                "unable to get ProposedTransaction from bytes: {}",
                err
            ))
        })?;
        Ok(Proposal { core, proposed })
    }

    pub fn transaction_id(&self) -> &str {
        self.proposed.get_transaction_id()
    }

    /// The serialized form, suitable for off-line signing round trips.
    pub fn bytes(&self) -> Result<Vec<u8>, ProtoConversionError> {
        self.proposed.write_to_bytes().map_err(|err| {
            ProtoConversionError::SerializationError(format!(
                "unable to get bytes from ProposedTransaction: {}",
                err
            ))
        })
    }

    /// The bytes a signature must cover.
    pub fn digest(&self) -> Vec<u8> {
        self.core
            .signing_identity
            .hash(self.proposed.get_proposal().get_proposal_bytes())
    }

    pub(crate) fn set_signature(&mut self, signature: Vec<u8>) {
        self.proposed.mut_proposal().set_signature(signature);
    }

    fn is_signed(&self) -> bool {
        !self.proposed.get_proposal().get_signature().is_empty()
    }

    /// Signs the proposal unless it already carries a signature.
    fn sign(&mut self) -> Result<(), crate::signing::SigningError> {
        if self.is_signed() {
            return Ok(());
        }
        let signature = self.core.signing_identity.sign(&self.digest())?;
        self.set_signature(signature);
        Ok(())
    }

    /// Evaluates the proposal: the chaincode function runs against the
    /// current ledger state and its result is returned without committing.
    pub fn evaluate(&mut self, options: &CallOptions) -> Result<Vec<u8>, TransactionError> {
        self.sign()
            .map_err(|err| TransactionError::from_signing(self.transaction_id(), err))?;

        let mut request = protos::gateway::EvaluateRequest::new();
        request.set_transaction_id(self.proposed.get_transaction_id().to_string());
        request.set_channel_id(self.proposed.get_channel_id().to_string());
        request.set_proposal(self.proposed.get_proposal().clone());
        request.set_target_organizations(RepeatedField::from_vec(
            self.proposed.get_endorsing_organizations().to_vec(),
        ));

        let call = options.resolve(self.core.timeouts.evaluate);
        let mut response = self
            .core
            .service
            .evaluate(request, &call)
            .map_err(|status| TransactionError::from_rpc(self.transaction_id(), status))?;

        Ok(response.take_result())
    }

    /// Collects endorsements for the proposal, returning the endorsed
    /// transaction ready for submission.
    pub fn endorse(&mut self, options: &CallOptions) -> Result<Transaction, EndorseError> {
        self.sign().map_err(|err| {
            EndorseError::new(TransactionError::from_signing(self.transaction_id(), err))
        })?;

        let mut request = protos::gateway::EndorseRequest::new();
        request.set_transaction_id(self.proposed.get_transaction_id().to_string());
        request.set_channel_id(self.proposed.get_channel_id().to_string());
        request.set_proposal(self.proposed.get_proposal().clone());
        request.set_endorsing_organizations(RepeatedField::from_vec(
            self.proposed.get_endorsing_organizations().to_vec(),
        ));

        let call = options.resolve(self.core.timeouts.endorse);
        let mut response = self
            .core
            .service
            .endorse(request, &call)
            .map_err(|status| {
                EndorseError::new(TransactionError::from_rpc(self.transaction_id(), status))
            })?;

        let mut prepared = protos::gateway::PreparedTransaction::new();
        prepared.set_transaction_id(self.proposed.get_transaction_id().to_string());
        prepared.set_channel_id(self.proposed.get_channel_id().to_string());
        prepared.set_envelope(response.take_prepared_transaction());
        prepared.set_result(response.take_result());

        Ok(Transaction::new(self.core.clone(), prepared))
    }
}

/// Assembles a [`Proposal`] from an invocation's name, arguments, transient
/// data and endorsing-organization allowlist.
pub struct ProposalBuilder {
    core: Arc<GatewayCore>,
    channel_name: String,
    chaincode_name: String,
    transaction_name: String,
    args: Vec<Vec<u8>>,
    transient_data: HashMap<String, Vec<u8>>,
    endorsing_organizations: Vec<String>,
}

impl ProposalBuilder {
    pub(crate) fn new(
        core: Arc<GatewayCore>,
        channel_name: &str,
        chaincode_name: &str,
        transaction_name: &str,
    ) -> Self {
        ProposalBuilder {
            core,
            channel_name: channel_name.to_string(),
            chaincode_name: chaincode_name.to_string(),
            transaction_name: transaction_name.to_string(),
            args: Vec::new(),
            transient_data: HashMap::new(),
            endorsing_organizations: Vec::new(),
        }
    }

    /// Sets UTF-8 string arguments for the invoked function.
    pub fn with_arguments(mut self, args: &[&str]) -> ProposalBuilder {
        self.args = args.iter().map(|arg| arg.as_bytes().to_vec()).collect();
        self
    }

    /// Sets opaque byte arguments for the invoked function.
    pub fn with_raw_arguments(mut self, args: Vec<Vec<u8>>) -> ProposalBuilder {
        self.args = args;
        self
    }

    /// Sets transient data, delivered to endorsing peers but kept out of the
    /// ledger record.
    pub fn with_transient_data(mut self, transient_data: HashMap<String, Vec<u8>>) -> ProposalBuilder {
        self.transient_data = transient_data;
        self
    }

    /// Restricts endorsement to the given organizations, for private-data and
    /// state-based-endorsement scenarios.
    pub fn with_endorsing_organizations(mut self, organizations: &[&str]) -> ProposalBuilder {
        self.endorsing_organizations = organizations.iter().map(|org| org.to_string()).collect();
        self
    }

    pub fn build(self) -> Result<Proposal, BuildError> {
        if self.transaction_name.is_empty() {
            return Err(BuildError::MissingField(
                "'transaction_name' field is required".to_string(),
            ));
        }

        let creator = self.core.signing_identity.creator();
        let creator_bytes = self.core.signing_identity.creator_bytes()?;

        let mut nonce = vec![0u8; NONCE_LENGTH];
        rand::thread_rng().fill(nonce.as_mut_slice());

        let transaction_id = transaction_id(&nonce, &creator_bytes);

        let mut header = protos::gateway::ProposalHeader::new();
        header.set_channel_id(self.channel_name.clone());
        header.set_chaincode_id(self.chaincode_name.clone());
        header.set_transaction_id(transaction_id.clone());
        header.set_nonce(nonce);
        header.set_creator(creator);

        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.transaction_name.into_bytes());
        args.extend(self.args);

        let mut proposal = protos::gateway::Proposal::new();
        proposal.set_header(header);
        proposal.set_args(RepeatedField::from_vec(args));
        proposal.set_transient_data(self.transient_data);

        let proposal_bytes = proposal.write_to_bytes().map_err(|err| {
            BuildError::SerializationError(format!(
                "unable to get bytes from Proposal: {}",
                err
            ))
        })?;

        let mut signed_proposal = protos::gateway::SignedProposal::new();
        signed_proposal.set_proposal_bytes(proposal_bytes);

        let mut proposed = protos::gateway::ProposedTransaction::new();
        proposed.set_transaction_id(transaction_id);
        proposed.set_channel_id(self.channel_name);
        proposed.set_proposal(signed_proposal);
        proposed.set_endorsing_organizations(RepeatedField::from_vec(self.endorsing_organizations));

        Ok(Proposal::new(self.core, proposed))
    }
}

/// Derives a transaction ID from a nonce and the serialized creator.
fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut message = Vec::with_capacity(nonce.len() + creator.len());
    message.extend_from_slice(nonce);
    message.extend_from_slice(creator);
    hex::encode(crate::signing::sha256(&message))
}
