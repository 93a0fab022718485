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

//! The gateway connection entry point.
//!
//! A [`Gateway`] binds a signing identity to a [`GatewayService`] connection
//! and is the factory for everything else: networks, contracts, proposals and
//! the reconstruction constructors used by off-line signing flows.

use std::sync::Arc;
use std::time::Duration;

use crate::client::GatewayService;
use crate::error::BuildError;
use crate::identity::{Identity, SigningIdentity};
use crate::network::Network;
use crate::protocol::commit::Commit;
use crate::protocol::proposal::Proposal;
use crate::protocol::transaction::Transaction;
use crate::protos::ProtoConversionError;
use crate::signing::{HashFn, Signer};

const DEFAULT_EVALUATE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_ENDORSE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);
// Commit status legitimately waits out the ledger's commit latency.
const DEFAULT_COMMIT_STATUS_TIMEOUT: Duration = Duration::from_secs(100);

/// Default deadlines applied when a call does not override its timeout.
#[derive(Clone)]
pub(crate) struct DefaultTimeouts {
    pub evaluate: Duration,
    pub endorse: Duration,
    pub submit: Duration,
    pub commit_status: Duration,
}

impl Default for DefaultTimeouts {
    fn default() -> Self {
        DefaultTimeouts {
            evaluate: DEFAULT_EVALUATE_TIMEOUT,
            endorse: DEFAULT_ENDORSE_TIMEOUT,
            submit: DEFAULT_SUBMIT_TIMEOUT,
            commit_status: DEFAULT_COMMIT_STATUS_TIMEOUT,
        }
    }
}

/// State shared read-only by every object created from one `Gateway`.
pub(crate) struct GatewayCore {
    pub(crate) service: Arc<dyn GatewayService>,
    pub(crate) signing_identity: SigningIdentity,
    pub(crate) tls_cert_hash: Vec<u8>,
    pub(crate) timeouts: DefaultTimeouts,
}

/// A client connection to a ledger gateway, bound to one client identity.
pub struct Gateway {
    core: Arc<GatewayCore>,
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::default()
    }

    /// The network (channel) of the given name.
    pub fn network(&self, name: &str) -> Network {
        Network::new(name, self.core.clone())
    }

    pub fn identity(&self) -> &Identity {
        self.core.signing_identity.identity()
    }

    /// Recreate an unsigned (or previously signed) proposal from its
    /// serialized form.
    pub fn new_proposal_from_bytes(&self, bytes: &[u8]) -> Result<Proposal, ProtoConversionError> {
        Proposal::from_bytes(self.core.clone(), bytes)
    }

    /// Recreate a proposal from its serialized form and attach a signature
    /// produced out of process.
    pub fn new_signed_proposal(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<Proposal, ProtoConversionError> {
        let mut proposal = Proposal::from_bytes(self.core.clone(), bytes)?;
        proposal.set_signature(signature);
        Ok(proposal)
    }

    pub fn new_transaction_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<Transaction, ProtoConversionError> {
        Transaction::from_bytes(self.core.clone(), bytes)
    }

    pub fn new_signed_transaction(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<Transaction, ProtoConversionError> {
        let mut transaction = Transaction::from_bytes(self.core.clone(), bytes)?;
        transaction.set_signature(signature);
        Ok(transaction)
    }

    pub fn new_commit_from_bytes(&self, bytes: &[u8]) -> Result<Commit, ProtoConversionError> {
        Commit::from_bytes(self.core.clone(), bytes)
    }

    pub fn new_signed_commit(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<Commit, ProtoConversionError> {
        let mut commit = Commit::from_bytes(self.core.clone(), bytes)?;
        commit.set_signature(signature);
        Ok(commit)
    }
}

/// Assembles a [`Gateway`] from its identity, capabilities and connection.
#[derive(Default)]
pub struct GatewayBuilder {
    identity: Option<Identity>,
    signer: Option<Box<dyn Signer>>,
    hash: Option<HashFn>,
    service: Option<Arc<dyn GatewayService>>,
    tls_cert_hash: Option<Vec<u8>>,
    timeouts: DefaultTimeouts,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        GatewayBuilder::default()
    }

    /// Sets the client identity embedded as the creator of every request.
    pub fn with_identity(mut self, identity: Identity) -> GatewayBuilder {
        self.identity = Some(identity);
        self
    }

    /// Sets the signing capability. Omit it to defer all signing to an
    /// external system via the signed-reconstruction constructors.
    pub fn with_signer(mut self, signer: Box<dyn Signer>) -> GatewayBuilder {
        self.signer = Some(signer);
        self
    }

    /// Sets the digest function; SHA-256 when not set.
    pub fn with_hash(mut self, hash: HashFn) -> GatewayBuilder {
        self.hash = Some(hash);
        self
    }

    /// Sets the transport connection the protocol engine runs against.
    pub fn with_service(mut self, service: Arc<dyn GatewayService>) -> GatewayBuilder {
        self.service = Some(service);
        self
    }

    /// Sets the SHA-256 hash of the client's TLS certificate, embedded in
    /// block-family event requests for channel binding.
    pub fn with_tls_client_certificate_hash(mut self, hash: Vec<u8>) -> GatewayBuilder {
        self.tls_cert_hash = Some(hash);
        self
    }

    pub fn with_evaluate_timeout(mut self, timeout: Duration) -> GatewayBuilder {
        self.timeouts.evaluate = timeout;
        self
    }

    pub fn with_endorse_timeout(mut self, timeout: Duration) -> GatewayBuilder {
        self.timeouts.endorse = timeout;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> GatewayBuilder {
        self.timeouts.submit = timeout;
        self
    }

    pub fn with_commit_status_timeout(mut self, timeout: Duration) -> GatewayBuilder {
        self.timeouts.commit_status = timeout;
        self
    }

    pub fn build(self) -> Result<Gateway, BuildError> {
        let identity = self.identity.ok_or_else(|| {
            BuildError::MissingField("'identity' field is required".to_string())
        })?;
        let service = self.service.ok_or_else(|| {
            BuildError::MissingField("'service' field is required".to_string())
        })?;

        let signing_identity = SigningIdentity::new(identity, self.hash, self.signer);

        Ok(Gateway {
            core: Arc::new(GatewayCore {
                service,
                signing_identity,
                tls_cert_hash: self.tls_cert_hash.unwrap_or_default(),
                timeouts: self.timeouts,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::client::{
        CallOptions, EventSource, RpcCode, RpcStatus,
    };
    use crate::protos::events::{
        BlockAndPrivateDataDeliverResponse, ChaincodeEventsResponse, DeliverResponse,
        FilteredDeliverResponse, SignedChaincodeEventsRequest,
    };
    use crate::protos::gateway::{
        CommitStatusResponse, EndorseRequest, EndorseResponse, Envelope, EvaluateRequest,
        EvaluateResponse, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
    };

    struct UnreachableService;

    impl GatewayService for UnreachableService {
        fn evaluate(
            &self,
            _: EvaluateRequest,
            _: &CallOptions,
        ) -> Result<EvaluateResponse, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn endorse(&self, _: EndorseRequest, _: &CallOptions) -> Result<EndorseResponse, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn submit(&self, _: SubmitRequest, _: &CallOptions) -> Result<SubmitResponse, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn commit_status(
            &self,
            _: SignedCommitStatusRequest,
            _: &CallOptions,
        ) -> Result<CommitStatusResponse, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn chaincode_events(
            &self,
            _: SignedChaincodeEventsRequest,
            _: &CallOptions,
        ) -> Result<Box<dyn EventSource<ChaincodeEventsResponse>>, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn block_events(
            &self,
            _: Envelope,
            _: &CallOptions,
        ) -> Result<Box<dyn EventSource<DeliverResponse>>, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn filtered_block_events(
            &self,
            _: Envelope,
            _: &CallOptions,
        ) -> Result<Box<dyn EventSource<FilteredDeliverResponse>>, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }

        fn block_and_private_data_events(
            &self,
            _: Envelope,
            _: &CallOptions,
        ) -> Result<Box<dyn EventSource<BlockAndPrivateDataDeliverResponse>>, RpcStatus> {
            Err(RpcStatus::new(RpcCode::Unavailable, "not wired"))
        }
    }

    #[test]
    fn build_requires_identity() {
        let result = Gateway::builder()
            .with_service(Arc::new(UnreachableService))
            .build();

        match result {
            Err(BuildError::MissingField(msg)) => assert!(msg.contains("identity")),
            _ => panic!("expected missing identity error"),
        }
    }

    #[test]
    fn build_requires_service() {
        let result = Gateway::builder()
            .with_identity(Identity::new("Org1MSP", b"credentials".to_vec()))
            .build();

        match result {
            Err(BuildError::MissingField(msg)) => assert!(msg.contains("service")),
            _ => panic!("expected missing service error"),
        }
    }

    #[test]
    fn build_with_identity_and_service_succeeds() {
        let gateway = Gateway::builder()
            .with_identity(Identity::new("Org1MSP", b"credentials".to_vec()))
            .with_service(Arc::new(UnreachableService))
            .build()
            .expect("failed to build gateway");

        assert_eq!(gateway.identity().msp_id(), "Org1MSP");
    }
}
