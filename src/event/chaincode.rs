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

//! Chaincode event streams.

use std::sync::Arc;

use protobuf::Message;

use crate::checkpoint::Checkpoint;
use crate::client::CallOptions;
use crate::error::BuildError;
use crate::gateway::GatewayCore;
use crate::protos::{self, ProtoConversionError};

use super::{start_receive_loop, EventError, EventStream};

/// An event emitted by a chaincode transaction, tagged with the block that
/// committed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    block_number: u64,
    transaction_id: String,
    chaincode_name: String,
    event_name: String,
    payload: Vec<u8>,
}

impl ChaincodeEvent {
    pub(crate) fn new(
        block_number: u64,
        transaction_id: &str,
        chaincode_name: &str,
        event_name: &str,
        payload: Vec<u8>,
    ) -> Self {
        ChaincodeEvent {
            block_number,
            transaction_id: transaction_id.to_string(),
            chaincode_name: chaincode_name.to_string(),
            event_name: event_name.to_string(),
            payload,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn chaincode_name(&self) -> &str {
        &self.chaincode_name
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Assembles a signable chaincode events request.
///
/// Start position precedence, lowest to highest: the default of
/// next-committed-block, an explicit start block, then a checkpoint that has
/// recorded progress. A checkpoint with no recorded progress defers to the
/// other settings.
pub struct ChaincodeEventsBuilder {
    core: Arc<GatewayCore>,
    channel_name: String,
    chaincode_name: String,
    start_block: Option<u64>,
    checkpoint: Option<(u64, String)>,
}

impl ChaincodeEventsBuilder {
    pub(crate) fn new(core: Arc<GatewayCore>, channel_name: &str, chaincode_name: &str) -> Self {
        ChaincodeEventsBuilder {
            core,
            channel_name: channel_name.to_string(),
            chaincode_name: chaincode_name.to_string(),
            start_block: None,
            checkpoint: None,
        }
    }

    /// Replay from the given block number instead of the next commit.
    pub fn with_start_block(mut self, block_number: u64) -> ChaincodeEventsBuilder {
        self.start_block = Some(block_number);
        self
    }

    /// Resume from the position a checkpoint has recorded. The position is
    /// snapshotted here; later checkpoint updates do not affect this request.
    pub fn with_checkpoint(mut self, checkpoint: &dyn Checkpoint) -> ChaincodeEventsBuilder {
        self.checkpoint = Some((
            checkpoint.block_number(),
            checkpoint.transaction_id().to_string(),
        ));
        self
    }

    pub fn build(self) -> Result<ChaincodeEventsRequest, BuildError> {
        let mut start_position = protos::events::SeekPosition::new();
        let mut after_transaction_id = String::new();

        match &self.checkpoint {
            Some((block_number, transaction_id))
                if *block_number != 0 || !transaction_id.is_empty() =>
            {
                let mut specified = protos::events::SeekSpecified::new();
                specified.set_number(*block_number);
                start_position.set_specified(specified);
                after_transaction_id = transaction_id.clone();
            }
            _ => match self.start_block {
                Some(block_number) => {
                    let mut specified = protos::events::SeekSpecified::new();
                    specified.set_number(block_number);
                    start_position.set_specified(specified);
                }
                None => start_position.set_next_commit(protos::events::SeekNextCommit::new()),
            },
        }

        let mut request = protos::events::ChaincodeEventsRequest::new();
        request.set_channel_id(self.channel_name);
        request.set_chaincode_id(self.chaincode_name);
        request.set_identity(self.core.signing_identity.creator());
        request.set_start_position(start_position);
        request.set_after_transaction_id(after_transaction_id);

        let request_bytes = request.write_to_bytes().map_err(|err| {
            BuildError::SerializationError(format!(
                "unable to get bytes from ChaincodeEventsRequest: {}",
                err
            ))
        })?;

        let mut signed_request = protos::events::SignedChaincodeEventsRequest::new();
        signed_request.set_request(request_bytes);

        Ok(ChaincodeEventsRequest {
            core: self.core,
            signed_request,
        })
    }
}

/// A built chaincode events request, signable off-line before opening the
/// stream.
pub struct ChaincodeEventsRequest {
    core: Arc<GatewayCore>,
    signed_request: protos::events::SignedChaincodeEventsRequest,
}

impl ChaincodeEventsRequest {
    pub(crate) fn from_bytes(
        core: Arc<GatewayCore>,
        bytes: &[u8],
    ) -> Result<ChaincodeEventsRequest, ProtoConversionError> {
        let signed_request = Message::parse_from_bytes(bytes).map_err(|err| {
            ProtoConversionError::DeserializationError(format!(
                "unable to get SignedChaincodeEventsRequest from bytes: {}",
                err
            ))
        })?;
        Ok(ChaincodeEventsRequest {
            core,
            signed_request,
        })
    }

    /// The serialized form, suitable for off-line signing round trips.
    pub fn bytes(&self) -> Result<Vec<u8>, ProtoConversionError> {
        self.signed_request.write_to_bytes().map_err(|err| {
            ProtoConversionError::SerializationError(format!(
                "unable to get bytes from SignedChaincodeEventsRequest: {}",
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

    /// Opens the stream and returns it. Streams carry no default deadline;
    /// only an explicit timeout or the cancellation token bounds them.
    pub fn events(mut self, options: &CallOptions) -> Result<EventStream<ChaincodeEvent>, EventError> {
        self.sign()?;

        let source = self
            .core
            .service
            .chaincode_events(self.signed_request.clone(), options)?;

        start_receive_loop(
            "chaincode-events",
            source,
            options.cancellation().clone(),
            |mut response: protos::events::ChaincodeEventsResponse| {
                let block_number = response.get_block_number();
                response
                    .take_events()
                    .into_iter()
                    .map(|mut event| ChaincodeEvent {
                        block_number,
                        transaction_id: event.take_transaction_id(),
                        chaincode_name: event.take_chaincode_id(),
                        event_name: event.take_event_name(),
                        payload: event.take_payload(),
                    })
                    .collect()
            },
        )
    }
}
