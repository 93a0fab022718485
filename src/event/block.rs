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

//! Block event streams: full blocks, filtered blocks, and blocks with
//! private data.
//!
//! All three streams share one request envelope shape; the RPC opened
//! selects the response message. A delivery message that is not a block
//! (a status message, typically) ends useful delivery: the stream emits a
//! default-valued item for it and for everything after it, until the
//! transport closes.

use std::sync::Arc;

use protobuf::Message;

use crate::checkpoint::Checkpoint;
use crate::client::CallOptions;
use crate::error::BuildError;
use crate::gateway::GatewayCore;
use crate::protos::{self, ProtoConversionError};

use super::{start_receive_loop, EventError, EventStream};

fn resolve_start_position(
    start_block: Option<u64>,
    checkpoint: Option<&(u64, String)>,
) -> protos::events::SeekPosition {
    let mut start_position = protos::events::SeekPosition::new();

    match checkpoint {
        Some((block_number, transaction_id))
            if *block_number != 0 || !transaction_id.is_empty() =>
        {
            let mut specified = protos::events::SeekSpecified::new();
            specified.set_number(*block_number);
            start_position.set_specified(specified);
        }
        _ => match start_block {
            Some(block_number) => {
                let mut specified = protos::events::SeekSpecified::new();
                specified.set_number(block_number);
                start_position.set_specified(specified);
            }
            None => start_position.set_next_commit(protos::events::SeekNextCommit::new()),
        },
    }

    start_position
}

fn build_envelope(
    core: &GatewayCore,
    channel_name: String,
    start_position: protos::events::SeekPosition,
) -> Result<protos::gateway::Envelope, BuildError> {
    let mut seek_info = protos::events::SeekInfo::new();
    seek_info.set_start(start_position);

    let mut request = protos::events::BlockEventsRequest::new();
    request.set_channel_id(channel_name);
    request.set_identity(core.signing_identity.creator());
    request.set_tls_cert_hash(core.tls_cert_hash.clone());
    request.set_seek_info(seek_info);

    let payload = request.write_to_bytes().map_err(|err| {
        BuildError::SerializationError(format!(
            "unable to get bytes from BlockEventsRequest: {}",
            err
        ))
    })?;

    let mut envelope = protos::gateway::Envelope::new();
    envelope.set_payload(payload);
    Ok(envelope)
}

macro_rules! block_events_builder {
    ($builder:ident, $request:ident) => {
        pub struct $builder {
            core: Arc<GatewayCore>,
            channel_name: String,
            start_block: Option<u64>,
            checkpoint: Option<(u64, String)>,
        }

        impl $builder {
            pub(crate) fn new(core: Arc<GatewayCore>, channel_name: &str) -> Self {
                $builder {
                    core,
                    channel_name: channel_name.to_string(),
                    start_block: None,
                    checkpoint: None,
                }
            }

            /// Replay from the given block number instead of the next commit.
            pub fn with_start_block(mut self, block_number: u64) -> $builder {
                self.start_block = Some(block_number);
                self
            }

            /// Resume from the position a checkpoint has recorded. A
            /// checkpoint with no recorded progress defers to the other
            /// settings.
            pub fn with_checkpoint(mut self, checkpoint: &dyn Checkpoint) -> $builder {
                self.checkpoint = Some((
                    checkpoint.block_number(),
                    checkpoint.transaction_id().to_string(),
                ));
                self
            }

            pub fn build(self) -> Result<$request, BuildError> {
                let start_position =
                    resolve_start_position(self.start_block, self.checkpoint.as_ref());
                let envelope = build_envelope(&self.core, self.channel_name, start_position)?;
                Ok($request {
                    core: self.core,
                    envelope,
                })
            }
        }
    };
}

macro_rules! block_events_request {
    ($request:ident) => {
        impl $request {
            pub(crate) fn from_bytes(
                core: Arc<GatewayCore>,
                bytes: &[u8],
            ) -> Result<$request, ProtoConversionError> {
                let envelope = Message::parse_from_bytes(bytes).map_err(|err| {
                    ProtoConversionError::DeserializationError(format!(
                        "unable to get Envelope from bytes: {}",
                        err
                    ))
                })?;
                Ok($request { core, envelope })
            }

            /// The serialized form, suitable for off-line signing round trips.
            pub fn bytes(&self) -> Result<Vec<u8>, ProtoConversionError> {
                self.envelope.write_to_bytes().map_err(|err| {
                    ProtoConversionError::SerializationError(format!(
                        "unable to get bytes from Envelope: {}",
                        err
                    ))
                })
            }

            /// The bytes a signature must cover.
            pub fn digest(&self) -> Vec<u8> {
                self.core.signing_identity.hash(self.envelope.get_payload())
            }

            pub(crate) fn set_signature(&mut self, signature: Vec<u8>) {
                self.envelope.set_signature(signature);
            }

            fn is_signed(&self) -> bool {
                !self.envelope.get_signature().is_empty()
            }

            fn sign(&mut self) -> Result<(), crate::signing::SigningError> {
                if self.is_signed() {
                    return Ok(());
                }
                let signature = self.core.signing_identity.sign(&self.digest())?;
                self.set_signature(signature);
                Ok(())
            }
        }
    };
}

block_events_builder!(BlockEventsBuilder, BlockEventsRequest);
block_events_builder!(FilteredBlockEventsBuilder, FilteredBlockEventsRequest);
block_events_builder!(
    BlockAndPrivateDataEventsBuilder,
    BlockAndPrivateDataEventsRequest
);

/// A built full-block events request, signable off-line before opening the
/// stream.
pub struct BlockEventsRequest {
    core: Arc<GatewayCore>,
    envelope: protos::gateway::Envelope,
}

block_events_request!(BlockEventsRequest);

impl BlockEventsRequest {
    /// Opens the stream and returns it. Streams carry no default deadline;
    /// only an explicit timeout or the cancellation token bounds them.
    pub fn events(
        mut self,
        options: &CallOptions,
    ) -> Result<EventStream<protos::events::Block>, EventError> {
        self.sign()?;

        let source = self
            .core
            .service
            .block_events(self.envelope.clone(), options)?;

        let mut terminated = false;
        start_receive_loop(
            "block-events",
            source,
            options.cancellation().clone(),
            move |mut response: protos::events::DeliverResponse| {
                if !terminated && response.has_block() {
                    vec![response.take_block()]
                } else {
                    terminated = true;
                    vec![protos::events::Block::new()]
                }
            },
        )
    }
}

/// A built filtered-block events request.
pub struct FilteredBlockEventsRequest {
    core: Arc<GatewayCore>,
    envelope: protos::gateway::Envelope,
}

block_events_request!(FilteredBlockEventsRequest);

impl FilteredBlockEventsRequest {
    pub fn events(
        mut self,
        options: &CallOptions,
    ) -> Result<EventStream<protos::events::FilteredBlock>, EventError> {
        self.sign()?;

        let source = self
            .core
            .service
            .filtered_block_events(self.envelope.clone(), options)?;

        let mut terminated = false;
        start_receive_loop(
            "filtered-block-events",
            source,
            options.cancellation().clone(),
            move |mut response: protos::events::FilteredDeliverResponse| {
                if !terminated && response.has_block() {
                    vec![response.take_block()]
                } else {
                    terminated = true;
                    vec![protos::events::FilteredBlock::new()]
                }
            },
        )
    }
}

/// A built block-and-private-data events request.
pub struct BlockAndPrivateDataEventsRequest {
    core: Arc<GatewayCore>,
    envelope: protos::gateway::Envelope,
}

block_events_request!(BlockAndPrivateDataEventsRequest);

impl BlockAndPrivateDataEventsRequest {
    pub fn events(
        mut self,
        options: &CallOptions,
    ) -> Result<EventStream<protos::events::BlockAndPrivateData>, EventError> {
        self.sign()?;

        let source = self
            .core
            .service
            .block_and_private_data_events(self.envelope.clone(), options)?;

        let mut terminated = false;
        start_receive_loop(
            "block-and-private-data-events",
            source,
            options.cancellation().clone(),
            move |mut response: protos::events::BlockAndPrivateDataDeliverResponse| {
                if !terminated && response.has_block() {
                    vec![response.take_block()]
                } else {
                    terminated = true;
                    vec![protos::events::BlockAndPrivateData::new()]
                }
            },
        )
    }
}
