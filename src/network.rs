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

//! Networks (channels) reached through a gateway connection.

use std::sync::Arc;

use crate::contract::Contract;
use crate::event::block::{
    BlockAndPrivateDataEventsBuilder, BlockAndPrivateDataEventsRequest, BlockEventsBuilder,
    BlockEventsRequest, FilteredBlockEventsBuilder, FilteredBlockEventsRequest,
};
use crate::event::chaincode::{ChaincodeEventsBuilder, ChaincodeEventsRequest};
use crate::gateway::GatewayCore;
use crate::protos::ProtoConversionError;

/// A channel on the ledger network, scoping contracts and event streams.
pub struct Network {
    name: String,
    core: Arc<GatewayCore>,
}

impl Network {
    pub(crate) fn new(name: &str, core: Arc<GatewayCore>) -> Self {
        Network {
            name: name.to_string(),
            core,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default contract of the named chaincode.
    pub fn contract(&self, chaincode_name: &str) -> Contract {
        Contract::new(&self.name, chaincode_name, None, self.core.clone())
    }

    /// A named contract within the named chaincode.
    pub fn contract_with_name(&self, chaincode_name: &str, contract_name: &str) -> Contract {
        Contract::new(
            &self.name,
            chaincode_name,
            Some(contract_name.to_string()),
            self.core.clone(),
        )
    }

    /// Begin building a chaincode event stream request for the named
    /// chaincode.
    pub fn chaincode_events(&self, chaincode_name: &str) -> ChaincodeEventsBuilder {
        ChaincodeEventsBuilder::new(self.core.clone(), &self.name, chaincode_name)
    }

    /// Begin building a full-block event stream request.
    pub fn block_events(&self) -> BlockEventsBuilder {
        BlockEventsBuilder::new(self.core.clone(), &self.name)
    }

    /// Begin building a filtered-block event stream request.
    pub fn filtered_block_events(&self) -> FilteredBlockEventsBuilder {
        FilteredBlockEventsBuilder::new(self.core.clone(), &self.name)
    }

    /// Begin building a block-and-private-data event stream request.
    pub fn block_and_private_data_events(&self) -> BlockAndPrivateDataEventsBuilder {
        BlockAndPrivateDataEventsBuilder::new(self.core.clone(), &self.name)
    }

    /// Recreate a chaincode events request from its serialized form.
    pub fn new_chaincode_events_request_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<ChaincodeEventsRequest, ProtoConversionError> {
        ChaincodeEventsRequest::from_bytes(self.core.clone(), bytes)
    }

    /// Recreate a chaincode events request and attach a signature produced
    /// out of process.
    pub fn new_signed_chaincode_events_request(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<ChaincodeEventsRequest, ProtoConversionError> {
        let mut request = ChaincodeEventsRequest::from_bytes(self.core.clone(), bytes)?;
        request.set_signature(signature);
        Ok(request)
    }

    pub fn new_block_events_request_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<BlockEventsRequest, ProtoConversionError> {
        BlockEventsRequest::from_bytes(self.core.clone(), bytes)
    }

    pub fn new_signed_block_events_request(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<BlockEventsRequest, ProtoConversionError> {
        let mut request = BlockEventsRequest::from_bytes(self.core.clone(), bytes)?;
        request.set_signature(signature);
        Ok(request)
    }

    pub fn new_filtered_block_events_request_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<FilteredBlockEventsRequest, ProtoConversionError> {
        FilteredBlockEventsRequest::from_bytes(self.core.clone(), bytes)
    }

    pub fn new_signed_filtered_block_events_request(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<FilteredBlockEventsRequest, ProtoConversionError> {
        let mut request = FilteredBlockEventsRequest::from_bytes(self.core.clone(), bytes)?;
        request.set_signature(signature);
        Ok(request)
    }

    pub fn new_block_and_private_data_events_request_from_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<BlockAndPrivateDataEventsRequest, ProtoConversionError> {
        BlockAndPrivateDataEventsRequest::from_bytes(self.core.clone(), bytes)
    }

    pub fn new_signed_block_and_private_data_events_request(
        &self,
        bytes: &[u8],
        signature: Vec<u8>,
    ) -> Result<BlockAndPrivateDataEventsRequest, ProtoConversionError> {
        let mut request = BlockAndPrivateDataEventsRequest::from_bytes(self.core.clone(), bytes)?;
        request.set_signature(signature);
        Ok(request)
    }
}
