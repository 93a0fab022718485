// Copyright 2024 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared test fixtures: a programmable in-process gateway service and
//! canned event sources.

// Each test binary uses its own subset of these fixtures.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ledger_gateway::client::{CallOptions, EventSource, GatewayService, RpcCode, RpcStatus};
use ledger_gateway::gateway::Gateway;
use ledger_gateway::identity::Identity;
use ledger_gateway::signing::SigningError;
use ledger_gateway::protos::events::{
    BlockAndPrivateDataDeliverResponse, ChaincodeEventsResponse, DeliverResponse,
    FilteredDeliverResponse, SignedChaincodeEventsRequest,
};
use ledger_gateway::protos::gateway::{
    CommitStatusResponse, EndorseRequest, EndorseResponse, Envelope, EvaluateRequest,
    EvaluateResponse, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};

pub const TEST_SIGNATURE: &[u8] = b"test-signature";

pub fn test_identity() -> Identity {
    Identity::new("Org1MSP", b"certificate".to_vec())
}

pub fn test_gateway(service: Arc<MockGatewayService>) -> Gateway {
    Gateway::builder()
        .with_identity(test_identity())
        .with_signer(Box::new(|_digest: &[u8]| -> Result<Vec<u8>, SigningError> {
            Ok(TEST_SIGNATURE.to_vec())
        }))
        .with_service(service)
        .build()
        .expect("failed to build gateway")
}

/// A gateway without a signing capability, for off-line signing flows.
pub fn unsigned_gateway(service: Arc<MockGatewayService>) -> Gateway {
    Gateway::builder()
        .with_identity(test_identity())
        .with_service(service)
        .build()
        .expect("failed to build gateway")
}

/// A canned event source: yields the programmed results in order, then
/// reports an orderly close.
pub struct VecEventSource<T> {
    messages: VecDeque<Result<Option<T>, RpcStatus>>,
    close_send_called: Arc<AtomicBool>,
}

impl<T> VecEventSource<T> {
    pub fn new(messages: Vec<T>) -> Self {
        VecEventSource {
            messages: messages.into_iter().map(|message| Ok(Some(message))).collect(),
            close_send_called: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_results(messages: Vec<Result<Option<T>, RpcStatus>>) -> Self {
        VecEventSource {
            messages: messages.into_iter().collect(),
            close_send_called: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set when the receive loop half-closes the source.
    pub fn close_send_flag(&self) -> Arc<AtomicBool> {
        self.close_send_called.clone()
    }
}

impl<T: Send> EventSource<T> for VecEventSource<T> {
    fn recv(&mut self) -> Result<Option<T>, RpcStatus> {
        match self.messages.pop_front() {
            Some(result) => result,
            None => Ok(None),
        }
    }

    fn close_send(&mut self) {
        self.close_send_called.store(true, Ordering::Relaxed);
    }
}

fn no_response<T>() -> Result<T, RpcStatus> {
    Err(RpcStatus::new(RpcCode::Internal, "no programmed response"))
}

type SourceQueue<T> = Mutex<VecDeque<Box<dyn EventSource<T>>>>;

/// A `GatewayService` whose responses are programmed ahead of each test and
/// whose received requests are captured for assertion.
#[derive(Default)]
pub struct MockGatewayService {
    evaluate_responses: Mutex<VecDeque<Result<EvaluateResponse, RpcStatus>>>,
    endorse_responses: Mutex<VecDeque<Result<EndorseResponse, RpcStatus>>>,
    submit_responses: Mutex<VecDeque<Result<SubmitResponse, RpcStatus>>>,
    commit_status_responses: Mutex<VecDeque<Result<CommitStatusResponse, RpcStatus>>>,
    chaincode_event_sources: SourceQueue<ChaincodeEventsResponse>,
    block_event_sources: SourceQueue<DeliverResponse>,
    filtered_block_event_sources: SourceQueue<FilteredDeliverResponse>,
    block_and_private_data_event_sources: SourceQueue<BlockAndPrivateDataDeliverResponse>,

    evaluate_requests: Mutex<Vec<EvaluateRequest>>,
    endorse_requests: Mutex<Vec<EndorseRequest>>,
    submit_requests: Mutex<Vec<SubmitRequest>>,
    commit_status_requests: Mutex<Vec<SignedCommitStatusRequest>>,
    chaincode_events_requests: Mutex<Vec<SignedChaincodeEventsRequest>>,
    block_events_requests: Mutex<Vec<Envelope>>,
}

impl MockGatewayService {
    pub fn new() -> Arc<Self> {
        Arc::new(MockGatewayService::default())
    }

    pub fn queue_evaluate(&self, response: Result<EvaluateResponse, RpcStatus>) {
        self.evaluate_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_endorse(&self, response: Result<EndorseResponse, RpcStatus>) {
        self.endorse_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_submit(&self, response: Result<SubmitResponse, RpcStatus>) {
        self.submit_responses.lock().unwrap().push_back(response);
    }

    pub fn queue_commit_status(&self, response: Result<CommitStatusResponse, RpcStatus>) {
        self.commit_status_responses
            .lock()
            .unwrap()
            .push_back(response);
    }

    pub fn queue_chaincode_events(&self, source: VecEventSource<ChaincodeEventsResponse>) {
        self.chaincode_event_sources
            .lock()
            .unwrap()
            .push_back(Box::new(source));
    }

    pub fn queue_block_events(&self, source: VecEventSource<DeliverResponse>) {
        self.block_event_sources
            .lock()
            .unwrap()
            .push_back(Box::new(source));
    }

    pub fn queue_filtered_block_events(&self, source: VecEventSource<FilteredDeliverResponse>) {
        self.filtered_block_event_sources
            .lock()
            .unwrap()
            .push_back(Box::new(source));
    }

    pub fn queue_block_and_private_data_events(
        &self,
        source: VecEventSource<BlockAndPrivateDataDeliverResponse>,
    ) {
        self.block_and_private_data_event_sources
            .lock()
            .unwrap()
            .push_back(Box::new(source));
    }

    pub fn evaluate_requests(&self) -> Vec<EvaluateRequest> {
        self.evaluate_requests.lock().unwrap().clone()
    }

    pub fn endorse_requests(&self) -> Vec<EndorseRequest> {
        self.endorse_requests.lock().unwrap().clone()
    }

    pub fn submit_requests(&self) -> Vec<SubmitRequest> {
        self.submit_requests.lock().unwrap().clone()
    }

    pub fn commit_status_requests(&self) -> Vec<SignedCommitStatusRequest> {
        self.commit_status_requests.lock().unwrap().clone()
    }

    pub fn chaincode_events_requests(&self) -> Vec<SignedChaincodeEventsRequest> {
        self.chaincode_events_requests.lock().unwrap().clone()
    }

    pub fn block_events_requests(&self) -> Vec<Envelope> {
        self.block_events_requests.lock().unwrap().clone()
    }
}

impl GatewayService for MockGatewayService {
    fn evaluate(
        &self,
        request: EvaluateRequest,
        _call: &CallOptions,
    ) -> Result<EvaluateResponse, RpcStatus> {
        self.evaluate_requests.lock().unwrap().push(request);
        self.evaluate_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(no_response)
    }

    fn endorse(
        &self,
        request: EndorseRequest,
        _call: &CallOptions,
    ) -> Result<EndorseResponse, RpcStatus> {
        self.endorse_requests.lock().unwrap().push(request);
        self.endorse_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(no_response)
    }

    fn submit(
        &self,
        request: SubmitRequest,
        _call: &CallOptions,
    ) -> Result<SubmitResponse, RpcStatus> {
        self.submit_requests.lock().unwrap().push(request);
        self.submit_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(no_response)
    }

    fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        _call: &CallOptions,
    ) -> Result<CommitStatusResponse, RpcStatus> {
        self.commit_status_requests.lock().unwrap().push(request);
        self.commit_status_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(no_response)
    }

    fn chaincode_events(
        &self,
        request: SignedChaincodeEventsRequest,
        _call: &CallOptions,
    ) -> Result<Box<dyn EventSource<ChaincodeEventsResponse>>, RpcStatus> {
        self.chaincode_events_requests.lock().unwrap().push(request);
        self.chaincode_event_sources
            .lock()
            .unwrap()
            .pop_front()
            .map(Ok)
            .unwrap_or_else(no_response)
    }

    fn block_events(
        &self,
        request: Envelope,
        _call: &CallOptions,
    ) -> Result<Box<dyn EventSource<DeliverResponse>>, RpcStatus> {
        self.block_events_requests.lock().unwrap().push(request);
        self.block_event_sources
            .lock()
            .unwrap()
            .pop_front()
            .map(Ok)
            .unwrap_or_else(no_response)
    }

    fn filtered_block_events(
        &self,
        request: Envelope,
        _call: &CallOptions,
    ) -> Result<Box<dyn EventSource<FilteredDeliverResponse>>, RpcStatus> {
        self.block_events_requests.lock().unwrap().push(request);
        self.filtered_block_event_sources
            .lock()
            .unwrap()
            .pop_front()
            .map(Ok)
            .unwrap_or_else(no_response)
    }

    fn block_and_private_data_events(
        &self,
        request: Envelope,
        _call: &CallOptions,
    ) -> Result<Box<dyn EventSource<BlockAndPrivateDataDeliverResponse>>, RpcStatus> {
        self.block_events_requests.lock().unwrap().push(request);
        self.block_and_private_data_event_sources
            .lock()
            .unwrap()
            .pop_front()
            .map(Ok)
            .unwrap_or_else(no_response)
    }
}
