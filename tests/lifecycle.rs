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

//! End-to-end tests of the transaction lifecycle against a programmed
//! in-process gateway service.

mod common;

use protobuf::Message;

use ledger_gateway::client::{CallOptions, RpcCode, RpcStatus};
use ledger_gateway::error::{ErrorDetail, GatewayError};
use ledger_gateway::protos::gateway::{
    CommitStatusRequest, CommitStatusResponse, EndorseResponse, Envelope, EvaluateResponse,
    Proposal, SubmitResponse, TxValidationCode,
};

use common::{test_gateway, unsigned_gateway, MockGatewayService, TEST_SIGNATURE};

fn endorse_response(payload: &[u8], result: &[u8]) -> EndorseResponse {
    let mut envelope = Envelope::new();
    envelope.set_payload(payload.to_vec());

    let mut response = EndorseResponse::new();
    response.set_prepared_transaction(envelope);
    response.set_result(result.to_vec());
    response
}

fn commit_status_response(code: TxValidationCode, block_number: u64) -> CommitStatusResponse {
    let mut response = CommitStatusResponse::new();
    response.set_result(code);
    response.set_block_number(block_number);
    response
}

#[test]
fn evaluate_returns_the_chaincode_result() {
    let service = MockGatewayService::new();
    let mut response = EvaluateResponse::new();
    response.set_result(b"evaluate-result".to_vec());
    service.queue_evaluate(Ok(response));

    let gateway = test_gateway(service.clone());
    let contract = gateway.network("mychannel").contract("basic");

    let result = contract
        .evaluate_transaction("query", &["asset1"])
        .expect("failed to evaluate");
    assert_eq!(result, b"evaluate-result");

    let requests = service.evaluate_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get_channel_id(), "mychannel");

    let proposal: Proposal =
        Message::parse_from_bytes(requests[0].get_proposal().get_proposal_bytes())
            .expect("failed to parse proposal");
    assert_eq!(proposal.get_header().get_chaincode_id(), "basic");
    assert_eq!(proposal.get_args()[0], b"query".to_vec());
    assert_eq!(proposal.get_args()[1], b"asset1".to_vec());
    assert_eq!(
        requests[0].get_proposal().get_signature(),
        TEST_SIGNATURE
    );
}

#[test]
fn named_contract_prefixes_the_transaction_name() {
    let service = MockGatewayService::new();
    service.queue_evaluate(Ok(EvaluateResponse::new()));

    let gateway = test_gateway(service.clone());
    let contract = gateway
        .network("mychannel")
        .contract_with_name("basic", "transfer");

    contract
        .evaluate_transaction("move", &[])
        .expect("failed to evaluate");

    let requests = service.evaluate_requests();
    let proposal: Proposal =
        Message::parse_from_bytes(requests[0].get_proposal().get_proposal_bytes())
            .expect("failed to parse proposal");
    assert_eq!(proposal.get_args()[0], b"transfer:move".to_vec());
}

#[test]
fn submit_transaction_runs_the_full_lifecycle() {
    let service = MockGatewayService::new();
    service.queue_endorse(Ok(endorse_response(b"envelope-payload", b"submit-result")));
    service.queue_submit(Ok(SubmitResponse::new()));
    service.queue_commit_status(Ok(commit_status_response(TxValidationCode::VALID, 7)));

    let gateway = test_gateway(service.clone());
    let contract = gateway.network("mychannel").contract("basic");

    let result = contract
        .submit_transaction("create", &["asset1", "blue"])
        .expect("failed to submit");
    assert_eq!(result, b"submit-result");

    let endorse_requests = service.endorse_requests();
    assert_eq!(endorse_requests.len(), 1);
    let transaction_id = endorse_requests[0].get_transaction_id().to_string();
    assert_eq!(transaction_id.len(), 64);

    let submit_requests = service.submit_requests();
    assert_eq!(submit_requests.len(), 1);
    assert_eq!(submit_requests[0].get_transaction_id(), transaction_id);
    assert_eq!(
        submit_requests[0].get_prepared_transaction().get_payload(),
        b"envelope-payload"
    );
    assert_eq!(
        submit_requests[0].get_prepared_transaction().get_signature(),
        TEST_SIGNATURE
    );

    let status_requests = service.commit_status_requests();
    assert_eq!(status_requests.len(), 1);
    assert_eq!(status_requests[0].get_signature(), TEST_SIGNATURE);
    let status_request: CommitStatusRequest =
        Message::parse_from_bytes(status_requests[0].get_request())
            .expect("failed to parse commit status request");
    assert_eq!(status_request.get_transaction_id(), transaction_id);
    assert_eq!(status_request.get_channel_id(), "mychannel");
}

#[test]
fn invalidated_transaction_is_a_commit_error() {
    let service = MockGatewayService::new();
    service.queue_endorse(Ok(endorse_response(b"payload", b"result")));
    service.queue_submit(Ok(SubmitResponse::new()));
    service.queue_commit_status(Ok(commit_status_response(
        TxValidationCode::MVCC_READ_CONFLICT,
        42,
    )));

    let gateway = test_gateway(service);
    let contract = gateway.network("mychannel").contract("basic");

    match contract.submit_transaction("create", &["asset1"]) {
        Err(GatewayError::Commit(err)) => {
            assert_eq!(err.code(), TxValidationCode::MVCC_READ_CONFLICT);
            assert_eq!(err.block_number(), 42);
            assert_eq!(err.transaction_id().len(), 64);
        }
        other => panic!("expected commit error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn endorse_failure_carries_transaction_id_and_details() {
    let service = MockGatewayService::new();
    service.queue_endorse(Err(RpcStatus::new(RpcCode::Aborted, "endorsement failed")
        .with_details(vec![ErrorDetail::new(
            "peer0:7051",
            "Org1MSP",
            "chaincode panicked",
        )])));

    let gateway = test_gateway(service);
    let contract = gateway.network("mychannel").contract("basic");

    let mut proposal = contract
        .new_proposal("create")
        .with_arguments(&["asset1"])
        .build()
        .expect("failed to build proposal");
    let transaction_id = proposal.transaction_id().to_string();

    let err = proposal
        .endorse(&CallOptions::new())
        .expect_err("endorse should fail");
    assert_eq!(err.transaction_id(), transaction_id);
    assert_eq!(err.code(), Some(RpcCode::Aborted));
    assert_eq!(err.details().len(), 1);
    assert_eq!(err.details()[0].address(), "peer0:7051");
    assert!(err.to_string().contains("endorsement failed"));
}

#[test]
fn commit_status_can_report_an_unsuccessful_code_without_error() {
    let service = MockGatewayService::new();
    service.queue_endorse(Ok(endorse_response(b"payload", b"result")));
    service.queue_submit(Ok(SubmitResponse::new()));
    service.queue_commit_status(Ok(commit_status_response(
        TxValidationCode::ENDORSEMENT_POLICY_FAILURE,
        9,
    )));

    let gateway = test_gateway(service);
    let contract = gateway.network("mychannel").contract("basic");

    let (_, mut commit) = contract
        .submit("create", &["asset1"])
        .expect("failed to submit");
    let status = commit
        .status(&CallOptions::new())
        .expect("failed to get status");

    assert!(!status.is_successful());
    assert_eq!(status.code(), TxValidationCode::ENDORSEMENT_POLICY_FAILURE);
    assert_eq!(status.block_number(), 9);
}

#[test]
fn proposal_round_trips_through_offline_signing() {
    let service = MockGatewayService::new();
    let mut response = EvaluateResponse::new();
    response.set_result(b"offline-result".to_vec());
    service.queue_evaluate(Ok(response));

    // No signer configured: signing happens out of process.
    let gateway = unsigned_gateway(service.clone());
    let contract = gateway.network("mychannel").contract("basic");

    let proposal = contract
        .new_proposal("query")
        .with_arguments(&["asset1"])
        .build()
        .expect("failed to build proposal");
    let transaction_id = proposal.transaction_id().to_string();
    let bytes = proposal.bytes().expect("failed to serialize proposal");
    let digest = proposal.digest();
    assert_eq!(digest.len(), 32);

    let mut restored = gateway
        .new_signed_proposal(&bytes, b"external-signature".to_vec())
        .expect("failed to restore proposal");
    assert_eq!(restored.transaction_id(), transaction_id);
    assert_eq!(restored.digest(), digest);

    let result = restored
        .evaluate(&CallOptions::new())
        .expect("failed to evaluate");
    assert_eq!(result, b"offline-result");

    let requests = service.evaluate_requests();
    assert_eq!(
        requests[0].get_proposal().get_signature(),
        b"external-signature"
    );
}

#[test]
fn evaluate_without_signing_capability_fails() {
    let service = MockGatewayService::new();
    let gateway = unsigned_gateway(service);
    let contract = gateway.network("mychannel").contract("basic");

    let mut proposal = contract
        .new_proposal("query")
        .build()
        .expect("failed to build proposal");

    let err = proposal
        .evaluate(&CallOptions::new())
        .expect_err("evaluate should fail without a signer");
    assert!(err.to_string().contains(proposal.transaction_id()));
    assert!(err.rpc_status().is_none());
}

#[test]
fn attached_signature_is_not_replaced_by_the_local_signer() {
    let service = MockGatewayService::new();
    service.queue_evaluate(Ok(EvaluateResponse::new()));

    // Gateway with a signer, but the proposal already carries a signature.
    let gateway = test_gateway(service.clone());
    let contract = gateway.network("mychannel").contract("basic");

    let proposal = contract
        .new_proposal("query")
        .build()
        .expect("failed to build proposal");
    let bytes = proposal.bytes().expect("failed to serialize proposal");

    let mut restored = gateway
        .new_signed_proposal(&bytes, b"external-signature".to_vec())
        .expect("failed to restore proposal");
    restored
        .evaluate(&CallOptions::new())
        .expect("failed to evaluate");

    let requests = service.evaluate_requests();
    assert_eq!(
        requests[0].get_proposal().get_signature(),
        b"external-signature"
    );
}

#[test]
fn transaction_and_commit_round_trip_through_offline_signing() {
    let service = MockGatewayService::new();
    service.queue_endorse(Ok(endorse_response(b"envelope-payload", b"result")));
    service.queue_submit(Ok(SubmitResponse::new()));
    service.queue_commit_status(Ok(commit_status_response(TxValidationCode::VALID, 3)));

    let gateway = test_gateway(service.clone());
    let contract = gateway.network("mychannel").contract("basic");

    let mut proposal = contract
        .new_proposal("create")
        .with_arguments(&["asset1"])
        .build()
        .expect("failed to build proposal");
    let transaction = proposal
        .endorse(&CallOptions::new())
        .expect("failed to endorse");

    // Detach the endorsed transaction, sign its digest externally, restore.
    let bytes = transaction.bytes().expect("failed to serialize transaction");
    let mut restored = gateway
        .new_signed_transaction(&bytes, b"tx-signature".to_vec())
        .expect("failed to restore transaction");
    assert_eq!(restored.transaction_id(), transaction.transaction_id());
    assert_eq!(restored.result(), b"result");

    let commit = restored
        .submit(&CallOptions::new())
        .expect("failed to submit");
    assert_eq!(
        service.submit_requests()[0]
            .get_prepared_transaction()
            .get_signature(),
        b"tx-signature"
    );

    // Same round trip for the commit status request.
    let commit_bytes = commit.bytes().expect("failed to serialize commit");
    let mut restored_commit = gateway
        .new_signed_commit(&commit_bytes, b"commit-signature".to_vec())
        .expect("failed to restore commit");
    assert_eq!(restored_commit.transaction_id(), commit.transaction_id());

    let status = restored_commit
        .status(&CallOptions::new())
        .expect("failed to get status");
    assert!(status.is_successful());
    assert_eq!(status.block_number(), 3);
    assert_eq!(
        service.commit_status_requests()[0].get_signature(),
        b"commit-signature"
    );
}
