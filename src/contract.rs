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

//! Smart contracts and the convenience invocation surface.

use std::sync::Arc;

use crate::client::CallOptions;
use crate::error::{CommitError, GatewayError};
use crate::gateway::GatewayCore;
use crate::protocol::commit::Commit;
use crate::protocol::proposal::ProposalBuilder;

/// A smart contract deployed in a chaincode on a channel.
///
/// A chaincode may host several named contracts; the unnamed default contract
/// addresses its transactions without a prefix.
pub struct Contract {
    channel_name: String,
    chaincode_name: String,
    contract_name: Option<String>,
    core: Arc<GatewayCore>,
}

impl Contract {
    pub(crate) fn new(
        channel_name: &str,
        chaincode_name: &str,
        contract_name: Option<String>,
        core: Arc<GatewayCore>,
    ) -> Self {
        Contract {
            channel_name: channel_name.to_string(),
            chaincode_name: chaincode_name.to_string(),
            contract_name,
            core,
        }
    }

    pub fn chaincode_name(&self) -> &str {
        &self.chaincode_name
    }

    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    /// Qualify a transaction name with this contract's name, if it has one.
    fn qualified_name(&self, transaction_name: &str) -> String {
        match &self.contract_name {
            Some(contract_name) => format!("{}:{}", contract_name, transaction_name),
            None => transaction_name.to_string(),
        }
    }

    /// Begin building a proposal for the named transaction, for flows that
    /// need transient data, endorsing-organization restrictions or off-line
    /// signing.
    pub fn new_proposal(&self, transaction_name: &str) -> ProposalBuilder {
        ProposalBuilder::new(
            self.core.clone(),
            &self.channel_name,
            &self.chaincode_name,
            &self.qualified_name(transaction_name),
        )
    }

    /// Evaluates a transaction with string arguments and returns its result.
    /// The ledger is read but never updated.
    pub fn evaluate_transaction(
        &self,
        transaction_name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, GatewayError> {
        let mut proposal = self
            .new_proposal(transaction_name)
            .with_arguments(args)
            .build()?;
        Ok(proposal.evaluate(&CallOptions::new())?)
    }

    /// Submits a transaction with string arguments and blocks until it
    /// commits. A transaction that was ordered but invalidated is a
    /// [`CommitError`].
    pub fn submit_transaction(
        &self,
        transaction_name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, GatewayError> {
        let (result, mut commit) = self.submit(transaction_name, args)?;

        let status = commit.status(&CallOptions::new())?;
        if !status.is_successful() {
            return Err(CommitError::new(
                status.transaction_id(),
                status.code(),
                status.block_number(),
            )
            .into());
        }

        Ok(result)
    }

    /// Submits a transaction and returns the endorsed result along with the
    /// commit handle, without waiting for the commit.
    pub fn submit(
        &self,
        transaction_name: &str,
        args: &[&str],
    ) -> Result<(Vec<u8>, Commit), GatewayError> {
        let options = CallOptions::new();
        let mut proposal = self
            .new_proposal(transaction_name)
            .with_arguments(args)
            .build()?;
        let mut transaction = proposal.endorse(&options)?;
        let result = transaction.result().to_vec();
        let commit = transaction.submit(&options)?;
        Ok((result, commit))
    }
}
