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

//! Errors raised by the transaction lifecycle.
//!
//! Phase errors (`EndorseError`, `SubmitError`, `CommitStatusError`) all wrap
//! a [`TransactionError`] and are distinguishable by type, so callers can
//! pattern-match on the phase. A [`CommitError`] is a different family: the
//! status RPC succeeded but the ledger invalidated the transaction.
//! Transport failures are never retried at this layer.

use std::error::Error as StdError;
use std::fmt;

use crate::client::{RpcCode, RpcStatus};
use crate::protos::gateway::TxValidationCode;
use crate::protos::ProtoConversionError;
use crate::signing::SigningError;

/// A structured endorsement-failure record reported by one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    address: String,
    msp_id: String,
    message: String,
}

impl ErrorDetail {
    pub fn new(address: &str, msp_id: &str, message: &str) -> Self {
        ErrorDetail {
            address: address.to_string(),
            msp_id: msp_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "- address: {}; mspId: {}; message: {}",
            self.address, self.msp_id, self.message
        )
    }
}

/// What went wrong beneath a failed lifecycle operation.
#[derive(Debug)]
pub enum TransactionCause {
    /// The local signing step failed before any RPC was made.
    Signing(SigningError),
    /// The transport reported a status-layer failure.
    Rpc(RpcStatus),
    /// A request message could not be serialized.
    Serialization(ProtoConversionError),
}

/// A failed lifecycle operation, carrying the transaction ID it belonged to.
#[derive(Debug)]
pub struct TransactionError {
    transaction_id: String,
    cause: TransactionCause,
}

impl TransactionError {
    pub(crate) fn from_signing(transaction_id: &str, err: SigningError) -> Self {
        TransactionError {
            transaction_id: transaction_id.to_string(),
            cause: TransactionCause::Signing(err),
        }
    }

    pub(crate) fn from_rpc(transaction_id: &str, status: RpcStatus) -> Self {
        TransactionError {
            transaction_id: transaction_id.to_string(),
            cause: TransactionCause::Rpc(status),
        }
    }

    pub(crate) fn from_serialization(transaction_id: &str, err: ProtoConversionError) -> Self {
        TransactionError {
            transaction_id: transaction_id.to_string(),
            cause: TransactionCause::Serialization(err),
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn cause(&self) -> &TransactionCause {
        &self.cause
    }

    /// The transport status, if the failure came from an RPC.
    pub fn rpc_status(&self) -> Option<&RpcStatus> {
        match &self.cause {
            TransactionCause::Rpc(status) => Some(status),
            TransactionCause::Signing(_) | TransactionCause::Serialization(_) => None,
        }
    }

    pub fn code(&self) -> Option<RpcCode> {
        self.rpc_status().map(RpcStatus::code)
    }

    pub fn details(&self) -> &[ErrorDetail] {
        self.rpc_status().map(RpcStatus::details).unwrap_or(&[])
    }
}

impl StdError for TransactionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.cause {
            TransactionCause::Signing(err) => Some(err),
            TransactionCause::Rpc(status) => Some(status),
            TransactionCause::Serialization(err) => Some(err),
        }
    }
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.cause {
            TransactionCause::Signing(err) => {
                write!(f, "transaction {}: {}", self.transaction_id, err)
            }
            TransactionCause::Rpc(status) => {
                write!(f, "transaction {}: {}", self.transaction_id, status)
            }
            TransactionCause::Serialization(err) => {
                write!(f, "transaction {}: {}", self.transaction_id, err)
            }
        }
    }
}

/// A failure during the endorsement phase.
#[derive(Debug)]
pub struct EndorseError {
    inner: TransactionError,
}

impl EndorseError {
    pub(crate) fn new(inner: TransactionError) -> Self {
        EndorseError { inner }
    }

    pub fn transaction_id(&self) -> &str {
        self.inner.transaction_id()
    }

    pub fn cause(&self) -> &TransactionCause {
        self.inner.cause()
    }

    pub fn rpc_status(&self) -> Option<&RpcStatus> {
        self.inner.rpc_status()
    }

    pub fn code(&self) -> Option<RpcCode> {
        self.inner.code()
    }

    pub fn details(&self) -> &[ErrorDetail] {
        self.inner.details()
    }

    pub fn into_inner(self) -> TransactionError {
        self.inner
    }
}

impl StdError for EndorseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.inner)
    }
}

impl fmt::Display for EndorseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to endorse: {}", self.inner)
    }
}

/// A failure during submission to the ordering service.
#[derive(Debug)]
pub struct SubmitError {
    inner: TransactionError,
}

impl SubmitError {
    pub(crate) fn new(inner: TransactionError) -> Self {
        SubmitError { inner }
    }

    pub fn transaction_id(&self) -> &str {
        self.inner.transaction_id()
    }

    pub fn cause(&self) -> &TransactionCause {
        self.inner.cause()
    }

    pub fn rpc_status(&self) -> Option<&RpcStatus> {
        self.inner.rpc_status()
    }

    pub fn code(&self) -> Option<RpcCode> {
        self.inner.code()
    }

    pub fn details(&self) -> &[ErrorDetail] {
        self.inner.details()
    }

    pub fn into_inner(self) -> TransactionError {
        self.inner
    }
}

impl StdError for SubmitError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.inner)
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to submit: {}", self.inner)
    }
}

/// A failure while resolving a transaction's commit status. Distinct from
/// [`CommitError`]: here the final validation code is unknown.
#[derive(Debug)]
pub struct CommitStatusError {
    inner: TransactionError,
}

impl CommitStatusError {
    pub(crate) fn new(inner: TransactionError) -> Self {
        CommitStatusError { inner }
    }

    pub fn transaction_id(&self) -> &str {
        self.inner.transaction_id()
    }

    pub fn cause(&self) -> &TransactionCause {
        self.inner.cause()
    }

    pub fn rpc_status(&self) -> Option<&RpcStatus> {
        self.inner.rpc_status()
    }

    pub fn code(&self) -> Option<RpcCode> {
        self.inner.code()
    }

    pub fn details(&self) -> &[ErrorDetail] {
        self.inner.details()
    }

    pub fn into_inner(self) -> TransactionError {
        self.inner
    }
}

impl StdError for CommitStatusError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.inner)
    }
}

impl fmt::Display for CommitStatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to obtain commit status: {}", self.inner)
    }
}

/// A successfully obtained, negative validation outcome: the transaction was
/// ordered but invalidated by the ledger.
#[derive(Debug)]
pub struct CommitError {
    transaction_id: String,
    code: TxValidationCode,
    block_number: u64,
}

impl CommitError {
    pub(crate) fn new(transaction_id: &str, code: TxValidationCode, block_number: u64) -> Self {
        CommitError {
            transaction_id: transaction_id.to_string(),
            code,
            block_number,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn code(&self) -> TxValidationCode {
        self.code
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }
}

impl StdError for CommitError {}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "transaction {} failed to commit with status {:?} in block {}",
            self.transaction_id, self.code, self.block_number
        )
    }
}

/// Failure to assemble a request object.
#[derive(Debug)]
pub enum BuildError {
    MissingField(String),
    SerializationError(String),
}

impl StdError for BuildError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            BuildError::MissingField(_) => None,
            BuildError::SerializationError(_) => None,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::MissingField(ref s) => write!(f, "MissingField: {}", s),
            BuildError::SerializationError(ref s) => write!(f, "SerializationError: {}", s),
        }
    }
}

impl From<ProtoConversionError> for BuildError {
    fn from(err: ProtoConversionError) -> Self {
        BuildError::SerializationError(err.to_string())
    }
}

/// Umbrella error for the convenience call surface; the lower-level
/// primitives return the phase-specific types directly.
#[derive(Debug)]
pub enum GatewayError {
    Build(BuildError),
    Transaction(TransactionError),
    Endorse(EndorseError),
    Submit(SubmitError),
    CommitStatus(CommitStatusError),
    Commit(CommitError),
}

impl StdError for GatewayError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            GatewayError::Build(err) => Some(err),
            GatewayError::Transaction(err) => Some(err),
            GatewayError::Endorse(err) => Some(err),
            GatewayError::Submit(err) => Some(err),
            GatewayError::CommitStatus(err) => Some(err),
            GatewayError::Commit(err) => Some(err),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GatewayError::Build(err) => write!(f, "{}", err),
            GatewayError::Transaction(err) => write!(f, "{}", err),
            GatewayError::Endorse(err) => write!(f, "{}", err),
            GatewayError::Submit(err) => write!(f, "{}", err),
            GatewayError::CommitStatus(err) => write!(f, "{}", err),
            GatewayError::Commit(err) => write!(f, "{}", err),
        }
    }
}

impl From<BuildError> for GatewayError {
    fn from(err: BuildError) -> Self {
        GatewayError::Build(err)
    }
}

impl From<TransactionError> for GatewayError {
    fn from(err: TransactionError) -> Self {
        GatewayError::Transaction(err)
    }
}

impl From<EndorseError> for GatewayError {
    fn from(err: EndorseError) -> Self {
        GatewayError::Endorse(err)
    }
}

impl From<SubmitError> for GatewayError {
    fn from(err: SubmitError) -> Self {
        GatewayError::Submit(err)
    }
}

impl From<CommitStatusError> for GatewayError {
    fn from(err: CommitStatusError) -> Self {
        GatewayError::CommitStatus(err)
    }
}

impl From<CommitError> for GatewayError {
    fn from(err: CommitError) -> Self {
        GatewayError::Commit(err)
    }
}
