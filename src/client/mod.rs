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

//! The RPC seam between the protocol engine and the gateway transport.
//!
//! The engine is written against the [`GatewayService`] trait; concrete
//! transports (plaintext or TLS connections, connection factories) are
//! collaborators outside this crate. A transport implementation is obliged to
//! honor the per-call timeout and [`CancellationToken`]: cancelling the token
//! must fail in-flight calls promptly with a `Cancelled` status and unblock
//! any pending [`EventSource::recv`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ErrorDetail;
use crate::protos::events::{
    BlockAndPrivateDataDeliverResponse, ChaincodeEventsResponse, DeliverResponse,
    FilteredDeliverResponse, SignedChaincodeEventsRequest,
};
use crate::protos::gateway::{
    EndorseRequest, EndorseResponse, Envelope, EvaluateRequest, EvaluateResponse,
    SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use crate::protos::gateway::CommitStatusResponse;

/// Status codes reported by the transport layer, mirroring the gRPC set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl fmt::Display for RpcCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A transport/status-layer failure, optionally carrying structured
/// per-endorser detail records.
#[derive(Debug, Clone)]
pub struct RpcStatus {
    code: RpcCode,
    message: String,
    details: Vec<ErrorDetail>,
}

impl RpcStatus {
    pub fn new(code: RpcCode, message: &str) -> Self {
        RpcStatus {
            code,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }

    pub fn code(&self) -> RpcCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[ErrorDetail] {
        &self.details
    }
}

impl StdError for RpcStatus {}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for detail in &self.details {
            write!(f, "\n{}", detail)?;
        }
        Ok(())
    }
}

/// A cooperatively observed cancellation signal shared between a caller and
/// the calls it starts.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CancellationToken{{ cancelled: {} }}", self.is_cancelled())
    }
}

/// Per-call controls: an optional timeout override and a cancellation token.
///
/// A timeout of zero disables the operation's default deadline, leaving the
/// cancellation token as the only bound.
#[derive(Clone, Default)]
pub struct CallOptions {
    timeout: Option<Duration>,
    cancellation: CancellationToken,
}

impl CallOptions {
    pub fn new() -> Self {
        CallOptions::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Resolve this call's deadline against the operation's default: an unset
    /// timeout takes the default, an explicit zero timeout means no deadline.
    pub(crate) fn resolve(&self, default: Duration) -> CallOptions {
        let timeout = match self.timeout {
            Some(timeout) if timeout == Duration::from_secs(0) => None,
            Some(timeout) => Some(timeout),
            None => Some(default),
        };
        CallOptions {
            timeout,
            cancellation: self.cancellation.clone(),
        }
    }
}

/// The receive side of one open server stream.
///
/// Exactly one background receive loop owns each source. `recv` blocks until
/// the next message, returning `Ok(None)` on an orderly server close and an
/// error status on transport failure or cancellation. `close_send` half-closes
/// the sending side and must be safe to call on every exit path.
pub trait EventSource<T>: Send {
    fn recv(&mut self) -> Result<Option<T>, RpcStatus>;

    fn close_send(&mut self);
}

/// The gateway's RPC surface as consumed by this crate.
///
/// Unary calls block the calling thread until a response, the resolved
/// timeout, or cancellation. Streaming calls return the opened stream's
/// receive side without blocking on stream content.
pub trait GatewayService: Send + Sync {
    fn evaluate(
        &self,
        request: EvaluateRequest,
        call: &CallOptions,
    ) -> Result<EvaluateResponse, RpcStatus>;

    fn endorse(
        &self,
        request: EndorseRequest,
        call: &CallOptions,
    ) -> Result<EndorseResponse, RpcStatus>;

    fn submit(
        &self,
        request: SubmitRequest,
        call: &CallOptions,
    ) -> Result<SubmitResponse, RpcStatus>;

    fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
        call: &CallOptions,
    ) -> Result<CommitStatusResponse, RpcStatus>;

    fn chaincode_events(
        &self,
        request: SignedChaincodeEventsRequest,
        call: &CallOptions,
    ) -> Result<Box<dyn EventSource<ChaincodeEventsResponse>>, RpcStatus>;

    fn block_events(
        &self,
        request: Envelope,
        call: &CallOptions,
    ) -> Result<Box<dyn EventSource<DeliverResponse>>, RpcStatus>;

    fn filtered_block_events(
        &self,
        request: Envelope,
        call: &CallOptions,
    ) -> Result<Box<dyn EventSource<FilteredDeliverResponse>>, RpcStatus>;

    fn block_and_private_data_events(
        &self,
        request: Envelope,
        call: &CallOptions,
    ) -> Result<Box<dyn EventSource<BlockAndPrivateDataDeliverResponse>>, RpcStatus>;
}
