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

//! Event streams delivered from the gateway's ledger feeds.
//!
//! Each open stream owns a receive thread that pulls messages from the
//! transport, decodes them, and forwards the resulting events over a channel.
//! Dropping an [`EventStream`] cancels the call and joins the thread.

pub mod block;
pub mod chaincode;

use std::error::Error as StdError;
use std::fmt;
use std::sync::mpsc;
use std::thread;

use crate::client::{CancellationToken, EventSource, RpcStatus};
use crate::signing::SigningError;

/// Errors raised while opening an event stream.
#[derive(Debug)]
pub enum EventError {
    Signing(SigningError),
    Rpc(RpcStatus),
    Internal(String),
}

impl StdError for EventError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EventError::Signing(err) => Some(err),
            EventError::Rpc(status) => Some(status),
            EventError::Internal(_) => None,
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventError::Signing(err) => write!(f, "unable to sign event request: {}", err),
            EventError::Rpc(status) => write!(f, "unable to open event stream: {}", status),
            EventError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<SigningError> for EventError {
    fn from(err: SigningError) -> Self {
        EventError::Signing(err)
    }
}

impl From<RpcStatus> for EventError {
    fn from(status: RpcStatus) -> Self {
        EventError::Rpc(status)
    }
}

/// A blocking sequence of decoded events backed by a receive thread.
///
/// The stream ends when the transport closes or the call is cancelled. Errors
/// on the transport also end the stream; they are logged rather than
/// surfaced, as a resumable reader restarts from its checkpoint regardless of
/// why the previous stream ended.
pub struct EventStream<T> {
    receiver: mpsc::Receiver<T>,
    cancellation: CancellationToken,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl<T> EventStream<T> {
    /// Blocks for the next event; `None` means the stream has ended.
    pub fn recv(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    /// Cancels the call; the stream ends once in-flight events are drained.
    pub fn close(&self) {
        self.cancellation.cancel();
    }
}

impl<T> Iterator for EventStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}

impl<T> Drop for EventStream<T> {
    fn drop(&mut self) {
        self.cancellation.cancel();
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                warn!("Event receive thread panicked");
            }
        }
    }
}

/// Spawns the receive thread for an already-open stream. `decode` maps each
/// transport message to zero or more events.
pub(crate) fn start_receive_loop<R, T, F>(
    name: &str,
    mut source: Box<dyn EventSource<R>>,
    cancellation: CancellationToken,
    mut decode: F,
) -> Result<EventStream<T>, EventError>
where
    R: Send + 'static,
    T: Send + 'static,
    F: FnMut(R) -> Vec<T> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let token = cancellation.clone();

    let join_handle = thread::Builder::new()
        .name(format!("{}-receiver", name))
        .spawn(move || {
            loop {
                if token.is_cancelled() {
                    break;
                }
                match source.recv() {
                    Ok(Some(message)) => {
                        let mut disconnected = false;
                        for event in decode(message) {
                            if sender.send(event).is_err() {
                                disconnected = true;
                                break;
                            }
                        }
                        if disconnected {
                            debug!("Event stream receiver dropped; stopping receive loop");
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Event stream closed by the transport");
                        break;
                    }
                    Err(status) => {
                        if !token.is_cancelled() {
                            warn!("Event stream failed: {}", status);
                        }
                        break;
                    }
                }
            }
            source.close_send();
        })
        .map_err(|err| {
            EventError::Internal(format!("unable to spawn event receive thread: {}", err))
        })?;

    Ok(EventStream {
        receiver,
        cancellation,
        join_handle: Some(join_handle),
    })
}
