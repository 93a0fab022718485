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

//! A client-side protocol engine for a permissioned ledger gateway:
//! transaction proposal, endorsement, submission and commit tracking, with
//! off-line signing support and resumable event streams.

pub mod checkpoint;
pub mod client;
pub mod contract;
pub mod error;
pub mod event;
pub mod gateway;
pub mod identity;
pub mod network;
pub mod protocol;
#[allow(renamed_and_removed_lints)]
pub mod protos;
pub mod signing;

#[macro_use]
extern crate log;
