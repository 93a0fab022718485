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

//! The transaction lifecycle: proposal, endorsed transaction, commit.
//!
//! A proposal is built from a contract, evaluated (query) or endorsed; a
//! successful endorsement yields a transaction; submitting a transaction
//! yields a commit handle that resolves to the final validation status. Each
//! stage is a signable object following the same sign-once discipline: an
//! empty signature marks it unsigned, lifecycle operations sign it first if
//! needed, and repeated signing is a no-op. Signing methods take `&mut self`,
//! so one instance cannot be signed from two threads at once.

pub mod commit;
pub mod proposal;
pub mod transaction;
