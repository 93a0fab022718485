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

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub enum SigningError {
    /// No signing capability was configured; the digest must be signed
    /// externally and reattached via the signed-reconstruction constructors.
    MissingCapability,
    SigningFailed(String),
}

impl StdError for SigningError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            SigningError::MissingCapability => None,
            SigningError::SigningFailed(_) => None,
        }
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SigningError::MissingCapability => write!(f, "no signing capability configured"),
            SigningError::SigningFailed(ref s) => write!(f, "signing failed: {}", s),
        }
    }
}

impl From<cylinder::SigningError> for SigningError {
    fn from(err: cylinder::SigningError) -> Self {
        SigningError::SigningFailed(err.to_string())
    }
}
