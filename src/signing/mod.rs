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

//! The signing capability consumed by the transaction lifecycle.
//!
//! Signing is modelled as a single-function capability over a precomputed
//! digest rather than a class hierarchy: anything that can turn a digest into
//! a signature is a [`Signer`]. Off-line flows simply configure no signer and
//! reattach externally produced signatures through the signed-reconstruction
//! constructors on `Gateway` and `Network`.

mod error;

use sha2::{Digest as Sha2Digest, Sha256};

pub use error::SigningError;

/// A digest-in, signature-out signing capability.
///
/// The digest is computed by the crate with the configured hash function; a
/// `Signer` must not hash it again unless the backing primitive requires it.
pub trait Signer: Send {
    fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, SigningError>;
}

impl<F> Signer for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, SigningError> + Send + Sync,
{
    fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, SigningError> {
        (self)(digest)
    }
}

/// A local-key signer backed by a `cylinder` signing context.
pub struct CylinderSigner {
    inner: Box<dyn cylinder::Signer>,
}

impl CylinderSigner {
    pub fn new(inner: Box<dyn cylinder::Signer>) -> Self {
        CylinderSigner { inner }
    }
}

impl Signer for CylinderSigner {
    fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, SigningError> {
        Ok(self.inner.sign(digest)?.take_bytes())
    }
}

/// The hash used to derive signable digests from message bytes.
pub type HashFn = fn(&[u8]) -> Vec<u8>;

/// SHA-256, the default digest for signing and transaction ID derivation.
pub fn sha256(message: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(message);
    hasher.finalize().to_vec()
}
