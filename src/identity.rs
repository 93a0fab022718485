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

//! Client identities and the signing identity that wraps them.

use std::fmt;

use protobuf::Message;

use crate::protos::{self, ProtoConversionError};
use crate::signing::{sha256, HashFn, Signer, SigningError};

/// A client identity: the membership service provider ID the client belongs
/// to plus its opaque credential bytes. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    msp_id: String,
    credentials: Vec<u8>,
}

impl Identity {
    pub fn new(msp_id: &str, credentials: Vec<u8>) -> Self {
        Identity {
            msp_id: msp_id.to_string(),
            credentials,
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn credentials(&self) -> &[u8] {
        &self.credentials
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Identity{ ")?;
        write!(f, "msp_id: {:?}, ", self.msp_id)?;

        let credentials_len = self.credentials.len();
        write!(
            f,
            "credentials: <{} byte{}>",
            credentials_len,
            if credentials_len == 1 { "" } else { "s" }
        )?;

        f.write_str(" }")
    }
}

/// An identity together with its hashing and (optional) signing capabilities.
///
/// When no signer is configured, [`sign`](SigningIdentity::sign) fails with
/// `SigningError::MissingCapability`; this is the designed mechanism for
/// off-line signing flows where the key never enters this process.
pub struct SigningIdentity {
    identity: Identity,
    hash: HashFn,
    signer: Option<Box<dyn Signer>>,
}

impl SigningIdentity {
    pub fn new(identity: Identity, hash: Option<HashFn>, signer: Option<Box<dyn Signer>>) -> Self {
        SigningIdentity {
            identity,
            hash: hash.unwrap_or(sha256),
            signer,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The identity's wire "creator" form, embedded in request headers.
    pub(crate) fn creator(&self) -> protos::identity::SerializedIdentity {
        let mut proto = protos::identity::SerializedIdentity::new();
        proto.set_msp_id(self.identity.msp_id().to_string());
        proto.set_id_bytes(self.identity.credentials().to_vec());
        proto
    }

    /// The serialized creator form, hashed into transaction IDs.
    pub(crate) fn creator_bytes(&self) -> Result<Vec<u8>, ProtoConversionError> {
        self.creator().write_to_bytes().map_err(|err| {
            ProtoConversionError::SerializationError(format!(
                "unable to get bytes from SerializedIdentity: {}",
                err
            ))
        })
    }

    pub fn hash(&self, message: &[u8]) -> Vec<u8> {
        (self.hash)(message)
    }

    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, SigningError> {
        match &self.signer {
            Some(signer) => signer.sign(digest),
            None => Err(SigningError::MissingCapability),
        }
    }
}
