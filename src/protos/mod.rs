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

//! Wire message definitions, generated from the `.proto` sources at build
//! time, and the error type shared by conversions to and from them.

use std::error::Error as StdError;
use std::fmt;

include!(concat!(env!("OUT_DIR"), "/protos/mod.rs"));

#[derive(Debug)]
pub enum ProtoConversionError {
    DeserializationError(String),
    SerializationError(String),
}

impl StdError for ProtoConversionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            ProtoConversionError::DeserializationError(_) => None,
            ProtoConversionError::SerializationError(_) => None,
        }
    }
}

impl fmt::Display for ProtoConversionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProtoConversionError::DeserializationError(ref s) => {
                write!(f, "unable to deserialize during protobuf conversion: {}", s)
            }
            ProtoConversionError::SerializationError(ref s) => {
                write!(f, "unable to serialize during protobuf conversion: {}", s)
            }
        }
    }
}
