// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Identity backend error
use thiserror::Error;

use crate::common::ApiError;

/// Identity backend error.
#[derive(Error, Debug)]
pub enum IdentityBackendError {
    /// Keystone rejected the request.
    #[error(transparent)]
    Api {
        /// The source of the error.
        #[from]
        source: ApiError,
    },

    /// The token response misses mandatory data.
    #[error(transparent)]
    Builder {
        /// The source of the error.
        #[from]
        source: crate::error::BuilderError,
    },

    /// The token header is not a valid string.
    #[error(transparent)]
    InvalidHeader {
        /// The source of the error.
        #[from]
        source: reqwest::header::ToStrError,
    },

    /// Keystone did not return the token.
    #[error("keystone response does not contain the X-Subject-Token header")]
    MissingSubjectToken,

    /// HTTP client error.
    #[error(transparent)]
    Reqwest {
        /// The source of the error.
        #[from]
        source: reqwest::Error,
    },

    /// Url parsing error.
    #[error(transparent)]
    UrlParse {
        /// The source of the error.
        #[from]
        source: url::ParseError,
    },

    /// The requested scope is not valid.
    #[error(transparent)]
    Validation {
        /// The source of the error.
        #[from]
        source: validator::ValidationErrors,
    },
}

impl IdentityBackendError {
    /// HTTP status code of the failed request if known.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Api { source } => Some(source.code),
            Self::Reqwest { source } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
