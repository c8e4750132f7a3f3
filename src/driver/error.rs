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
//! # Identity driver error
use thiserror::Error;

use crate::common::ApiError;

/// Identity driver error.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Keystone returned a non-success status.
    #[error(transparent)]
    Api {
        /// The source of the error.
        #[from]
        source: ApiError,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    Json {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

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

    /// The driver parameters are not valid.
    #[error(transparent)]
    Validation {
        /// The source of the error.
        #[from]
        source: validator::ValidationErrors,
    },
}

impl DriverError {
    /// Whether Keystone answered the request with an error status.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// HTTP status code of the failed request if known.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Api { source } => Some(source.code),
            Self::Reqwest { source } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
