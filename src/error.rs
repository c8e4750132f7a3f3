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
//! # Error
//!
//! Diverse errors that can occur while working with the service user.
use thiserror::Error;

use crate::driver::error::DriverError;
use crate::identity::error::IdentityBackendError;
use crate::service_user::error::ServiceUserError;

/// Top level error.
#[derive(Debug, Error)]
pub enum ElektraError {
    /// Configuration error.
    #[error(transparent)]
    Config {
        #[from]
        source: crate::config::ConfigError,
    },

    /// Identity driver error.
    #[error(transparent)]
    Driver {
        #[from]
        source: DriverError,
    },

    /// Identity backend error.
    #[error(transparent)]
    IdentityBackend {
        #[from]
        source: IdentityBackendError,
    },

    /// HTTP client error.
    #[error(transparent)]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Service user error.
    #[error(transparent)]
    ServiceUser {
        #[from]
        source: ServiceUserError,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    JsonError {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },
}

/// Error of the generated builders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// Uninitialized field.
    #[error("{0}")]
    UninitializedField(String),
    /// Custom validation error.
    #[error("{0}")]
    Validation(String),
}

impl From<String> for BuilderError {
    fn from(s: String) -> Self {
        Self::Validation(s)
    }
}

impl From<derive_builder::UninitializedFieldError> for BuilderError {
    fn from(ufe: derive_builder::UninitializedFieldError) -> Self {
        Self::UninitializedField(ufe.to_string())
    }
}
