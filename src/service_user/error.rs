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
//! # Service user errors
use secrecy::SecretString;
use thiserror::Error;

use crate::common::types::Scope;
use crate::config::ConfigError;
use crate::driver::DriverError;
use crate::identity::IdentityBackendError;

/// The service user could not be authenticated.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Keystone refused to issue the token.
    #[error("{source} (user: {user_id}, user domain: {user_domain}, scope: {scope})")]
    Rejected {
        /// The source of the error.
        source: IdentityBackendError,
        /// Service user.
        user_id: String,
        /// Domain of the service user.
        user_domain: String,
        /// Requested scope.
        scope: Scope,
    },

    /// The driver could not be created with the issued token.
    #[error("cannot create the driver for domain {domain_id} (region: {region:?}): {source}")]
    Driver {
        /// The source of the error.
        source: DriverError,
        /// Issued token.
        token: SecretString,
        /// Domain the token is scoped to.
        domain_id: String,
        /// Region of the driver.
        region: Option<String>,
    },

    /// The issued token carries no domain to create the driver for.
    #[error("token of the service user in {domain} is not scoped to a domain")]
    Unscoped {
        /// Requested domain.
        domain: String,
    },
}

impl AuthenticationError {
    /// HTTP status code Keystone rejected the request with.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Rejected { source, .. } => source.code(),
            Self::Driver { source, .. } => source.code(),
            Self::Unscoped { .. } => None,
        }
    }
}

/// Service user error.
#[derive(Debug, Error)]
pub enum ServiceUserError {
    /// Authentication failed.
    #[error(transparent)]
    Authentication {
        /// The source of the error.
        #[from]
        source: AuthenticationError,
    },

    /// Configuration error.
    #[error(transparent)]
    Config {
        /// The source of the error.
        #[from]
        source: ConfigError,
    },

    /// Identity driver error.
    #[error(transparent)]
    Driver {
        /// The source of the error.
        #[from]
        source: DriverError,
    },

    /// The issued token carries no domain.
    #[error("token of the service user in {0} is not scoped to a domain")]
    MissingDomainScope(String),
}
