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

//! # Identity backend
//!
//! The identity backend exchanges the service user credentials for a scoped
//! token. A token may be scoped to a domain (addressed by the ID or by the
//! name) or to a project.
//!
//! The only implementation talks to the Keystone v3 API. Tests replace it
//! with the mocked backend.

use async_trait::async_trait;

pub mod error;
pub mod keystone;
#[cfg(test)]
mod mock;
pub mod types;

use crate::common::types::Scope;
use crate::service_user::types::ServiceUserCredentials;

pub use error::IdentityBackendError;
pub use keystone::KeystoneIdentityBackend;
#[cfg(test)]
pub use mock::MockIdentityBackend;
pub use types::AuthenticatedUser;

#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Authenticate the user with the password and request the token with
    /// the given scope.
    async fn authenticate(
        &self,
        credentials: &ServiceUserCredentials,
        scope: &Scope,
    ) -> Result<AuthenticatedUser, IdentityBackendError>;
}
