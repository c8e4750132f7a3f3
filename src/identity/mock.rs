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
//! # Identity backend - internal mocking tools.
use async_trait::async_trait;
use mockall::mock;

use crate::common::types::Scope;
use crate::identity::{AuthenticatedUser, IdentityBackend, IdentityBackendError};
use crate::service_user::types::ServiceUserCredentials;

mock! {
    pub IdentityBackend {}

    #[async_trait]
    impl IdentityBackend for IdentityBackend {
        async fn authenticate(
            &self,
            credentials: &ServiceUserCredentials,
            scope: &Scope,
        ) -> Result<AuthenticatedUser, IdentityBackendError>;
    }
}
