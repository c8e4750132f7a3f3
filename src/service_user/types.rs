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
//! # Service user types
use secrecy::SecretString;
use url::Url;

/// Credentials of the shared service account.
///
/// The password can not be read outside of the crate and is redacted in the
/// `Debug` output.
#[derive(Clone, Debug)]
pub struct ServiceUserCredentials {
    user_id: String,
    password: SecretString,
    user_domain_name: String,
}

impl ServiceUserCredentials {
    pub fn new<U: Into<String>, D: Into<String>>(
        user_id: U,
        password: SecretString,
        user_domain_name: D,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            password,
            user_domain_name: user_domain_name.into(),
        }
    }

    /// Name (or ID) of the service user.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Name of the domain owning the service user.
    pub fn user_domain_name(&self) -> &str {
        &self.user_domain_name
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Parameters for talking to an OpenStack service as the service user.
#[derive(Clone, Debug)]
pub struct ServiceConnection {
    /// Name of the service (`compute`, `network`, ...).
    pub service: String,
    /// Keystone v3 endpoint.
    pub auth_url: Url,
    /// Region of the service.
    pub region: Option<String>,
    /// Token to use.
    pub token: SecretString,
    /// Domain the token is scoped to.
    pub domain_id: Option<String>,
    /// Project the token is scoped to.
    pub project_id: Option<String>,
}
