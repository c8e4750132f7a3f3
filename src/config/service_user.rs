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
//! # Service user configuration.
use secrecy::SecretString;
use serde::Deserialize;

/// Credentials of the shared service account.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ServiceUserSection {
    /// User name (or ID) of the service account.
    pub user_id: Option<String>,

    /// Password of the service account.
    pub password: Option<SecretString>,

    /// Name of the domain owning the service account.
    pub domain_name: Option<String>,
}

/// Cloud admin project used for the privileged service connections.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudAdminSection {
    /// Domain of the cloud admin project.
    #[serde(default = "default_cloud_admin_domain")]
    pub domain: String,

    /// Name of the cloud admin project.
    #[serde(default = "default_cloud_admin_project")]
    pub project: String,
}

impl Default for CloudAdminSection {
    fn default() -> Self {
        Self {
            domain: default_cloud_admin_domain(),
            project: default_cloud_admin_project(),
        }
    }
}

fn default_cloud_admin_domain() -> String {
    "ccadmin".into()
}

fn default_cloud_admin_project() -> String {
    "cloud_admin".into()
}

/// Region configuration.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct RegionSection {
    /// Region used when the token catalog does not dictate another one.
    pub default: Option<String>,
}
