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
//! # Keystone endpoint configuration.
use serde::Deserialize;
use url::Url;

use crate::config::ConfigError;

/// Keystone endpoint configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct KeystoneSection {
    /// Keystone v3 endpoint used for authentication and identity calls.
    pub auth_endpoint: Option<String>,

    /// Host of the Keystone service. Takes precedence over `auth_endpoint`
    /// when set together with the port.
    pub authority_service_host: Option<String>,

    /// Port of the Keystone service.
    pub authority_service_port: Option<u16>,

    /// Protocol used to reach the Keystone service.
    #[serde(default = "default_proto")]
    pub authority_service_proto: String,

    /// Verify the TLS certificates of the OpenStack services.
    #[serde(default = "default_true")]
    pub ssl_verify_peer: bool,
}

impl Default for KeystoneSection {
    fn default() -> Self {
        Self {
            auth_endpoint: None,
            authority_service_host: None,
            authority_service_port: None,
            authority_service_proto: default_proto(),
            ssl_verify_peer: true,
        }
    }
}

impl KeystoneSection {
    /// Effective Keystone endpoint.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        if let (Some(host), Some(port)) =
            (&self.authority_service_host, self.authority_service_port)
        {
            return Ok(Url::parse(&format!(
                "{}://{}:{}/v3",
                self.authority_service_proto, host, port
            ))?);
        }
        match &self.auth_endpoint {
            Some(endpoint) if !endpoint.is_empty() => Ok(Url::parse(endpoint)?),
            _ => Err(ConfigError::MissingAuthEndpoint),
        }
    }
}

fn default_proto() -> String {
    "http".into()
}

fn default_true() -> bool {
    true
}
