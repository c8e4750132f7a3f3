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
//! # Keystone identity backend
//!
//! Password authentication against the Keystone v3 `auth/tokens` endpoint.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};
use url::Url;
use validator::Validate;

use crate::common::{ApiError, endpoint_url, types::Scope};
use crate::identity::types::{CatalogService, DomainInfo, ProjectInfo};
use crate::identity::{AuthenticatedUser, IdentityBackend, IdentityBackendError};
use crate::service_user::types::ServiceUserCredentials;

/// Header carrying the issued token.
static SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Identity backend talking to Keystone.
#[derive(Clone, Debug)]
pub struct KeystoneIdentityBackend {
    /// Reqwest client.
    http_client: Arc<Client>,
    /// Keystone v3 endpoint.
    auth_url: Url,
}

impl KeystoneIdentityBackend {
    pub fn new(http_client: Arc<Client>, auth_url: Url) -> Self {
        Self {
            http_client,
            auth_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenData,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    expires_at: DateTime<Utc>,
    user: TokenUser,
    #[serde(default)]
    domain: Option<DomainInfo>,
    #[serde(default)]
    project: Option<ProjectInfo>,
    #[serde(default)]
    roles: Vec<TokenRole>,
    #[serde(default)]
    catalog: Vec<CatalogService>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    domain: Option<DomainInfo>,
}

#[derive(Debug, Deserialize)]
struct TokenRole {
    name: String,
}

impl TokenData {
    fn into_authenticated_user(
        self,
        token: String,
    ) -> Result<AuthenticatedUser, IdentityBackendError> {
        let mut builder = AuthenticatedUser::builder();
        builder
            .token(token)
            .expires_at(self.expires_at)
            .user_id(self.user.id)
            .roles(self.roles.into_iter().map(|r| r.name).collect::<Vec<_>>())
            .catalog(self.catalog);
        if let Some(name) = self.user.name {
            builder.user_name(name);
        }
        if let Some(domain) = self.user.domain {
            builder.user_domain(domain);
        }
        if let Some(domain) = self.domain {
            builder.domain(domain);
        }
        if let Some(project) = self.project {
            builder.project(project);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl IdentityBackend for KeystoneIdentityBackend {
    /// Authenticate the user with the password method.
    #[tracing::instrument(
        level = "debug",
        skip(self, credentials),
        fields(user = credentials.user_id(), user_domain = credentials.user_domain_name()),
        err
    )]
    async fn authenticate(
        &self,
        credentials: &ServiceUserCredentials,
        scope: &Scope,
    ) -> Result<AuthenticatedUser, IdentityBackendError> {
        scope.validate()?;

        let body = json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": credentials.user_id(),
                            "password": credentials.password().expose_secret(),
                            "domain": {"name": credentials.user_domain_name()},
                        }
                    }
                },
                "scope": scope,
            }
        });

        let response = self
            .http_client
            .post(endpoint_url(&self.auth_url, &["auth", "tokens"])?)
            .query(&[("nocatalog", "false")])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            debug!("Keystone returned {} for scope {}", status, scope);
            return Err(ApiError::from_body(status.as_u16(), text).into());
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .ok_or(IdentityBackendError::MissingSubjectToken)?
            .to_str()?
            .to_string();
        let data: TokenResponse = response.json().await?;
        trace!("token issued till {}", data.token.expires_at);
        data.token.into_authenticated_user(token)
    }
}
