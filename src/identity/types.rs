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
//! # Identity backend types
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::BuilderError;

/// Domain reference in the token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DomainInfo {
    /// Domain ID.
    pub id: String,
    /// Domain name.
    #[serde(default)]
    pub name: String,
}

/// Project reference in the token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ProjectInfo {
    /// Project ID.
    pub id: String,
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// Project domain.
    #[serde(default)]
    pub domain: Option<DomainInfo>,
}

/// A service of the token catalog.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CatalogService {
    /// Service ID.
    #[serde(default)]
    pub id: String,
    /// Service type (`identity`, `compute`, ...).
    pub r#type: Option<String>,
    /// Service name.
    pub name: Option<String>,
    /// Service endpoints.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// A catalog endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Endpoint {
    /// Endpoint ID.
    #[serde(default)]
    pub id: String,
    /// Endpoint url.
    pub url: String,
    /// Endpoint interface (`public`, `internal`, `admin`).
    pub interface: String,
    /// Endpoint region.
    pub region: Option<String>,
    /// Endpoint region ID.
    pub region_id: Option<String>,
}

impl Endpoint {
    /// Region of the endpoint, preferring the region ID.
    pub fn region(&self) -> Option<&str> {
        self.region_id.as_deref().or(self.region.as_deref())
    }
}

/// Successfully authenticated user with the scoped token.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct AuthenticatedUser {
    /// The token.
    token: SecretString,

    /// Token expiration.
    expires_at: DateTime<Utc>,

    /// User ID.
    user_id: String,

    /// User name.
    #[builder(default)]
    user_name: Option<String>,

    /// Domain owning the user.
    #[builder(default)]
    user_domain: Option<DomainInfo>,

    /// Domain the token is scoped to.
    #[builder(default)]
    domain: Option<DomainInfo>,

    /// Project the token is scoped to.
    #[builder(default)]
    project: Option<ProjectInfo>,

    /// Names of the roles granted on the scope.
    #[builder(default)]
    roles: Vec<String>,

    /// Service catalog.
    #[builder(default)]
    catalog: Vec<CatalogService>,
}

impl AuthenticatedUser {
    pub fn builder() -> AuthenticatedUserBuilder {
        AuthenticatedUserBuilder::default()
    }

    /// The token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Whether the token is already expired.
    pub fn token_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Token expiration.
    pub fn token_expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// User ID.
    pub fn id(&self) -> &str {
        &self.user_id
    }

    /// User name.
    pub fn name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Domain of the user.
    pub fn user_domain(&self) -> Option<&DomainInfo> {
        self.user_domain.as_ref()
    }

    /// ID of the domain of the token scope.
    ///
    /// For project scoped tokens this is the domain of the project.
    pub fn domain_id(&self) -> Option<&str> {
        self.scope_domain().map(|domain| domain.id.as_str())
    }

    /// Name of the domain of the token scope.
    pub fn domain_name(&self) -> Option<&str> {
        self.scope_domain().map(|domain| domain.name.as_str())
    }

    /// Project of the token scope.
    pub fn project(&self) -> Option<&ProjectInfo> {
        self.project.as_ref()
    }

    /// Role names.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Service catalog.
    pub fn catalog(&self) -> &[CatalogService] {
        &self.catalog
    }

    /// Regions present in the service catalog in order of appearance.
    pub fn available_services_regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = Vec::new();
        for region in self
            .catalog
            .iter()
            .flat_map(|service| service.endpoints.iter())
            .filter_map(Endpoint::region)
        {
            if !regions.iter().any(|known| known == region) {
                regions.push(region.to_string());
            }
        }
        regions
    }

    /// Region serving the most services. The first region wins on a tie.
    pub fn default_services_region(&self) -> Option<String> {
        let regions = self.available_services_regions();
        let mut best: Option<(String, usize)> = None;
        for region in regions {
            let count = self
                .catalog
                .iter()
                .filter(|service| {
                    service
                        .endpoints
                        .iter()
                        .any(|ep| ep.region() == Some(region.as_str()))
                })
                .count();
            match &best {
                Some((_, best_count)) if *best_count >= count => {}
                _ => best = Some((region, count)),
            }
        }
        best.map(|(region, _)| region)
    }

    fn scope_domain(&self) -> Option<&DomainInfo> {
        self.domain
            .as_ref()
            .or_else(|| self.project.as_ref().and_then(|p| p.domain.as_ref()))
    }
}
