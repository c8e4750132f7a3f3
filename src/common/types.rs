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
//! # Common types
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// The authorization scope of a token, either a project or a domain.
///
/// A domain may be identified by the ID or by the name. A project identified
/// by name must also carry its domain.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Project scope.
    Project(Project),
    /// Domain scope.
    Domain(Domain),
}

impl Scope {
    /// Domain scope addressed by the domain ID.
    pub fn domain_id<S: Into<String>>(id: S) -> Self {
        Self::Domain(Domain {
            id: Some(id.into()),
            name: None,
        })
    }

    /// Domain scope addressed by the domain name.
    pub fn domain_name<S: Into<String>>(name: S) -> Self {
        Self::Domain(Domain {
            id: None,
            name: Some(name.into()),
        })
    }

    /// Project scope addressed by the project name within the named domain.
    pub fn project_in_domain<P: Into<String>, D: Into<String>>(project: P, domain: D) -> Self {
        Self::Project(Project {
            id: None,
            name: Some(project.into()),
            domain: Some(Domain {
                id: None,
                name: Some(domain.into()),
            }),
        })
    }

    /// Whether the scope addresses a domain by its ID.
    pub fn is_domain_by_id(&self) -> bool {
        matches!(self, Self::Domain(Domain { id: Some(_), .. }))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(domain) => write!(f, "{{domain: {domain}}}"),
            Self::Project(project) => {
                write!(f, "{{project: {{")?;
                if let Some(id) = &project.id {
                    write!(f, "id: {id}")?;
                } else if let Some(name) = &project.name {
                    write!(f, "name: {name}")?;
                }
                if let Some(domain) = &project.domain {
                    write!(f, ", domain: {domain}")?;
                }
                write!(f, "}}}}")
            }
        }
    }
}

/// Project scope information
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[builder(setter(into))]
pub struct Project {
    /// Project ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    /// Project Name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    /// Domain the project belongs to.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub domain: Option<Domain>,
}

/// Domain scope information.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[builder(setter(into))]
pub struct Domain {
    /// Domain ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    /// Domain Name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, &self.name) {
            (Some(id), _) => write!(f, "{{id: {id}}}"),
            (None, Some(name)) => write!(f, "{{name: {name}}}"),
            (None, None) => write!(f, "{{}}"),
        }
    }
}

impl Validate for Scope {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Self::Project(x) => x.validate(),
            Self::Domain(x) => x.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scope_serialization() {
        assert_eq!(
            json!({"domain": {"id": "did"}}),
            serde_json::to_value(Scope::domain_id("did")).unwrap()
        );
        assert_eq!(
            json!({"domain": {"name": "dname"}}),
            serde_json::to_value(Scope::domain_name("dname")).unwrap()
        );
        assert_eq!(
            json!({"project": {"name": "cloud_admin", "domain": {"name": "ccadmin"}}}),
            serde_json::to_value(Scope::project_in_domain("cloud_admin", "ccadmin")).unwrap()
        );
    }

    #[test]
    fn test_scope_display() {
        assert_eq!("{domain: {id: did}}", Scope::domain_id("did").to_string());
        assert_eq!("{domain: {name: dn}}", Scope::domain_name("dn").to_string());
        assert_eq!(
            "{project: {name: p, domain: {name: d}}}",
            Scope::project_in_domain("p", "d").to_string()
        );
    }

    #[test]
    fn test_scope_validation() {
        assert!(Scope::domain_id("did").validate().is_ok());
        assert!(Scope::domain_id("").validate().is_err());
        assert!(Scope::domain_name("x".repeat(65)).validate().is_err());
        assert!(Scope::project_in_domain("p", "").validate().is_err());
    }

    #[test]
    fn test_is_domain_by_id() {
        assert!(Scope::domain_id("did").is_domain_by_id());
        assert!(!Scope::domain_name("dn").is_domain_by_id());
        assert!(!Scope::project_in_domain("p", "d").is_domain_by_id());
    }
}
