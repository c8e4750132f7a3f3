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
//! # Identity driver types
//!
//! Keystone v3 entities as returned to the callers of the service user.
use derive_builder::Builder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use validator::Validate;

use crate::error::BuilderError;

/// Parameters a driver is created with.
#[derive(Clone, Debug, Validate)]
pub struct DriverParameters {
    /// Keystone v3 endpoint.
    pub auth_url: Url,
    /// Region the driver operates in.
    pub region: Option<String>,
    /// Token of the authenticated service user.
    pub token: SecretString,
    /// ID of the domain the token is scoped to.
    #[validate(length(min = 1, max = 64))]
    pub domain_id: String,
}

/// User.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct User {
    /// User ID.
    pub id: String,
    /// User name.
    pub name: String,
    /// User domain ID.
    pub domain_id: String,
    /// If the user is enabled, this value is `true`.
    #[serde(default)]
    pub enabled: bool,
    /// User description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Default project ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project_id: Option<String>,
}

/// User list filters.
#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct UserListParameters {
    /// Filter users by the domain ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Filter users by the name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter users by the enabled flag.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Group {
    /// Group ID.
    pub id: String,
    /// Group domain ID.
    pub domain_id: String,
    /// Group name.
    pub name: String,
    /// Group description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Group list filters.
#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct GroupListParameters {
    /// Filter groups by the domain ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Filter groups by the name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Role.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Role {
    /// Role ID.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Domain ID of a domain specific role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Role description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Role list filters.
#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct RoleListParameters {
    /// Filter roles by the domain ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Filter roles by the name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Domain.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Domain {
    /// Domain ID.
    pub id: String,
    /// Domain name.
    pub name: String,
    /// If the domain is enabled, this value is `true`.
    #[serde(default)]
    pub enabled: bool,
    /// Domain description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Project.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Project {
    /// Project ID.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Project domain ID.
    pub domain_id: String,
    /// If the project is enabled, this value is `true`.
    #[serde(default)]
    pub enabled: bool,
    /// Project description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent project ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Project tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Project list filters.
#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct ProjectListParameters {
    /// Filter projects by the domain ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Filter projects by the name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter projects by the parent project ID.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Filter projects by the enabled flag.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Project attributes to update. Unset fields are kept.
#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct ProjectUpdate {
    /// New project name.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New project description.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Enable or disable the project.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Replace the project tags.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Reference to the entity taking part in the role assignment.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EntityRef {
    /// Entity ID.
    pub id: String,
    /// Entity name, only present when names are requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Domain of the entity, only present when names are requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Value>,
}

/// Target of the role assignment.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentScope {
    /// Project target.
    Project(EntityRef),
    /// Domain target.
    Domain(EntityRef),
    /// System target.
    System(Value),
}

/// Role assignment.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoleAssignment {
    /// Assigned role.
    pub role: EntityRef,
    /// Assignment target.
    pub scope: AssignmentScope,
    /// User the role is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<EntityRef>,
    /// Group the role is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<EntityRef>,
}

/// Role assignment list filters.
#[derive(Builder, Clone, Debug, Default, PartialEq, Serialize)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(strip_option, into))]
pub struct RoleAssignmentListParameters {
    /// Filter by the domain the role is granted on.
    #[builder(default)]
    #[serde(rename = "scope.domain.id", skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Filter by the group.
    #[builder(default)]
    #[serde(rename = "group.id", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Filter by the project the role is granted on.
    #[builder(default)]
    #[serde(rename = "scope.project.id", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Filter by the role.
    #[builder(default)]
    #[serde(rename = "role.id", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    /// Filter by the user.
    #[builder(default)]
    #[serde(rename = "user.id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Resolve group memberships and role inheritance.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective: Option<bool>,
    /// Include the names of the entities.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_names: Option<bool>,
    /// Include the assignments on the project subtree.
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_subtree: Option<bool>,
}
