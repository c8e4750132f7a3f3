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
//! # Identity driver
//!
//! The driver is the long living connection of the service user to the
//! identity service within a single domain. It is created by the
//! [`DriverFactory`] from the token of a successful authentication and is
//! cached by the session until the token gets rejected.
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

pub mod error;
pub mod keystone;
#[cfg(test)]
mod mock;
pub mod types;

pub use error::DriverError;
pub use keystone::{KeystoneDriver, KeystoneDriverFactory};
#[cfg(test)]
pub use mock::{MockDriverFactory, MockIdentityDriver};
pub use types::*;

/// Operations of the identity service used by the dashboard.
#[async_trait]
pub trait IdentityDriver: Send + Sync {
    /// Token the driver authenticates its requests with.
    fn auth_token(&self) -> SecretString;

    /// List users.
    async fn list_users(&self, params: &UserListParameters) -> Result<Vec<User>, DriverError>;

    /// Get a single user by ID.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DriverError>;

    /// List groups.
    async fn list_groups(&self, params: &GroupListParameters) -> Result<Vec<Group>, DriverError>;

    /// Get a single group by ID.
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, DriverError>;

    /// List the members of the group.
    async fn list_group_members(
        &self,
        group_id: &str,
        params: &UserListParameters,
    ) -> Result<Vec<User>, DriverError>;

    /// Add the user to the group.
    async fn add_user_to_group(&self, group_id: &str, user_id: &str) -> Result<(), DriverError>;

    /// Remove the user from the group.
    async fn remove_user_from_group(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), DriverError>;

    /// Check whether the user is member of the group.
    async fn check_user_in_group(&self, group_id: &str, user_id: &str)
    -> Result<bool, DriverError>;

    /// Get a single domain by ID.
    async fn get_domain(&self, domain_id: &str) -> Result<Option<Domain>, DriverError>;

    /// List roles.
    async fn list_roles(&self, params: &RoleListParameters) -> Result<Vec<Role>, DriverError>;

    /// List role assignments.
    async fn list_role_assignments(
        &self,
        params: &RoleAssignmentListParameters,
    ) -> Result<Vec<RoleAssignment>, DriverError>;

    /// Grant the role to the user on the domain.
    async fn grant_domain_user_role(
        &self,
        domain_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError>;

    /// Grant the role to the user on the project.
    async fn grant_project_user_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError>;

    /// Revoke the role of the user on the project.
    async fn revoke_project_user_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError>;

    /// Grant the role to the group on the project.
    async fn grant_project_group_role(
        &self,
        project_id: &str,
        group_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError>;

    /// Revoke the role of the group on the project.
    async fn revoke_project_group_role(
        &self,
        project_id: &str,
        group_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError>;

    /// List projects.
    async fn list_projects(
        &self,
        params: &ProjectListParameters,
    ) -> Result<Vec<Project>, DriverError>;

    /// List the projects the user has access to.
    async fn list_user_projects(
        &self,
        user_id: &str,
        params: &ProjectListParameters,
    ) -> Result<Vec<Project>, DriverError>;

    /// Get a single project by ID.
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, DriverError>;

    /// Update the project.
    async fn update_project(
        &self,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, DriverError>;

    /// Delete the project.
    async fn delete_project(&self, project_id: &str) -> Result<(), DriverError>;
}

/// Creates drivers for freshly authenticated service users.
pub trait DriverFactory: Send + Sync {
    /// Create the driver.
    fn new_driver(
        &self,
        params: &DriverParameters,
    ) -> Result<Arc<dyn IdentityDriver>, DriverError>;
}
