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
//! # Service user operations
//!
//! Convenience wrappers over [`ServiceUserSession::driver_method`].
use crate::common::types::Scope;
use crate::driver::types::*;
use crate::service_user::error::ServiceUserError;
use crate::service_user::lookup::Lookup;
use crate::service_user::session::ServiceUserSession;
use crate::service_user::types::ServiceConnection;

impl ServiceUserSession {
    /// List users.
    pub async fn users(&self, params: &UserListParameters) -> Result<Vec<User>, ServiceUserError> {
        self.driver_method(|driver| async move { driver.list_users(params).await })
            .await
    }

    /// Get the user by ID.
    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>, ServiceUserError> {
        self.driver_method(|driver| async move { driver.get_user(user_id).await })
            .await
    }

    /// List groups.
    pub async fn groups(
        &self,
        params: &GroupListParameters,
    ) -> Result<Vec<Group>, ServiceUserError> {
        self.driver_method(|driver| async move { driver.list_groups(params).await })
            .await
    }

    /// List the members of the group.
    pub async fn group_members(&self, group_id: &str) -> Result<Vec<User>, ServiceUserError> {
        self.driver_method(|driver| async move {
            driver
                .list_group_members(group_id, &UserListParameters::default())
                .await
        })
        .await
    }

    /// Get the group by ID.
    pub async fn find_group(&self, group_id: &str) -> Result<Option<Group>, ServiceUserError> {
        self.driver_method(|driver| async move { driver.get_group(group_id).await })
            .await
    }

    /// Get the domain by ID.
    pub async fn find_domain(&self, domain_id: &str) -> Result<Option<Domain>, ServiceUserError> {
        self.driver_method(|driver| async move { driver.get_domain(domain_id).await })
            .await
    }

    /// List all roles.
    pub async fn roles(&self) -> Result<Vec<Role>, ServiceUserError> {
        self.driver_method(|driver| async move {
            driver.list_roles(&RoleListParameters::default()).await
        })
        .await
    }

    /// List role assignments.
    pub async fn role_assignments(
        &self,
        params: &RoleAssignmentListParameters,
    ) -> Result<Vec<RoleAssignment>, ServiceUserError> {
        self.driver_method(|driver| async move { driver.list_role_assignments(params).await })
            .await
    }

    /// List the projects the user has access to.
    pub async fn user_projects(&self, user_id: &str) -> Result<Vec<Project>, ServiceUserError> {
        self.driver_method(|driver| async move {
            driver
                .list_user_projects(user_id, &ProjectListParameters::default())
                .await
        })
        .await
    }

    /// Get the global role with the given name.
    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, ServiceUserError> {
        let params = RoleListParameters {
            name: Some(name.to_string()),
            ..Default::default()
        };
        let roles = self
            .driver_method(|driver| {
                let params = &params;
                async move { driver.list_roles(params).await }
            })
            .await?;
        Ok(roles.into_iter().find(|role| role.name == name))
    }

    /// Find the project by ID or by name within the domain of the session.
    ///
    /// `NotFound` is only reported when neither lookup failed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn find_project_by_name_or_id(&self, name_or_id: &str) -> Lookup<Project> {
        let by_id = self
            .driver_method(|driver| async move { driver.get_project(name_or_id).await })
            .await;
        let failure = match by_id {
            Ok(Some(project)) => return Lookup::Found(project),
            Ok(None) => None,
            Err(err) => Some(err),
        };

        let by_name = match self.domain_id().await {
            Ok(domain_id) => {
                let params = ProjectListParameters {
                    domain_id,
                    name: Some(name_or_id.to_string()),
                    ..Default::default()
                };
                self.driver_method(|driver| {
                    let params = &params;
                    async move { driver.list_projects(params).await }
                })
                .await
            }
            Err(err) => Err(err),
        };
        match (by_name, failure) {
            (Ok(projects), failure) => match (projects.into_iter().next(), failure) {
                (Some(project), _) => Lookup::Found(project),
                (None, None) => Lookup::NotFound,
                (None, Some(err)) => Lookup::LookupFailed(err),
            },
            (Err(err), _) => Lookup::LookupFailed(err),
        }
    }

    /// Grant the named role to the user on the domain of the session.
    ///
    /// A missing role is reported as `NotFound`.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn grant_user_domain_member_role(&self, user_id: &str, role_name: &str) -> Lookup<()> {
        let role = match Lookup::from_optional(self.find_role_by_name(role_name).await) {
            Lookup::Found(role) => role,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::LookupFailed(err) => return Lookup::LookupFailed(err),
        };
        let domain_id = match self.required_domain_id().await {
            Ok(domain_id) => domain_id,
            Err(err) => return Lookup::LookupFailed(err),
        };
        let (domain_id, role_id) = (domain_id.as_str(), role.id.as_str());
        Lookup::from_result(
            self.driver_method(|driver| async move {
                driver
                    .grant_domain_user_role(domain_id, user_id, role_id)
                    .await
            })
            .await,
        )
    }

    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn grant_project_user_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), ServiceUserError> {
        self.driver_method(|driver| async move {
            driver
                .grant_project_user_role(project_id, user_id, role_id)
                .await
        })
        .await
    }

    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn revoke_project_user_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), ServiceUserError> {
        self.driver_method(|driver| async move {
            driver
                .revoke_project_user_role(project_id, user_id, role_id)
                .await
        })
        .await
    }

    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn grant_project_group_role(
        &self,
        project_id: &str,
        group_id: &str,
        role_id: &str,
    ) -> Result<(), ServiceUserError> {
        self.driver_method(|driver| async move {
            driver
                .grant_project_group_role(project_id, group_id, role_id)
                .await
        })
        .await
    }

    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn revoke_project_group_role(
        &self,
        project_id: &str,
        group_id: &str,
        role_id: &str,
    ) -> Result<(), ServiceUserError> {
        self.driver_method(|driver| async move {
            driver
                .revoke_project_group_role(project_id, group_id, role_id)
                .await
        })
        .await
    }

    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn update_project(
        &self,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, ServiceUserError> {
        self.driver_method(|driver| async move { driver.update_project(project_id, update).await })
            .await
    }

    #[tracing::instrument(level = "info", skip(self), err)]
    pub async fn delete_project(&self, project_id: &str) -> Result<(), ServiceUserError> {
        self.driver_method(|driver| async move { driver.delete_project(project_id).await })
            .await
    }

    /// Add the user to the group with the given name.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn add_user_to_group(&self, user_id: &str, group_name: &str) -> Lookup<()> {
        let group = match self.find_group_by_name(group_name).await {
            Lookup::Found(group) => group,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::LookupFailed(err) => return Lookup::LookupFailed(err),
        };
        let group_id = group.id.as_str();
        Lookup::from_result(
            self.driver_method(|driver| async move {
                driver.add_user_to_group(group_id, user_id).await
            })
            .await,
        )
    }

    /// Remove the user from the group with the given name.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn remove_user_from_group(&self, user_id: &str, group_name: &str) -> Lookup<()> {
        let group = match self.find_group_by_name(group_name).await {
            Lookup::Found(group) => group,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::LookupFailed(err) => return Lookup::LookupFailed(err),
        };
        let group_id = group.id.as_str();
        Lookup::from_result(
            self.driver_method(|driver| async move {
                driver.remove_user_from_group(group_id, user_id).await
            })
            .await,
        )
    }

    /// Check the membership of the user in the group with the given name.
    pub async fn group_user_check(&self, user_id: &str, group_name: &str) -> Lookup<bool> {
        let group = match self.find_group_by_name(group_name).await {
            Lookup::Found(group) => group,
            Lookup::NotFound => return Lookup::NotFound,
            Lookup::LookupFailed(err) => return Lookup::LookupFailed(err),
        };
        let group_id = group.id.as_str();
        Lookup::from_result(
            self.driver_method(|driver| async move {
                driver.check_user_in_group(group_id, user_id).await
            })
            .await,
        )
    }

    /// Connection parameters of the service within the domain of the
    /// session.
    pub async fn domain_admin_service(
        &self,
        service: &str,
    ) -> Result<ServiceConnection, ServiceUserError> {
        let auth_user = self.auth_user().await?;
        Ok(ServiceConnection {
            service: service.to_string(),
            auth_url: self.provider().auth_url().clone(),
            region: self.default_region().await?,
            token: self.token().await?,
            domain_id: auth_user.domain_id().map(String::from),
            project_id: None,
        })
    }

    /// Connection parameters of the service with the token of the service
    /// user scoped to the cloud admin project.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn cloud_admin_service(
        &self,
        service: &str,
    ) -> Result<ServiceConnection, ServiceUserError> {
        let region = self.default_region().await?;
        let cloud_admin = &self.provider().config.cloud_admin;
        let scope = Scope::project_in_domain(&cloud_admin.project, &cloud_admin.domain);
        let result = self
            .provider()
            .get_identity_backend()
            .authenticate(self.credentials(), &scope)
            .await;
        let admin = result.map_err(|source| self.rejected(source, scope))?;
        Ok(ServiceConnection {
            service: service.to_string(),
            auth_url: self.provider().auth_url().clone(),
            region,
            token: admin.token().clone(),
            domain_id: admin.domain_id().map(String::from),
            project_id: admin.project().map(|project| project.id.clone()),
        })
    }

    async fn default_region(&self) -> Result<Option<String>, ServiceUserError> {
        let auth_user = self.auth_user().await?;
        Ok(self
            .provider()
            .get_region_resolver()
            .locate_region(&auth_user))
    }

    async fn required_domain_id(&self) -> Result<String, ServiceUserError> {
        self.domain_id()
            .await?
            .ok_or_else(|| ServiceUserError::MissingDomainScope(self.current_domain().to_string()))
    }

    /// Find the group by name within the domain of the session.
    async fn find_group_by_name(&self, name: &str) -> Lookup<Group> {
        let domain_id = match self.required_domain_id().await {
            Ok(domain_id) => domain_id,
            Err(err) => return Lookup::LookupFailed(err),
        };
        let params = GroupListParameters {
            domain_id: Some(domain_id),
            name: Some(name.to_string()),
        };
        Lookup::from_optional(
            self.driver_method(|driver| {
                let params = &params;
                async move { driver.list_groups(params).await }
            })
            .await
            .map(|groups| groups.into_iter().find(|group| group.name == name)),
        )
    }
}
