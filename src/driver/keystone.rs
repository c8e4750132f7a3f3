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
//! # Keystone identity driver
//!
//! Issues the Keystone v3 REST calls with the token of the service user.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use validator::Validate;

use crate::common::{ApiError, endpoint_url};
use crate::driver::types::*;
use crate::driver::{DriverError, DriverFactory, IdentityDriver};

/// Header carrying the token of the request.
static AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Driver talking to the Keystone v3 API.
#[derive(Clone, Debug)]
pub struct KeystoneDriver {
    http_client: Arc<Client>,
    params: DriverParameters,
}

#[derive(Deserialize)]
struct UserList {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
struct GroupList {
    groups: Vec<Group>,
}

#[derive(Deserialize)]
struct GroupResponse {
    group: Group,
}

#[derive(Deserialize)]
struct DomainResponse {
    domain: Domain,
}

#[derive(Deserialize)]
struct RoleList {
    roles: Vec<Role>,
}

#[derive(Deserialize)]
struct RoleAssignmentList {
    role_assignments: Vec<RoleAssignment>,
}

#[derive(Deserialize)]
struct ProjectList {
    projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ProjectResponse {
    project: Project,
}

impl KeystoneDriver {
    pub fn new(http_client: Arc<Client>, params: DriverParameters) -> Self {
        Self {
            http_client,
            params,
        }
    }

    fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, DriverError> {
        Ok(self
            .http_client
            .request(method, endpoint_url(&self.params.auth_url, path)?)
            .header(AUTH_TOKEN_HEADER, self.params.token.expose_secret()))
    }

    async fn fetch<T, Q>(&self, path: &[&str], query: &Q) -> Result<T, DriverError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized + Sync,
    {
        let response = self.request(Method::GET, path)?.query(query).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Fetch a single resource, `None` when Keystone does not know it.
    async fn fetch_optional<T>(&self, path: &[&str]) -> Result<Option<T>, DriverError>
    where
        T: DeserializeOwned,
    {
        let response = self.request(Method::GET, path)?.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check_status(response).await?.json().await?))
    }

    async fn execute(&self, method: Method, path: &[&str]) -> Result<(), DriverError> {
        let response = self.request(method, path)?.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Convert the non-success response into the [`ApiError`].
async fn check_status(response: Response) -> Result<Response, DriverError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!("Keystone returned {} for {}", status, response.url().path());
        Err(ApiError::from_body(status.as_u16(), response.text().await?).into())
    }
}

#[async_trait]
impl IdentityDriver for KeystoneDriver {
    fn auth_token(&self) -> SecretString {
        self.params.token.clone()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_users(&self, params: &UserListParameters) -> Result<Vec<User>, DriverError> {
        Ok(self.fetch::<UserList, _>(&["users"], params).await?.users)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DriverError> {
        Ok(self
            .fetch_optional::<UserResponse>(&["users", user_id])
            .await?
            .map(|x| x.user))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_groups(&self, params: &GroupListParameters) -> Result<Vec<Group>, DriverError> {
        Ok(self.fetch::<GroupList, _>(&["groups"], params).await?.groups)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, DriverError> {
        Ok(self
            .fetch_optional::<GroupResponse>(&["groups", group_id])
            .await?
            .map(|x| x.group))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_group_members(
        &self,
        group_id: &str,
        params: &UserListParameters,
    ) -> Result<Vec<User>, DriverError> {
        Ok(self
            .fetch::<UserList, _>(&["groups", group_id, "users"], params)
            .await?
            .users)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn add_user_to_group(&self, group_id: &str, user_id: &str) -> Result<(), DriverError> {
        self.execute(Method::PUT, &["groups", group_id, "users", user_id])
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove_user_from_group(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), DriverError> {
        self.execute(Method::DELETE, &["groups", group_id, "users", user_id])
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn check_user_in_group(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<bool, DriverError> {
        let response = self
            .request(Method::HEAD, &["groups", group_id, "users", user_id])?
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_domain(&self, domain_id: &str) -> Result<Option<Domain>, DriverError> {
        Ok(self
            .fetch_optional::<DomainResponse>(&["domains", domain_id])
            .await?
            .map(|x| x.domain))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_roles(&self, params: &RoleListParameters) -> Result<Vec<Role>, DriverError> {
        Ok(self.fetch::<RoleList, _>(&["roles"], params).await?.roles)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_role_assignments(
        &self,
        params: &RoleAssignmentListParameters,
    ) -> Result<Vec<RoleAssignment>, DriverError> {
        Ok(self
            .fetch::<RoleAssignmentList, _>(&["role_assignments"], params)
            .await?
            .role_assignments)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn grant_domain_user_role(
        &self,
        domain_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError> {
        self.execute(
            Method::PUT,
            &["domains", domain_id, "users", user_id, "roles", role_id],
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn grant_project_user_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError> {
        self.execute(
            Method::PUT,
            &["projects", project_id, "users", user_id, "roles", role_id],
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn revoke_project_user_role(
        &self,
        project_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError> {
        self.execute(
            Method::DELETE,
            &["projects", project_id, "users", user_id, "roles", role_id],
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn grant_project_group_role(
        &self,
        project_id: &str,
        group_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError> {
        self.execute(
            Method::PUT,
            &["projects", project_id, "groups", group_id, "roles", role_id],
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn revoke_project_group_role(
        &self,
        project_id: &str,
        group_id: &str,
        role_id: &str,
    ) -> Result<(), DriverError> {
        self.execute(
            Method::DELETE,
            &["projects", project_id, "groups", group_id, "roles", role_id],
        )
        .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_projects(
        &self,
        params: &ProjectListParameters,
    ) -> Result<Vec<Project>, DriverError> {
        Ok(self.fetch::<ProjectList, _>(&["projects"], params).await?.projects)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_user_projects(
        &self,
        user_id: &str,
        params: &ProjectListParameters,
    ) -> Result<Vec<Project>, DriverError> {
        Ok(self
            .fetch::<ProjectList, _>(&["users", user_id, "projects"], params)
            .await?
            .projects)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>, DriverError> {
        Ok(self
            .fetch_optional::<ProjectResponse>(&["projects", project_id])
            .await?
            .map(|x| x.project))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn update_project(
        &self,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, DriverError> {
        let response = self
            .request(Method::PATCH, &["projects", project_id])?
            .json(&json!({ "project": update }))
            .send()
            .await?;
        Ok(check_status(response)
            .await?
            .json::<ProjectResponse>()
            .await?
            .project)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn delete_project(&self, project_id: &str) -> Result<(), DriverError> {
        self.execute(Method::DELETE, &["projects", project_id])
            .await
    }
}

/// Factory of the [`KeystoneDriver`] sharing one HTTP client.
#[derive(Clone, Debug)]
pub struct KeystoneDriverFactory {
    http_client: Arc<Client>,
}

impl KeystoneDriverFactory {
    pub fn new(http_client: Arc<Client>) -> Self {
        Self { http_client }
    }
}

impl DriverFactory for KeystoneDriverFactory {
    #[tracing::instrument(
        level = "debug",
        skip(self, params),
        fields(domain_id = %params.domain_id, region = ?params.region),
        err
    )]
    fn new_driver(
        &self,
        params: &DriverParameters,
    ) -> Result<Arc<dyn IdentityDriver>, DriverError> {
        params.validate()?;
        Ok(Arc::new(KeystoneDriver::new(
            self.http_client.clone(),
            params.clone(),
        )))
    }
}
