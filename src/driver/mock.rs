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
//! # Identity driver - internal mocking tools.
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use secrecy::SecretString;

use crate::driver::types::*;
use crate::driver::{DriverError, DriverFactory, IdentityDriver};

mock! {
    pub IdentityDriver {}

    #[async_trait]
    impl IdentityDriver for IdentityDriver {
        fn auth_token(&self) -> SecretString;

        async fn list_users(&self, params: &UserListParameters) -> Result<Vec<User>, DriverError>;

        async fn get_user(&self, user_id: &str) -> Result<Option<User>, DriverError>;

        async fn list_groups(&self, params: &GroupListParameters) -> Result<Vec<Group>, DriverError>;

        async fn get_group(&self, group_id: &str) -> Result<Option<Group>, DriverError>;

        async fn list_group_members(
            &self,
            group_id: &str,
            params: &UserListParameters,
        ) -> Result<Vec<User>, DriverError>;

        async fn add_user_to_group(&self, group_id: &str, user_id: &str) -> Result<(), DriverError>;

        async fn remove_user_from_group(
            &self,
            group_id: &str,
            user_id: &str,
        ) -> Result<(), DriverError>;

        async fn check_user_in_group(
            &self,
            group_id: &str,
            user_id: &str,
        ) -> Result<bool, DriverError>;

        async fn get_domain(&self, domain_id: &str) -> Result<Option<Domain>, DriverError>;

        async fn list_roles(&self, params: &RoleListParameters) -> Result<Vec<Role>, DriverError>;

        async fn list_role_assignments(
            &self,
            params: &RoleAssignmentListParameters,
        ) -> Result<Vec<RoleAssignment>, DriverError>;

        async fn grant_domain_user_role(
            &self,
            domain_id: &str,
            user_id: &str,
            role_id: &str,
        ) -> Result<(), DriverError>;

        async fn grant_project_user_role(
            &self,
            project_id: &str,
            user_id: &str,
            role_id: &str,
        ) -> Result<(), DriverError>;

        async fn revoke_project_user_role(
            &self,
            project_id: &str,
            user_id: &str,
            role_id: &str,
        ) -> Result<(), DriverError>;

        async fn grant_project_group_role(
            &self,
            project_id: &str,
            group_id: &str,
            role_id: &str,
        ) -> Result<(), DriverError>;

        async fn revoke_project_group_role(
            &self,
            project_id: &str,
            group_id: &str,
            role_id: &str,
        ) -> Result<(), DriverError>;

        async fn list_projects(
            &self,
            params: &ProjectListParameters,
        ) -> Result<Vec<Project>, DriverError>;

        async fn list_user_projects(
            &self,
            user_id: &str,
            params: &ProjectListParameters,
        ) -> Result<Vec<Project>, DriverError>;

        async fn get_project(&self, project_id: &str) -> Result<Option<Project>, DriverError>;

        async fn update_project(
            &self,
            project_id: &str,
            update: &ProjectUpdate,
        ) -> Result<Project, DriverError>;

        async fn delete_project(&self, project_id: &str) -> Result<(), DriverError>;
    }
}

mock! {
    pub DriverFactory {}

    impl DriverFactory for DriverFactory {
        fn new_driver(
            &self,
            params: &DriverParameters,
        ) -> Result<Arc<dyn IdentityDriver>, DriverError>;
    }
}
