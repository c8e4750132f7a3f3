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
//! # Service user session
//!
//! The session authenticates the service user lazily once per domain and
//! keeps the issued credentials together with the driver created from them.
//! Handles of the session are cheap to clone. A handle always addresses one
//! domain (the `current_domain`); [`ServiceUserSession::in_domain_scope`]
//! hands out another handle of the same session addressing a different
//! domain, so the domain of the original handle can never be changed from
//! within the scoped block.
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::common::types::Scope;
use crate::driver::{DriverError, DriverParameters, IdentityDriver};
use crate::identity::{AuthenticatedUser, IdentityBackendError};
use crate::provider::Provider;
use crate::service_user::error::{AuthenticationError, ServiceUserError};
use crate::service_user::types::ServiceUserCredentials;

/// Credentials and drivers per domain.
///
/// Every domain with a driver also has credentials. Both maps are guarded by
/// the same lock so that the pair is always replaced together.
#[derive(Default)]
struct SessionCache {
    auth_users: HashMap<String, AuthenticatedUser>,
    drivers: HashMap<String, Arc<dyn IdentityDriver>>,
}

struct SessionState {
    provider: Provider,
    credentials: ServiceUserCredentials,
    scope_domain: String,
    cache: RwLock<SessionCache>,
    /// Serializes the authentication requests.
    auth_lock: Mutex<()>,
}

/// Service user authenticated in the scope domain.
#[derive(Clone)]
pub struct ServiceUserSession {
    state: Arc<SessionState>,
    current_domain: String,
}

impl fmt::Debug for ServiceUserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceUserSession")
            .field("user_id", &self.state.credentials.user_id())
            .field("user_domain_name", &self.state.credentials.user_domain_name())
            .field("scope_domain", &self.state.scope_domain)
            .field("current_domain", &self.current_domain)
            .finish_non_exhaustive()
    }
}

impl ServiceUserSession {
    /// Create the session without authenticating.
    pub fn new<S: Into<String>>(
        provider: Provider,
        credentials: ServiceUserCredentials,
        scope_domain: S,
    ) -> Self {
        let scope_domain = scope_domain.into();
        Self {
            current_domain: scope_domain.clone(),
            state: Arc::new(SessionState {
                provider,
                credentials,
                scope_domain,
                cache: RwLock::new(SessionCache::default()),
                auth_lock: Mutex::new(()),
            }),
        }
    }

    /// Create the session and authenticate in the scope domain.
    #[tracing::instrument(level = "info", skip(provider, credentials), fields(user = credentials.user_id()), err)]
    pub async fn connect(
        provider: Provider,
        credentials: ServiceUserCredentials,
        scope_domain: &str,
    ) -> Result<Self, ServiceUserError> {
        let session = Self::new(provider, credentials, scope_domain);
        session.authenticate().await?;
        Ok(session)
    }

    /// Whether both handles belong to the same session.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Domain (ID or name) the session was created for.
    pub fn scope_domain(&self) -> &str {
        &self.state.scope_domain
    }

    /// Domain (ID or name) the calls of this handle go to.
    pub fn current_domain(&self) -> &str {
        &self.current_domain
    }

    /// Name (or ID) of the service user.
    pub fn user_id(&self) -> &str {
        self.state.credentials.user_id()
    }

    /// Name of the domain owning the service user.
    pub fn user_domain_name(&self) -> &str {
        self.state.credentials.user_domain_name()
    }

    pub(super) fn credentials(&self) -> &ServiceUserCredentials {
        &self.state.credentials
    }

    pub(super) fn provider(&self) -> &Provider {
        &self.state.provider
    }

    /// Authenticate in the current domain, replacing the cached credentials
    /// and driver.
    ///
    /// The domain is first treated as the domain ID. When Keystone answers
    /// this with 400 or 401 the authentication is repeated once with the
    /// domain treated as the domain name.
    #[tracing::instrument(level = "debug", skip(self), fields(domain = %self.current_domain), err)]
    pub async fn authenticate(&self) -> Result<AuthenticatedUser, ServiceUserError> {
        let _guard = self.state.auth_lock.lock().await;
        self.authenticate_locked().await.map(|(auth_user, _)| auth_user)
    }

    /// Credentials of the current domain, authenticating when missing.
    pub async fn auth_user(&self) -> Result<AuthenticatedUser, ServiceUserError> {
        if let Some(auth_user) = self.cached_auth_user().await {
            return Ok(auth_user);
        }
        let _guard = self.state.auth_lock.lock().await;
        if let Some(auth_user) = self.cached_auth_user().await {
            return Ok(auth_user);
        }
        self.authenticate_locked().await.map(|(auth_user, _)| auth_user)
    }

    /// Driver of the current domain. Does not authenticate.
    pub async fn driver(&self) -> Option<Arc<dyn IdentityDriver>> {
        self.state
            .cache
            .read()
            .await
            .drivers
            .get(&self.current_domain)
            .cloned()
    }

    /// Token of the current domain.
    pub async fn token(&self) -> Result<SecretString, ServiceUserError> {
        if let Some(driver) = self.driver().await {
            return Ok(driver.auth_token());
        }
        Ok(self.auth_user().await?.token().clone())
    }

    pub async fn domain_id(&self) -> Result<Option<String>, ServiceUserError> {
        Ok(self.auth_user().await?.domain_id().map(String::from))
    }

    pub async fn domain_name(&self) -> Result<Option<String>, ServiceUserError> {
        Ok(self.auth_user().await?.domain_name().map(String::from))
    }

    /// ID of the authenticated service user.
    pub async fn id(&self) -> Result<String, ServiceUserError> {
        Ok(self.auth_user().await?.id().to_string())
    }

    pub async fn token_expired(&self) -> Result<bool, ServiceUserError> {
        Ok(self.auth_user().await?.token_expired())
    }

    pub async fn token_expires_at(&self) -> Result<DateTime<Utc>, ServiceUserError> {
        Ok(self.auth_user().await?.token_expires_at())
    }

    pub async fn default_services_region(&self) -> Result<Option<String>, ServiceUserError> {
        Ok(self.auth_user().await?.default_services_region())
    }

    pub async fn available_services_regions(&self) -> Result<Vec<String>, ServiceUserError> {
        Ok(self.auth_user().await?.available_services_regions())
    }

    /// Run the block with the session addressing another domain.
    ///
    /// The block receives a handle sharing the caches of this session. The
    /// service user is authenticated in the domain first unless a driver
    /// exists for it already. This handle keeps addressing its own domain.
    #[tracing::instrument(level = "debug", skip(self, block))]
    pub async fn in_domain_scope<F, Fut, T, E>(&self, domain: &str, block: F) -> Result<T, E>
    where
        F: FnOnce(ServiceUserSession) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ServiceUserError>,
    {
        let scoped = Self {
            state: self.state.clone(),
            current_domain: domain.to_string(),
        };
        scoped.ensure_driver().await?;
        block(scoped).await
    }

    /// Invoke the operation with the driver of the current domain.
    ///
    /// When Keystone rejects the request the service user is authenticated
    /// again and the operation is repeated once with the new driver.
    pub async fn driver_method<F, Fut, T>(&self, operation: F) -> Result<T, ServiceUserError>
    where
        F: Fn(Arc<dyn IdentityDriver>) -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let driver = self.ensure_driver().await?;
        match operation(driver).await {
            Err(err) if err.is_api_error() => {
                warn!(
                    "identity request in domain {} failed ({}), authenticating again",
                    self.current_domain, err
                );
                let driver = {
                    let _guard = self.state.auth_lock.lock().await;
                    self.authenticate_locked().await?.1
                };
                Ok(operation(driver).await?)
            }
            other => Ok(other?),
        }
    }

    async fn cached_auth_user(&self) -> Option<AuthenticatedUser> {
        self.state
            .cache
            .read()
            .await
            .auth_users
            .get(&self.current_domain)
            .cloned()
    }

    /// Driver of the current domain, authenticating when missing.
    async fn ensure_driver(&self) -> Result<Arc<dyn IdentityDriver>, ServiceUserError> {
        if let Some(driver) = self.driver().await {
            return Ok(driver);
        }
        let _guard = self.state.auth_lock.lock().await;
        if let Some(driver) = self.driver().await {
            return Ok(driver);
        }
        Ok(self.authenticate_locked().await?.1)
    }

    /// Authenticate and create the driver. Must be called with the
    /// `auth_lock` held.
    ///
    /// The credentials are cached even when the driver cannot be created.
    async fn authenticate_locked(
        &self,
    ) -> Result<(AuthenticatedUser, Arc<dyn IdentityDriver>), ServiceUserError> {
        let auth_user = self.request_token().await?;
        let driver = self.create_driver(&auth_user);

        let mut cache = self.state.cache.write().await;
        cache
            .auth_users
            .insert(self.current_domain.clone(), auth_user.clone());
        match driver {
            Ok(driver) => {
                cache
                    .drivers
                    .insert(self.current_domain.clone(), driver.clone());
                Ok((auth_user, driver))
            }
            Err(err) => {
                cache.drivers.remove(&self.current_domain);
                Err(err.into())
            }
        }
    }

    fn create_driver(
        &self,
        auth_user: &AuthenticatedUser,
    ) -> Result<Arc<dyn IdentityDriver>, AuthenticationError> {
        let domain_id = auth_user
            .domain_id()
            .ok_or_else(|| AuthenticationError::Unscoped {
                domain: self.current_domain.clone(),
            })?
            .to_string();
        let params = DriverParameters {
            auth_url: self.state.provider.auth_url().clone(),
            region: self
                .state
                .provider
                .get_region_resolver()
                .locate_region(auth_user),
            token: auth_user.token().clone(),
            domain_id,
        };
        let driver = self.state.provider.get_driver_factory().new_driver(&params);
        driver.map_err(|source| AuthenticationError::Driver {
            source,
            token: params.token,
            domain_id: params.domain_id,
            region: params.region,
        })
    }

    /// Request the token for the current domain, by ID first and by name
    /// second.
    async fn request_token(&self) -> Result<AuthenticatedUser, AuthenticationError> {
        let backend = self.state.provider.get_identity_backend();
        let credentials = &self.state.credentials;
        let scope = Scope::domain_id(&self.current_domain);
        let result = backend.authenticate(credentials, &scope).await;
        match result {
            Err(err) if scope.is_domain_by_id() && matches!(err.code(), Some(400 | 401)) => {
                debug!(
                    "authentication in domain {} failed ({}), retrying with the domain name",
                    self.current_domain, err
                );
                let scope = Scope::domain_name(&self.current_domain);
                let result = backend.authenticate(credentials, &scope).await;
                result.map_err(|source| self.rejected(source, scope))
            }
            other => other.map_err(|source| self.rejected(source, scope)),
        }
    }

    pub(super) fn rejected(&self, source: IdentityBackendError, scope: Scope) -> AuthenticationError {
        AuthenticationError::Rejected {
            source,
            user_id: self.state.credentials.user_id().to_string(),
            user_domain: self.state.credentials.user_domain_name().to_string(),
            scope,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use secrecy::ExposeSecret;
    use tracing_test::traced_test;

    use super::*;
    use crate::common::{ApiError, types::Domain};
    use crate::driver::{MockDriverFactory, MockIdentityDriver, User};
    use crate::identity::MockIdentityBackend;
    use crate::identity::types::tests::domain_user;

    pub(crate) fn credentials() -> ServiceUserCredentials {
        ServiceUserCredentials::new("dashboard", SecretString::from("secret"), "Default")
    }

    pub(crate) fn api_error(code: u16) -> ApiError {
        ApiError::from_body(code, format!("failed with {code}"))
    }

    /// Backend accepting every domain scope given by ID.
    pub(crate) fn identity_by_id(times: usize) -> MockIdentityBackend {
        let mut identity = MockIdentityBackend::default();
        identity
            .expect_authenticate()
            .withf(|_, scope: &Scope| scope.is_domain_by_id())
            .times(times)
            .returning(|_, scope| match scope {
                Scope::Domain(Domain { id: Some(id), .. }) => Ok(domain_user(id)),
                _ => Err(api_error(400).into()),
            });
        identity
    }

    /// Factory handing out mocked drivers. The closure receives the number
    /// of drivers created before.
    pub(crate) fn driver_factory<F>(configure: F) -> MockDriverFactory
    where
        F: Fn(usize, &mut MockIdentityDriver) + Send + 'static,
    {
        let mut factory = MockDriverFactory::default();
        let mut created = 0;
        factory.expect_new_driver().returning(move |params| {
            let mut driver = MockIdentityDriver::default();
            let token = params.token.clone();
            driver.expect_auth_token().returning(move || token.clone());
            configure(created, &mut driver);
            created += 1;
            Ok(Arc::new(driver))
        });
        factory
    }

    pub(crate) fn provider(identity: MockIdentityBackend, factory: MockDriverFactory) -> Provider {
        Provider::mocked_builder()
            .identity(Arc::new(identity))
            .driver_factory(Arc::new(factory))
            .build()
            .unwrap()
    }

    /// Authenticated session in the `did` domain.
    pub(crate) async fn session(
        identity: MockIdentityBackend,
        factory: MockDriverFactory,
    ) -> ServiceUserSession {
        ServiceUserSession::connect(provider(identity, factory), credentials(), "did")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_connect() {
        let session = session(identity_by_id(1), driver_factory(|_, _| {})).await;
        assert_eq!("did", session.scope_domain());
        assert_eq!("did", session.current_domain());
        assert_eq!("dashboard", session.user_id());
        assert_eq!("token-did", session.token().await.unwrap().expose_secret());
        assert_eq!(Some("did".into()), session.domain_id().await.unwrap());
        assert_eq!(Some("did-name".into()), session.domain_name().await.unwrap());
        assert_eq!("service_user_id", session.id().await.unwrap());
        assert!(!session.token_expired().await.unwrap());
        assert_eq!(
            Some("region-one".into()),
            session.default_services_region().await.unwrap()
        );
        assert_eq!(
            vec!["region-one"],
            session.available_services_regions().await.unwrap()
        );
        assert!(!format!("{session:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_driver_parameters() {
        let mut factory = MockDriverFactory::default();
        factory
            .expect_new_driver()
            .withf(|params| {
                params.domain_id == "did"
                    && params.region.as_deref() == Some("region-one")
                    && params.token.expose_secret() == "token-did"
                    && params.auth_url.as_str() == "http://keystone.local:5000/v3"
            })
            .times(1)
            .returning(|_| Ok(Arc::new(MockIdentityDriver::default())));
        let session = session(identity_by_id(1), factory).await;
        assert!(session.driver().await.is_some());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_fallback_to_domain_name() {
        let mut identity = MockIdentityBackend::default();
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_id("monsoon3"))
            .times(1)
            .returning(|_, _| Err(api_error(401).into()));
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_name("monsoon3"))
            .times(1)
            .returning(|_, _| Ok(domain_user("abc")));

        let session = ServiceUserSession::connect(
            provider(identity, driver_factory(|_, _| {})),
            credentials(),
            "monsoon3",
        )
        .await
        .unwrap();
        assert_eq!(Some("abc".into()), session.domain_id().await.unwrap());
        assert_eq!("token-abc", session.token().await.unwrap().expose_secret());
        assert!(logs_contain("retrying with the domain name"));
    }

    #[tokio::test]
    async fn test_fallback_fails() {
        let mut identity = MockIdentityBackend::default();
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_id("monsoon3"))
            .times(1)
            .returning(|_, _| Err(api_error(400).into()));
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_name("monsoon3"))
            .times(1)
            .returning(|_, _| Err(api_error(401).into()));

        let session = ServiceUserSession::new(
            provider(identity, MockDriverFactory::default()),
            credentials(),
            "monsoon3",
        );
        let err = match session.authenticate().await {
            Err(ServiceUserError::Authentication { source }) => source,
            other => panic!("unexpected result {other:?}"),
        };
        assert_eq!(Some(401), err.code());
        assert_eq!(
            "failed with 401 (user: dashboard, user domain: Default, scope: {domain: {name: monsoon3}})",
            err.to_string()
        );
        match err {
            AuthenticationError::Rejected {
                user_id,
                user_domain,
                scope,
                ..
            } => {
                assert_eq!("dashboard", user_id);
                assert_eq!("Default", user_domain);
                assert_eq!(Scope::domain_name("monsoon3"), scope);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(session.driver().await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_fatal() {
        let mut identity = MockIdentityBackend::default();
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_id("did"))
            .times(1)
            .returning(|_, _| Err(api_error(500).into()));
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_name("did"))
            .never();

        let session = ServiceUserSession::new(
            provider(identity, MockDriverFactory::default()),
            credentials(),
            "did",
        );
        let err = session.authenticate().await.unwrap_err();
        assert!(matches!(
            err,
            ServiceUserError::Authentication {
                source: AuthenticationError::Rejected { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_driver_creation_failure() {
        let mut factory = MockDriverFactory::default();
        factory
            .expect_new_driver()
            .times(1)
            .returning(|_| Err(api_error(500).into()));
        let session = ServiceUserSession::new(provider(identity_by_id(1), factory), credentials(), "did");

        match session.authenticate().await {
            Err(ServiceUserError::Authentication {
                source:
                    AuthenticationError::Driver {
                        domain_id,
                        region,
                        token,
                        ..
                    },
            }) => {
                assert_eq!("did", domain_id);
                assert_eq!(Some("region-one".into()), region);
                assert_eq!("token-did", token.expose_secret());
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(session.driver().await.is_none());
        // Credentials are kept, no further authentication.
        assert_eq!("token-did", session.token().await.unwrap().expose_secret());
    }

    #[tokio::test]
    async fn test_token_without_domain() {
        let mut identity = MockIdentityBackend::default();
        identity.expect_authenticate().times(1).returning(|_, _| {
            Ok(AuthenticatedUser::builder()
                .token("tok")
                .expires_at(Utc::now())
                .user_id("uid")
                .build()
                .unwrap())
        });
        let mut factory = MockDriverFactory::default();
        factory.expect_new_driver().never();
        let session = ServiceUserSession::new(provider(identity, factory), credentials(), "did");

        assert!(matches!(
            session.authenticate().await,
            Err(ServiceUserError::Authentication {
                source: AuthenticationError::Unscoped { domain }
            }) if domain == "did"
        ));
        assert!(session.driver().await.is_none());
        // Credentials are kept, no further authentication.
        assert_eq!("tok", session.token().await.unwrap().expose_secret());
        assert_eq!(None, session.domain_id().await.unwrap());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_driver_method_retries_once() {
        let factory = driver_factory(|created, driver| {
            if created == 0 {
                driver
                    .expect_list_users()
                    .times(1)
                    .returning(|_| Err(api_error(401).into()));
            } else {
                driver.expect_list_users().times(1).returning(|_| {
                    Ok(vec![User {
                        id: "uid".into(),
                        ..Default::default()
                    }])
                });
            }
        });
        let session = session(identity_by_id(2), factory).await;

        let users = session
            .driver_method(|driver| async move { driver.list_users(&Default::default()).await })
            .await
            .unwrap();
        assert_eq!("uid", users[0].id);
        assert!(logs_contain("authenticating again"));
    }

    #[tokio::test]
    async fn test_driver_method_double_failure() {
        let factory = driver_factory(|_, driver| {
            driver
                .expect_list_users()
                .times(1)
                .returning(|_| Err(api_error(500).into()));
        });
        let session = session(identity_by_id(2), factory).await;

        let err = session
            .driver_method(|driver| async move { driver.list_users(&Default::default()).await })
            .await
            .unwrap_err();
        match err {
            ServiceUserError::Driver { source } => assert_eq!(Some(500), source.code()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_driver_method_transport_error_not_retried() {
        let factory = driver_factory(|_, driver| {
            driver.expect_get_user().times(1).returning(|_| {
                Err(serde_json::from_str::<serde_json::Value>("{")
                    .unwrap_err()
                    .into())
            });
        });
        let session = session(identity_by_id(1), factory).await;

        assert!(matches!(
            session
                .driver_method(|driver| async move { driver.get_user("uid").await })
                .await,
            Err(ServiceUserError::Driver {
                source: DriverError::Json { .. }
            })
        ));
    }

    #[tokio::test]
    async fn test_driver_method_authenticates_lazily() {
        let factory = driver_factory(|_, driver| {
            driver.expect_get_user().times(1).returning(|_| Ok(None));
        });
        let session =
            ServiceUserSession::new(provider(identity_by_id(1), factory), credentials(), "did");
        assert!(session.driver().await.is_none());
        assert!(
            session
                .driver_method(|driver| async move { driver.get_user("uid").await })
                .await
                .unwrap()
                .is_none()
        );
        assert!(session.driver().await.is_some());
    }

    #[tokio::test]
    async fn test_in_domain_scope() {
        let session = session(identity_by_id(2), driver_factory(|_, _| {})).await;

        let token = session
            .in_domain_scope("other", |scoped| async move {
                assert_eq!("other", scoped.current_domain());
                assert_eq!("did", scoped.scope_domain());
                scoped.token().await
            })
            .await
            .unwrap();
        assert_eq!("token-other", token.expose_secret());
        assert_eq!("did", session.current_domain());
        assert_eq!("token-did", session.token().await.unwrap().expose_secret());

        // The driver of the other domain is cached.
        let result: Result<(), ServiceUserError> = session
            .in_domain_scope("other", |scoped| async move {
                assert_eq!("other", scoped.current_domain());
                Err(ServiceUserError::MissingDomainScope("other".into()))
            })
            .await;
        assert!(matches!(
            result,
            Err(ServiceUserError::MissingDomainScope(_))
        ));
        assert_eq!("did", session.current_domain());
        assert_eq!(Some("did".into()), session.domain_id().await.unwrap());
    }

    #[tokio::test]
    async fn test_in_domain_scope_authentication_failure() {
        let mut identity = MockIdentityBackend::default();
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_id("did"))
            .times(1)
            .returning(|_, _| Ok(domain_user("did")));
        identity
            .expect_authenticate()
            .withf(|_, scope| *scope == Scope::domain_id("broken"))
            .times(1)
            .returning(|_, _| Err(api_error(500).into()));
        let session = session(identity, driver_factory(|_, _| {})).await;

        let result = session
            .in_domain_scope("broken", |_| async { Ok::<_, ServiceUserError>(()) })
            .await;
        assert!(matches!(
            result,
            Err(ServiceUserError::Authentication { .. })
        ));
        assert_eq!("did", session.current_domain());
    }
}
