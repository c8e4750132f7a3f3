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
//! # Service user registry
//!
//! Keeps one [`ServiceUserSession`] per scope domain for the lifetime of the
//! registry.
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

use crate::provider::Provider;
use crate::service_user::error::ServiceUserError;
use crate::service_user::session::ServiceUserSession;
use crate::service_user::types::ServiceUserCredentials;

type SessionCell = Arc<OnceCell<ServiceUserSession>>;

/// Cache of the service user sessions keyed by the scope domain.
///
/// Sessions are created on the first request for the domain and are never
/// evicted. Concurrent first requests for one domain wait for the same
/// authentication, different domains authenticate in parallel.
#[derive(Clone)]
pub struct ServiceUserRegistry {
    provider: Provider,
    sessions: Arc<RwLock<HashMap<String, SessionCell>>>,
}

impl ServiceUserRegistry {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Session of the service user in the scope domain.
    ///
    /// Returns `None` without a scope domain. The credentials are only used
    /// when the session of the domain does not exist yet.
    #[tracing::instrument(level = "debug", skip(self, credentials), err)]
    pub async fn load(
        &self,
        credentials: &ServiceUserCredentials,
        scope_domain: Option<&str>,
    ) -> Result<Option<ServiceUserSession>, ServiceUserError> {
        let Some(scope_domain) = scope_domain.filter(|domain| !domain.is_empty()) else {
            return Ok(None);
        };
        let session = self
            .get_or_create(scope_domain, || {
                ServiceUserSession::connect(self.provider.clone(), credentials.clone(), scope_domain)
            })
            .await?;
        Ok(Some(session))
    }

    /// [`load`](Self::load) with the service user of the configuration.
    pub async fn load_default(
        &self,
        scope_domain: Option<&str>,
    ) -> Result<Option<ServiceUserSession>, ServiceUserError> {
        let credentials = self.provider.config.service_user_credentials()?;
        self.load(&credentials, scope_domain).await
    }

    /// Get the session of the domain or create it with the factory.
    ///
    /// The registry lock is only held to find or insert the cell of the
    /// domain. A failed creation leaves the cell empty, the next request
    /// waiting on it (or arriving later) runs its own factory.
    pub async fn get_or_create<F, Fut>(
        &self,
        scope_domain: &str,
        factory: F,
    ) -> Result<ServiceUserSession, ServiceUserError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ServiceUserSession, ServiceUserError>>,
    {
        let cell = self.cell(scope_domain).await;
        let session = cell
            .get_or_try_init(|| async move {
                debug!("creating the service user session in {}", scope_domain);
                factory().await
            })
            .await?;
        Ok(session.clone())
    }

    /// Whether a session of the domain exists.
    pub async fn contains(&self, scope_domain: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(scope_domain)
            .is_some_and(|cell| cell.initialized())
    }

    /// Scope domains with a session.
    pub async fn domains(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut domains: Vec<String> = sessions
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(domain, _)| domain.clone())
            .collect();
        domains.sort();
        domains
    }

    async fn cell(&self, scope_domain: &str) -> SessionCell {
        if let Some(cell) = self.sessions.read().await.get(scope_domain) {
            return cell.clone();
        }
        self.sessions
            .write()
            .await
            .entry(scope_domain.to_string())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};
    use tokio::time::sleep;

    use super::*;
    use crate::common::types::Scope;
    use crate::config::Config;
    use crate::identity::{
        AuthenticatedUser, IdentityBackend, IdentityBackendError, MockIdentityBackend,
    };
    use crate::identity::types::tests::domain_user;
    use crate::service_user::session::tests::{
        api_error, credentials, driver_factory, identity_by_id, provider,
    };

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_session_under_concurrent_load() {
        let registry = ServiceUserRegistry::new(provider(identity_by_id(1), driver_factory(|_, _| {})));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.load(&credentials(), Some("did")).await })
            })
            .collect();
        let mut sessions = Vec::new();
        for handle in handles {
            sessions.push(handle.await.unwrap().unwrap().unwrap());
        }
        assert!(sessions.iter().all(|session| session.ptr_eq(&sessions[0])));
        assert_eq!(vec!["did"], registry.domains().await);
    }

    #[tokio::test]
    async fn test_sessions_per_domain() {
        let registry = ServiceUserRegistry::new(provider(identity_by_id(2), driver_factory(|_, _| {})));
        let first = registry.load(&credentials(), Some("a")).await.unwrap().unwrap();
        let second = registry.load(&credentials(), Some("b")).await.unwrap().unwrap();
        let again = registry.load(&credentials(), Some("a")).await.unwrap().unwrap();
        assert!(!first.ptr_eq(&second));
        assert!(first.ptr_eq(&again));
        assert_eq!("token-b", second.token().await.unwrap().expose_secret());
        assert_eq!(vec!["a", "b"], registry.domains().await);
    }

    #[tokio::test]
    async fn test_no_scope_domain() {
        let mut identity = MockIdentityBackend::default();
        identity.expect_authenticate().never();
        let registry = ServiceUserRegistry::new(provider(identity, driver_factory(|_, _| {})));
        assert!(registry.load(&credentials(), None).await.unwrap().is_none());
        assert!(registry.load(&credentials(), Some("")).await.unwrap().is_none());
        assert!(registry.domains().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let mut identity = MockIdentityBackend::default();
        let mut calls = 0;
        identity
            .expect_authenticate()
            .withf(|_, scope: &Scope| *scope == Scope::domain_id("did"))
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                if calls == 1 {
                    Err(api_error(500).into())
                } else {
                    Ok(domain_user("did"))
                }
            });
        let registry = ServiceUserRegistry::new(provider(identity, driver_factory(|_, _| {})));

        assert!(registry.load(&credentials(), Some("did")).await.is_err());
        assert!(!registry.contains("did").await);
        assert!(registry.load(&credentials(), Some("did")).await.unwrap().is_some());
        assert!(registry.contains("did").await);
    }

    /// Backend failing the first request slowly and answering the second one
    /// even slower.
    struct SlowBackend {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl IdentityBackend for SlowBackend {
        async fn authenticate(
            &self,
            _credentials: &ServiceUserCredentials,
            _scope: &Scope,
        ) -> Result<AuthenticatedUser, IdentityBackendError> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => {
                    sleep(Duration::from_millis(50)).await;
                    Err(api_error(500).into())
                }
                1 => {
                    sleep(Duration::from_millis(200)).await;
                    Ok(domain_user("did"))
                }
                _ => Ok(domain_user("did")),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiters_share_session_after_failed_creation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Provider::mocked_builder()
            .identity(Arc::new(SlowBackend {
                calls: calls.clone(),
            }))
            .driver_factory(Arc::new(driver_factory(|_, _| {})))
            .build()
            .unwrap();
        let registry = ServiceUserRegistry::new(provider);
        let spawn_load = |registry: ServiceUserRegistry| {
            tokio::spawn(async move { registry.load(&credentials(), Some("did")).await })
        };

        let failing = spawn_load(registry.clone());
        sleep(Duration::from_millis(10)).await;
        // Waits on the first creation and takes over once it fails.
        let waiting = spawn_load(registry.clone());
        sleep(Duration::from_millis(100)).await;
        // Arrives while the second creation is running.
        let late = spawn_load(registry.clone());

        assert!(failing.await.unwrap().is_err());
        let waiting = waiting.await.unwrap().unwrap().unwrap();
        let late = late.await.unwrap().unwrap().unwrap();
        let again = registry.load(&credentials(), Some("did")).await.unwrap().unwrap();
        assert!(waiting.ptr_eq(&late));
        assert!(waiting.ptr_eq(&again));
        assert_eq!(2, calls.load(Ordering::SeqCst));
        assert_eq!(vec!["did"], registry.domains().await);
    }

    #[tokio::test]
    async fn test_load_default() {
        let mut config = Config::default();
        config.service_user.user_id = Some("dashboard".into());
        config.service_user.password = Some(SecretString::from("secret"));
        config.service_user.domain_name = Some("Default".into());

        let mut identity = MockIdentityBackend::default();
        identity
            .expect_authenticate()
            .withf(|credentials, _| {
                credentials.user_id() == "dashboard"
                    && credentials.user_domain_name() == "Default"
                    && credentials.password().expose_secret() == "secret"
            })
            .times(1)
            .returning(|_, _| Ok(domain_user("did")));
        let provider = Provider::mocked_builder()
            .config(config)
            .identity(Arc::new(identity))
            .driver_factory(Arc::new(driver_factory(|_, _| {})))
            .build()
            .unwrap();
        let registry = ServiceUserRegistry::new(provider);
        let session = registry.load_default(Some("did")).await.unwrap().unwrap();
        assert_eq!("dashboard", session.user_id());
    }

    #[tokio::test]
    async fn test_load_default_without_credentials() {
        let registry = ServiceUserRegistry::new(Provider::mocked_builder().build().unwrap());
        assert!(matches!(
            registry.load_default(Some("did")).await,
            Err(ServiceUserError::Config { .. })
        ));
    }
}
