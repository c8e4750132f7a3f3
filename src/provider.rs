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
//! # Provider manager
//!
//! Bundles the configuration with the implementations of the identity
//! backend, the driver factory and the region resolver. Sessions receive the
//! provider on construction which allows an easy injection of mocked
//! implementations.
use std::sync::Arc;
use std::time::Duration;

use derive_builder::Builder;
use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::driver::{DriverFactory, KeystoneDriverFactory};
use crate::error::ElektraError;
use crate::identity::{IdentityBackend, KeystoneIdentityBackend};
use crate::region::{CatalogRegionResolver, RegionResolver};

/// Global provider manager.
#[derive(Builder, Clone)]
// It is necessary to use the owned pattern since otherwise builder invokes clone which immediately
// confuses mockall used in tests
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Keystone v3 endpoint.
    auth_url: Url,
    /// Identity backend.
    identity: Arc<dyn IdentityBackend>,
    /// Driver factory.
    driver_factory: Arc<dyn DriverFactory>,
    /// Region resolver.
    region_resolver: Arc<dyn RegionResolver>,
}

impl Provider {
    #[tracing::instrument(level = "debug", skip(cfg), err)]
    pub fn new(cfg: Config) -> Result<Self, ElektraError> {
        let auth_url = cfg.keystone.endpoint()?;
        let http_client = Arc::new(
            Client::builder()
                .gzip(true)
                .danger_accept_invalid_certs(!cfg.keystone.ssl_verify_peer)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()?,
        );
        let identity = KeystoneIdentityBackend::new(http_client.clone(), auth_url.clone());
        let driver_factory = KeystoneDriverFactory::new(http_client);
        let region_resolver = CatalogRegionResolver::new(cfg.region.default.clone());

        Ok(Self {
            config: cfg,
            auth_url,
            identity: Arc::new(identity),
            driver_factory: Arc::new(driver_factory),
            region_resolver: Arc::new(region_resolver),
        })
    }

    /// Keystone v3 endpoint.
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Get the identity backend.
    pub fn get_identity_backend(&self) -> &dyn IdentityBackend {
        self.identity.as_ref()
    }

    /// Get the driver factory.
    pub fn get_driver_factory(&self) -> &dyn DriverFactory {
        self.driver_factory.as_ref()
    }

    /// Get the region resolver.
    pub fn get_region_resolver(&self) -> &dyn RegionResolver {
        self.region_resolver.as_ref()
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let config = Config::default();
        let identity_mock = crate::identity::MockIdentityBackend::default();
        let driver_factory_mock = crate::driver::MockDriverFactory::default();

        ProviderBuilder::default()
            .config(config)
            .auth_url(Url::parse("http://keystone.local:5000/v3").expect("valid url"))
            .identity(Arc::new(identity_mock))
            .driver_factory(Arc::new(driver_factory_mock))
            .region_resolver(Arc::new(CatalogRegionResolver::default()))
    }
}
