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
//! # Configuration
//!
//! The configuration is read from an INI file and may be overridden with the
//! `ELEKTRA_<SECTION>__<KEY>` environment variables. The variables of the
//! former Rails deployment (`MONSOON_OPENSTACK_AUTH_API_*`,
//! `AUTHORITY_SERVICE_*`, ...) are honoured as well.
use config::{Environment, File, FileFormat};
use eyre::{Report, WrapErr};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

mod default;
mod keystone;
mod service_user;

pub use default::DefaultSection;
pub use keystone::KeystoneSection;
pub use service_user::{CloudAdminSection, RegionSection, ServiceUserSection};

use crate::service_user::types::ServiceUserCredentials;

/// Environment variables of the legacy deployment and the keys they set.
const LEGACY_ENVIRONMENT: &[(&str, &str)] = &[
    ("MONSOON_OPENSTACK_AUTH_API_ENDPOINT", "keystone.auth_endpoint"),
    ("AUTHORITY_SERVICE_HOST", "keystone.authority_service_host"),
    ("AUTHORITY_SERVICE_PORT", "keystone.authority_service_port"),
    ("AUTHORITY_SERVICE_PROTO", "keystone.authority_service_proto"),
    ("ELEKTRA_SSL_VERIFY_PEER", "keystone.ssl_verify_peer"),
    ("MONSOON_OPENSTACK_AUTH_API_USERID", "service_user.user_id"),
    ("MONSOON_OPENSTACK_AUTH_API_PASSWORD", "service_user.password"),
    ("MONSOON_OPENSTACK_AUTH_API_DOMAIN", "service_user.domain_name"),
    ("MONSOON_OPENSTACK_CLOUDADMIN_DOMAIN", "cloud_admin.domain"),
    ("MONSOON_OPENSTACK_CLOUDADMIN_PROJECT", "cloud_admin.project"),
    ("MONSOON_DASHBOARD_REGION", "region.default"),
    ("MONSOON_DASHBOARD_DEFAULT_DOMAIN", "DEFAULT.default_domain"),
];

/// Semantic configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the auth endpoint nor the authority service host and port are
    /// configured.
    #[error("keystone auth endpoint is not configured")]
    MissingAuthEndpoint,

    /// Service user credentials are incomplete.
    #[error("service user option `{0}` is not configured")]
    MissingServiceUser(&'static str),

    /// Url parsing error.
    #[error(transparent)]
    UrlParse {
        #[from]
        source: url::ParseError,
    },
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Global configuration options.
    #[serde(rename = "DEFAULT", default)]
    pub default: DefaultSection,

    /// Cloud admin project.
    #[serde(default)]
    pub cloud_admin: CloudAdminSection,

    /// Keystone endpoint.
    #[serde(default)]
    pub keystone: KeystoneSection,

    /// Region selection.
    #[serde(default)]
    pub region: RegionSection,

    /// Service user credentials.
    #[serde(default)]
    pub service_user: ServiceUserSection,
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path).format(FileFormat::Ini));
        }

        builder = builder
            .add_source(legacy_environment(|name| std::env::var(name).ok())?)
            .add_source(elektra_environment());

        builder.try_into()
    }

    /// Credentials of the configured service user.
    pub fn service_user_credentials(&self) -> Result<ServiceUserCredentials, ConfigError> {
        let section = &self.service_user;
        Ok(ServiceUserCredentials::new(
            section
                .user_id
                .clone()
                .ok_or(ConfigError::MissingServiceUser("user_id"))?,
            section
                .password
                .clone()
                .ok_or(ConfigError::MissingServiceUser("password"))?,
            section
                .domain_name
                .clone()
                .ok_or(ConfigError::MissingServiceUser("domain_name"))?,
        ))
    }
}

/// Source made of the variables of the legacy deployment.
///
/// It is added below the `ELEKTRA_` variables, which therefore win.
fn legacy_environment<F>(lookup: F) -> Result<config::Config, Report>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = config::Config::builder();
    for (name, key) in LEGACY_ENVIRONMENT {
        builder = builder.set_override_option(*key, lookup(name))?;
    }
    builder
        .build()
        .wrap_err("Failed to read the legacy environment")
}

fn elektra_environment() -> Environment {
    Environment::with_prefix("ELEKTRA")
        .prefix_separator("_")
        .separator("__")
}

impl TryFrom<config::ConfigBuilder<config::builder::DefaultState>> for Config {
    type Error = Report;
    fn try_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("keystone.authority_service_proto", "http")?
            .set_default("keystone.ssl_verify_peer", "true")?
            .set_default("cloud_admin.domain", "ccadmin")?
            .set_default("cloud_admin.project", "cloud_admin")?;

        builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")
    }
}
