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
//! Service user executable.
//!
//! This is the entry point of the `elektra-service-user` binary which runs
//! the service user operations against a real Keystone.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, eyre};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};

use elektra_service_user::config::Config;
use elektra_service_user::driver::UserListParameters;
use elektra_service_user::provider::Provider;
use elektra_service_user::service_user::{Lookup, ServiceUserRegistry, ServiceUserSession};

/// Elektra service user.
///
/// Authenticates the service user of the dashboard in the domain and performs
/// identity queries with it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file.
    #[arg(short, long, default_value = "/etc/elektra/service_user.conf")]
    config: PathBuf,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global=true, action = clap::ArgAction::Count, display_order = 920)]
    pub verbose: u8,

    /// Scope domain (ID or name). Defaults to the configured default domain.
    #[arg(short, long, global = true)]
    domain: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the token of the service user.
    Token,
    /// List users of the domain.
    Users {
        /// Filter users by the name.
        #[arg(long)]
        name: Option<String>,
    },
    /// List groups.
    Groups,
    /// List roles.
    Roles,
    /// Find the project by name or ID.
    Project {
        /// Project name or ID.
        name_or_id: String,
    },
    /// List projects of the user.
    Projects {
        /// User ID.
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let args = Args::parse();
    let cfg = Config::new(args.config.clone())?;

    let verbose = if cfg.default.debug {
        args.verbose.max(2)
    } else {
        args.verbose
    };
    let filter = Targets::new().with_default(match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    });

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(log_layer).init();

    let domain = args
        .domain
        .clone()
        .unwrap_or_else(|| cfg.default.default_domain.clone());
    debug!("Using the scope domain {}", domain);

    let registry = ServiceUserRegistry::new(Provider::new(cfg)?);
    let session = registry
        .load_default(Some(&domain))
        .await?
        .ok_or_else(|| eyre!("scope domain must not be empty"))?;
    info!("Service user authenticated in {}", domain);

    let output = run(&session, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(session: &ServiceUserSession, command: Command) -> Result<Value, Report> {
    Ok(match command {
        Command::Token => {
            let auth_user = session.auth_user().await?;
            json!({
                "token": session.token().await?.expose_secret(),
                "expires_at": auth_user.token_expires_at(),
                "user_id": auth_user.id(),
                "domain_id": auth_user.domain_id(),
                "domain_name": auth_user.domain_name(),
                "regions": auth_user.available_services_regions(),
            })
        }
        Command::Users { name } => {
            let params = UserListParameters {
                domain_id: session.domain_id().await?,
                name,
                ..Default::default()
            };
            serde_json::to_value(session.users(&params).await?)?
        }
        Command::Groups => serde_json::to_value(session.groups(&Default::default()).await?)?,
        Command::Roles => serde_json::to_value(session.roles().await?)?,
        Command::Project { name_or_id } => {
            match session.find_project_by_name_or_id(&name_or_id).await {
                Lookup::Found(project) => serde_json::to_value(project)?,
                Lookup::NotFound => return Err(eyre!("project {} not found", name_or_id)),
                Lookup::LookupFailed(err) => return Err(err.into()),
            }
        }
        Command::Projects { user } => serde_json::to_value(session.user_projects(&user).await?)?,
    })
}
