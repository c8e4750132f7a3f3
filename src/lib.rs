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

//! # Elektra service user
//!
//! The Elektra dashboard performs a number of identity operations (looking
//! up projects, managing group memberships, granting roles) on behalf of its
//! users with a shared technical account, the service user. This crate
//! authenticates that account against Keystone and caches the result.
//!
//! - The service user is authenticated lazily once per OpenStack domain. The
//!   domain is first tried as the domain ID and then as the domain name.
//!
//! - Every authentication produces credentials (the scoped token with its
//!   catalog) and a driver, the connection used for the identity calls. Both
//!   are cached per domain within the [`ServiceUserSession`].
//!
//! - A driver call rejected by Keystone is repeated once after a fresh
//!   authentication, which covers expired or revoked tokens.
//!
//! - Calls may be temporarily addressed to another domain with
//!   [`ServiceUserSession::in_domain_scope`].
//!
//! The [`ServiceUserRegistry`] keeps one session per scope domain for the
//! whole process. All external dependencies (the identity backend, the driver
//! factory and the region resolver) are injected through the
//! [`Provider`](provider::Provider).

pub mod common;
pub mod config;
pub mod driver;
pub mod error;
pub mod identity;
pub mod provider;
pub mod region;
pub mod service_user;

pub use service_user::{ServiceUserRegistry, ServiceUserSession};
