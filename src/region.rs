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
//! # Region resolution
//!
//! Decides which region the drivers of the service user operate in.
use crate::identity::AuthenticatedUser;

/// Locates the region for the authenticated user.
pub trait RegionResolver: Send + Sync {
    /// Region to use, `None` when no region can be determined.
    fn locate_region(&self, auth_user: &AuthenticatedUser) -> Option<String>;
}

/// Uses the configured region and falls back to the region serving most of
/// the services of the token catalog.
#[derive(Clone, Debug, Default)]
pub struct CatalogRegionResolver {
    default_region: Option<String>,
}

impl CatalogRegionResolver {
    pub fn new(default_region: Option<String>) -> Self {
        Self {
            default_region: default_region.filter(|region| !region.is_empty()),
        }
    }
}

impl RegionResolver for CatalogRegionResolver {
    fn locate_region(&self, auth_user: &AuthenticatedUser) -> Option<String> {
        self.default_region
            .clone()
            .or_else(|| auth_user.default_services_region())
    }
}
