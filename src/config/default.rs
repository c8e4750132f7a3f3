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
//! # Default configuration section.
use serde::Deserialize;

/// Default configuration section.
#[derive(Debug, Deserialize, Clone)]
pub struct DefaultSection {
    /// If set to true, the logging level is raised to DEBUG.
    #[serde(default)]
    pub debug: bool,

    /// Domain the dashboard lands users in when none is given.
    #[serde(default = "default_domain")]
    pub default_domain: String,
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            debug: false,
            default_domain: default_domain(),
        }
    }
}

fn default_domain() -> String {
    "monsoon3".into()
}
