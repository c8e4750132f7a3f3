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
//! # Service user
//!
//! The dashboard performs privileged identity operations with a shared
//! service account. The account is authenticated lazily once per domain, the
//! issued credentials and the driver built from them are cached in the
//! [`ServiceUserSession`]. The [`ServiceUserRegistry`] holds one session per
//! scope domain.

pub mod error;
pub mod lookup;
mod operations;
pub mod registry;
pub mod session;
pub mod types;

pub use error::{AuthenticationError, ServiceUserError};
pub use lookup::Lookup;
pub use registry::ServiceUserRegistry;
pub use session::ServiceUserSession;
pub use types::{ServiceConnection, ServiceUserCredentials};
