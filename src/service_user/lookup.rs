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
//! # Best effort lookups
//!
//! Some operations of the service user are used to check the identity
//! service (does the project exist, is the user member of the group). Their
//! callers need to tell the missing resource apart from the failed request,
//! which is what the [`Lookup`] carries.
use crate::service_user::error::ServiceUserError;

/// Outcome of a best effort lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The resource was found.
    Found(T),
    /// All requests succeeded but the resource does not exist.
    NotFound,
    /// A request failed.
    LookupFailed(ServiceUserError),
}

impl<T> Lookup<T> {
    /// Lookup of a resource that must exist.
    pub fn from_result(result: Result<T, ServiceUserError>) -> Self {
        match result {
            Ok(val) => Self::Found(val),
            Err(err) => Self::LookupFailed(err),
        }
    }

    /// Lookup of a resource that may be absent.
    pub fn from_optional(result: Result<Option<T>, ServiceUserError>) -> Self {
        match result {
            Ok(Some(val)) => Self::Found(val),
            Ok(None) => Self::NotFound,
            Err(err) => Self::LookupFailed(err),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::LookupFailed(_))
    }

    /// The found value, dropping the reason of its absence.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(val) => Some(val),
            _ => None,
        }
    }

    /// Convert back into the result with the failure as the error.
    pub fn into_result(self) -> Result<Option<T>, ServiceUserError> {
        match self {
            Self::Found(val) => Ok(Some(val)),
            Self::NotFound => Ok(None),
            Self::LookupFailed(err) => Err(err),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Self::Found(val) => Lookup::Found(f(val)),
            Self::NotFound => Lookup::NotFound,
            Self::LookupFailed(err) => Lookup::LookupFailed(err),
        }
    }
}
