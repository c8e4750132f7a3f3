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
//! # Shared building blocks of the identity clients.
pub mod api_error;
pub mod types;

pub use api_error::ApiError;

use url::Url;

/// Append the path segments to the service endpoint.
///
/// Every segment is percent-encoded, so IDs and names containing `/`, `?` or
/// `#` stay a single segment. The path of the endpoint (i.e. `/v3`) is
/// preserved.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let base = Url::parse("http://keystone:5000/v3").unwrap();
        assert_eq!(
            "http://keystone:5000/v3/auth/tokens",
            endpoint_url(&base, &["auth", "tokens"]).unwrap().as_str()
        );
        let base = Url::parse("http://keystone:5000/v3/").unwrap();
        assert_eq!(
            "http://keystone:5000/v3/users/uid",
            endpoint_url(&base, &["users", "uid"]).unwrap().as_str()
        );
    }

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let base = Url::parse("http://keystone:5000/v3").unwrap();
        let url = endpoint_url(&base, &["projects", "team#1/a?b"]).unwrap();
        assert_eq!("/v3/projects/team%231%2Fa%3Fb", url.path());
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }
}
