// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use exponential_backoff::Backoff;
use sky_protocol::constants::DEFAULT_MAX_PROOF_HOPS;
use sky_protocol::DataLink;
use std::time::Duration;

/// A strategy that translates into a configuration for exponential backoff.
/// The first retry is done after 2 seconds, after which the backoff is roughly doubled each time.
/// The interval does not go beyond 8 seconds. So the intervals increase from 2 to 4, to 8 seconds and
/// all attempts are made at most 8 seconds apart.
///
/// SkyDB never retries on its own, the strategy is handed to the registry and content
/// services which decide what is worth retrying. The default strategy is `Balanced`.
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
#[repr(usize)]
pub enum RetryStrategy {
    /// Attempt once (no retries)
    None = 1,
    /// Try 4 times (waits 2s, 4s, 8s; max total sleep time ~14s)
    Quick = 4,
    /// Try 6 times (waits 2s, 4s, 8s, 8s, 8s; max total sleep time ~30s)
    #[default]
    Balanced = 6,
    /// Try 10 times (waits 2s, 4s, 8s, 8s, 8s, 8s, 8s, 8s, 8s; max total sleep time ~62s)
    Persistent = 10,
}

impl RetryStrategy {
    pub fn attempts(&self) -> usize {
        *self as usize
    }

    pub fn backoff(&self) -> Backoff {
        let min_wait = Duration::from_secs(2);
        let max_wait = Some(Duration::from_secs(8));
        Backoff::new(self.attempts() as u32, min_wait, max_wait)
    }
}

/// Options passed through untouched to the registry and content services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Deadline of a single attempt. `None` waits for as long as the service does.
    pub timeout: Option<Duration>,
    pub retry: RetryStrategy,
}

/// Configuration for [`crate::Client::with_config`].
///
/// This is shared across all clones of the client and cannot be changed after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Used by every call which does not bring its own [`RequestOptions`].
    pub request: RequestOptions,
    /// The longest chain of entry links a registry proof may walk.
    pub max_proof_hops: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request: RequestOptions::default(),
            max_proof_hops: DEFAULT_MAX_PROOF_HOPS,
        }
    }
}

impl ClientConfig {
    /// Set the options used for calls which do not override them.
    pub fn set_request_options(&mut self, request: RequestOptions) {
        self.request = request;
    }

    /// Set the longest chain of entry links accepted in a registry proof.
    pub fn set_max_proof_hops(&mut self, hops: usize) {
        self.max_proof_hops = hops;
    }
}

/// Options of a registry lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetEntryOptions {
    /// The data key is the hex of an already hashed key.
    pub hashed_data_key_hex: bool,
    /// Ask the registry to follow entries pointing at other entries, which
    /// then comes back with a proof of every hop.
    pub resolve_entry_links: bool,
    /// Overrides the client's [`RequestOptions`].
    pub request: Option<RequestOptions>,
}

/// Options of the SkyDB reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetJsonOptions {
    /// The data key is the hex of an already hashed key.
    pub hashed_data_key_hex: bool,
    /// The link of the content the caller already holds. When the entry still
    /// points at it nothing is downloaded.
    pub cached_data_link: Option<DataLink>,
    /// Overrides the client's [`RequestOptions`].
    pub request: Option<RequestOptions>,
}

/// Options of the SkyDB writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetJsonOptions {
    /// The data key is the hex of an already hashed key.
    pub hashed_data_key_hex: bool,
    /// Overrides the client's [`RequestOptions`].
    pub request: Option<RequestOptions>,
}

impl From<GetJsonOptions> for GetEntryOptions {
    fn from(opts: GetJsonOptions) -> Self {
        Self {
            hashed_data_key_hex: opts.hashed_data_key_hex,
            resolve_entry_links: false,
            request: opts.request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_strategy_attempts() {
        assert_eq!(RetryStrategy::None.attempts(), 1);
        assert_eq!(RetryStrategy::Quick.attempts(), 4);
        assert_eq!(RetryStrategy::default(), RetryStrategy::Balanced);
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.max_proof_hops, DEFAULT_MAX_PROOF_HOPS);
        assert_eq!(config.request.timeout, None);
    }
}
