//! HTTP client side of the peer wire protocol: fetches a single key's value
//! from one specific peer.

use gocache_common::{GoCacheError, GoCacheResult};
use gocache_core::PeerGetter;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Fetches keys from one remote peer at `base_url` (e.g.
/// `http://10.0.0.2:8002/_gocache/`).
///
/// Holds its own `reqwest::blocking::Client` rather than a hand-rolled
/// connection pool — reqwest already pools keep-alive connections per host,
/// which is exactly the problem a pool would otherwise need to solve here.
pub struct HttpPeerGetter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpPeerGetter {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpPeerGetter {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl PeerGetter for HttpPeerGetter {
    fn get(&self, group: &str, key: &str) -> GoCacheResult<Vec<u8>> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            utf8_percent_encode(group, NON_ALPHANUMERIC),
            utf8_percent_encode(key, NON_ALPHANUMERIC),
        );

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| GoCacheError::PeerUnavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(GoCacheError::PeerUnavailable(format!(
                "peer responded {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| GoCacheError::PeerUnavailable(err.to_string()))
    }
}
