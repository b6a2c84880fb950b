use std::num::NonZeroU32;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Timeout applied when the configuration does not name one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach one Control4 proxy through the web driver.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: Url,
    proxy_id: NonZeroU32,
    timeout: Duration,
}

impl Endpoint {
    /// Build an endpoint, rejecting non-HTTP URLs, proxy ID 0 and a zero timeout.
    pub fn new(base_url: Url, proxy_id: u32, timeout: Duration) -> Result<Self, Error> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::InvalidEndpoint(format!(
                "unsupported URL scheme '{}'",
                base_url.scheme()
            )));
        }

        let proxy_id = NonZeroU32::new(proxy_id)
            .ok_or_else(|| Error::InvalidEndpoint("proxy ID must be positive".to_string()))?;

        if timeout.is_zero() {
            return Err(Error::InvalidEndpoint(
                "timeout must be positive".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            proxy_id,
            timeout,
        })
    }

    /// Parse `base_url` and build an endpoint from it.
    pub fn parse(base_url: &str, proxy_id: u32, timeout: Duration) -> Result<Self, Error> {
        Self::new(Url::parse(base_url)?, proxy_id, timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn proxy_id(&self) -> u32 {
        self.proxy_id.get()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_endpoint() {
        let endpoint = Endpoint::parse("http://host:9000/api?token=abc", 42, DEFAULT_TIMEOUT)
            .unwrap();
        assert_eq!(endpoint.proxy_id(), 42);
        assert_eq!(endpoint.timeout(), Duration::from_secs(10));
        assert_eq!(endpoint.base_url().query(), Some("token=abc"));
    }

    #[test]
    fn test_rejects_zero_proxy_id() {
        let err = Endpoint::parse("http://host/api", 0, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = Endpoint::parse("http://host/api", 1, Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = Endpoint::parse("ftp://host/api", 1, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let err = Endpoint::parse("not a url", 1, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
