//! Client IP address resolution

use http::HeaderMap;
use waystation_core::RemoteAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address: the first `X-Forwarded-For` entry when the header is set,
/// otherwise the connection's peer address.
pub fn extract(headers: &HeaderMap, remote_addr: Option<&RemoteAddr>) -> Option<String> {
    match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(forwarded) => forwarded.split(',').next().map(|ip| ip.trim().to_string()),
        None => remote_addr.map(|addr| addr.0.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer() -> RemoteAddr {
        RemoteAddr(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))
    }

    #[test]
    fn test_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        assert_eq!(
            extract(&headers, Some(&peer())).as_deref(),
            Some("203.0.113.9")
        );
    }

    #[test]
    fn test_falls_back_to_peer() {
        assert_eq!(
            extract(&HeaderMap::new(), Some(&peer())).as_deref(),
            Some("10.0.0.7")
        );
        assert_eq!(extract(&HeaderMap::new(), None), None);
    }
}
