//! Security headers for JSON API responses

use warp::http::header::{HeaderMap, HeaderName, HeaderValue};

/// JSON responses never load sub-resources or render in frames
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none';";

const PERMISSIONS_POLICY: &str =
    "geolocation=(), microphone=(), camera=(), payment=(), usb=(), magnetometer=(), gyroscope=(), accelerometer=()";

/// Strict headers added to every API response
pub fn api_security_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let pairs: [(&'static str, &'static str); 6] = [
        ("x-frame-options", "DENY"),
        ("x-content-type-options", "nosniff"),
        ("referrer-policy", "no-referrer"),
        ("content-security-policy", API_CSP),
        // Admin payloads carry tokens and personal data
        ("cache-control", "no-cache, no-store, must-revalidate"),
        ("permissions-policy", PERMISSIONS_POLICY),
    ];
    for (name, value) in pairs {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// Wrap a filter's replies with [`api_security_headers`]
pub fn with_api_security_headers() -> warp::filters::reply::WithHeaders {
    warp::reply::with::headers(api_security_headers())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_headers() {
        let headers = api_security_headers();
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["cache-control"], "no-cache, no-store, must-revalidate");
    }

    #[test]
    fn test_strict_csp() {
        assert!(!API_CSP.contains("unsafe-inline"));
        assert!(API_CSP.contains("default-src 'none'"));
        assert!(API_CSP.contains("frame-ancestors 'none'"));
    }
}
