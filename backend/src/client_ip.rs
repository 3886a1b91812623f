//! Voter identity resolution.
//!
//! Votes are keyed by client network address. Behind the reverse
//! proxy the real address arrives in `x-forwarded-for`; the first
//! entry of that list is the originating client. Without the header
//! the socket peer address is used directly.

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderValue};

/// Resolves the voter identity for a request.
pub fn voter_identity(headers: &HeaderMap, peer: SocketAddr) -> String {
    parse_first_ip_from_header(headers.get("x-forwarded-for"))
        .unwrap_or_else(|| peer.ip().to_string())
}

fn parse_first_ip_from_header(value: Option<&HeaderValue>) -> Option<String> {
    let raw = value?.to_str().ok()?;
    raw.split(',').find_map(normalize_ip_token)
}

fn normalize_ip_token(token: &str) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "203.0.113.9:54321".parse().expect("valid socket address")
    }

    #[test]
    fn forwarded_header_wins_over_the_socket_address() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.4, 10.0.0.1"),
        );
        assert_eq!(voter_identity(&headers, peer()), "198.51.100.4");
    }

    #[test]
    fn missing_header_falls_back_to_the_peer_ip() {
        assert_eq!(voter_identity(&HeaderMap::new(), peer()), "203.0.113.9");
    }

    #[test]
    fn empty_header_entries_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" , 198.51.100.4"));
        assert_eq!(voter_identity(&headers, peer()), "198.51.100.4");
    }
}
