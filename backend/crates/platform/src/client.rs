//! Client identification utilities
//!
//! Derives a stable client fingerprint from the resolved client IP and a
//! handful of request headers. Used as the rate-limit key.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};

use crate::crypto::sha256_hex;

/// Placeholder used when no client address can be determined
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client fingerprint derived from request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFingerprint {
    /// Lowercase hex SHA-256 of `ip:ua:accept:accept-language:accept-encoding`
    pub hash_hex: String,
    /// Resolved client IP (for logging only)
    pub ip: String,
}

impl ClientFingerprint {
    pub fn as_str(&self) -> &str {
        &self.hash_hex
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Resolve the client IP address
///
/// Order: `cf-connecting-ip`, first entry of `x-forwarded-for`, `x-real-ip`,
/// the direct connection address, then `"unknown"`.
pub fn resolve_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> String {
    if let Some(ip) = header_str(headers, "cf-connecting-ip") {
        return ip.to_string();
    }
    if let Some(first) = header_str(headers, "x-forwarded-for")
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }
    if let Some(ip) = header_str(headers, "x-real-ip") {
        return ip.to_string();
    }
    direct_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Compute the client fingerprint
///
/// Missing headers contribute an empty string. Deterministic for identical
/// inputs.
pub fn fingerprint(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> ClientFingerprint {
    let ip = resolve_client_ip(headers, direct_ip);
    let value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    };

    let material = format!(
        "{}:{}:{}:{}:{}",
        ip,
        value(header::USER_AGENT),
        value(header::ACCEPT),
        value(header::ACCEPT_LANGUAGE),
        value(header::ACCEPT_ENCODING),
    );

    ClientFingerprint {
        hash_hex: sha256_hex(material.as_bytes()),
        ip,
    }
}

/// Direct peer address, when the server was started with connect info
pub fn direct_ip(parts: &Parts) -> Option<IpAddr> {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(fingerprint(&parts.headers, direct_ip(parts)))
    }
}
