//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

/// Response for GET /api/auth/csrf
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

/// Request for POST /api/auth/login
///
/// Both fields are optional here so that a missing field maps to the
/// dedicated 400 response rather than a deserialization rejection.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

/// Response for POST /api/auth/login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub message: String,
}
