//! Service banner and unknown-route fallback

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Routes served by this module, for the banner and 404 body
pub const ENDPOINTS: [(&str, &str); 7] = [
    ("GET /", "Service information"),
    ("GET /health", "Health check"),
    ("POST /whatsapp", "Twilio WhatsApp webhook"),
    ("GET /users", "List users"),
    ("GET /users/:phone/progress", "User profile and recent lessons"),
    ("POST /send-message", "Send an outbound WhatsApp message"),
    ("POST /test-lesson", "Generate a lesson without WhatsApp"),
];

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub route: &'static str,
    pub description: &'static str,
}

fn endpoint_list() -> Vec<EndpointInfo> {
    ENDPOINTS
        .iter()
        .map(|&(route, description)| EndpointInfo { route, description })
        .collect()
}

/// GET /
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "WhatsApp AI Tutor",
        module: "tutor-bot",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        endpoints: endpoint_list(),
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    let body = serde_json::json!({
        "error": {
            "code": "NOT_FOUND",
            "message": "Endpoint not found",
        },
        "available_endpoints": ENDPOINTS.iter().map(|(route, _)| *route).collect::<Vec<_>>(),
    });

    (StatusCode::NOT_FOUND, Json(body))
}
