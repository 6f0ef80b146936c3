//! Twilio WhatsApp webhook

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::handler::mask_phone;
use crate::twilio::strip_whatsapp_prefix;
use crate::twiml::{render_empty_response, render_message_response};
use crate::AppState;

/// Form fields Twilio posts for an inbound message
///
/// Every field is optional at the extractor so a missing sender is answered
/// with 400 instead of a rejection from the form parser.
#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "To", default)]
    pub to: Option<String>,
}

fn twiml(status: StatusCode, xml: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

/// POST /whatsapp
///
/// Always answers with TwiML. The dispatcher never fails, so the only
/// non-200 outcome is a request without a sender.
pub async fn whatsapp_webhook(
    State(state): State<AppState>,
    Form(message): Form<InboundMessage>,
) -> Response {
    let sender = message
        .from
        .as_deref()
        .map(strip_whatsapp_prefix)
        .unwrap_or_default();

    if sender.is_empty() {
        warn!("Webhook request without sender");
        return twiml(StatusCode::BAD_REQUEST, render_empty_response());
    }

    let body = message.body.as_deref().unwrap_or_default();
    info!(
        from = %mask_phone(sender),
        to = %message.to.as_deref().map(strip_whatsapp_prefix).unwrap_or_default(),
        chars = body.chars().count(),
        "Inbound WhatsApp message"
    );

    let reply = state.handler.process_message(sender, body).await;
    twiml(StatusCode::OK, render_message_response(&reply))
}
