use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::api::AppState;
use crate::transport::{ActionTrigger, Control};

/// Callback payload the transport delivers when a control is clicked.
#[derive(Debug, Deserialize)]
pub struct InteractionCallback {
    pub notification_ref: String,
    pub custom_id: String,
    pub actor_ref: String,
    pub guild_ref: String,
    pub reply_token: String,
}

/// Decision conflicts and authorization denials are ordinary outcomes
/// answered privately to the actor; they never surface as 4xx/5xx here.
pub async fn interaction_callback(
    State(state): State<Arc<AppState>>,
    Json(callback): Json<InteractionCallback>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(control) = Control::parse_custom_id(&callback.custom_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unrecognized control id" })),
        );
    };

    let trigger = ActionTrigger {
        notification_ref: callback.notification_ref,
        action: control.action,
        actor_ref: callback.actor_ref,
        guild_ref: callback.guild_ref,
        reply_token: callback.reply_token,
    };

    match state.decisions.handle_trigger(&trigger).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "status": "handled",
                "delivery_id": uuid::Uuid::new_v4().to_string(),
                "outcome": outcome.message(),
            })),
        ),
        Err(e) => {
            error!(error = %e, "interaction handling failed");
            (StatusCode::OK, Json(json!({ "status": "error" })))
        }
    }
}
