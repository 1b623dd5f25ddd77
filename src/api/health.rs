use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::api::LoginState;

pub async fn health(State(state): State<LoginState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "authorized": state.session.is_authorized().await,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
