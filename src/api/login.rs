use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use crate::{api::LoginState, success, utils, warning};

pub const STATE_COOKIE: &str = "spotify_state_auth";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub message: String,
}

impl CallbackResponse {
    fn failed(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.into(),
        })
    }
}

pub async fn login(State(state): State<LoginState>, jar: CookieJar) -> Response {
    let csrf = utils::generate_state();

    match state.session.authorization_url(&csrf) {
        Ok(url) => {
            let cookie = Cookie::build((STATE_COOKIE, csrf))
                .path("/")
                .http_only(true)
                .build();
            (jar.add(cookie), Redirect::to(url.as_str())).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Cannot build authorization URL: {}", e),
        )
            .into_response(),
    }
}

pub async fn callback(
    State(state): State<LoginState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Json<CallbackResponse> {
    if let Some(error) = params.error {
        warning!("Callback error: {}", error);
        return CallbackResponse::failed(format!("Could not handle callback: {}", error));
    }

    let expected = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    match (params.state.as_deref(), expected.as_deref()) {
        (Some(received), Some(expected)) if received == expected => {}
        _ => return CallbackResponse::failed("A state mismatch has occurred"),
    }

    let Some(code) = params.code else {
        return CallbackResponse::failed("Did not receive code from Auth Code Flow");
    };

    match state.session.authorize(&code).await {
        Ok(_) => {
            success!("Authorization complete");
            // Full channel means the orchestrator has already been told.
            let _ = state.authorized.try_send(());
            Json(CallbackResponse {
                success: true,
                message: "Successfully connected to Spotify. You can close this window".to_string(),
            })
        }
        Err(e) => {
            warning!("Auth Code Flow Grant failed: {}", e);
            CallbackResponse::failed(format!("Could not perform authorization: {}", e))
        }
    }
}
