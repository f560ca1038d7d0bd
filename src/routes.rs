//! HTTP handlers.
//!
//! Every handler is a linear validate → translate → call → reshape sequence.
//! Failures of any kind leave through [`ApiError`], which renders the single
//! error envelope shared by all endpoints.

use crate::ai::{Capability, InputItem};
use crate::error::ErrorKind;
use crate::models::{
    ChatRequest, ChatResponse, GenerationRequest, GenerationResponse, HealthResponse,
    MessageResponse,
};
use crate::server::AppState;
use crate::{translate, Error};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const HOME_MESSAGE: &str = "제미나이 서버 실행중!";
pub const HEALTH_MESSAGE: &str = "서버가 정상적으로 동작 중입니다";
pub const DECODE_FAILED: &str = "이미지 데이터를 처리할 수 없습니다";
pub const IMAGE_GENERATION_FAILED: &str = "이미지 생성 중 오류가 발생했습니다";
pub const CHAT_FAILED: &str = "응답 생성 중 오류가 발생했습니다";
const TRACE_LIMIT: usize = 500;

/// A failed request, rendered as `{ success: false, error: { kind, message, details?, trace? } }`.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    details: Option<&'static str>,
    trace: Option<String>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a str>,
}

impl ApiError {
    /// Convert `error` for an endpoint whose upstream failures carry `upstream_details`.
    fn from_error(state: &AppState, error: Error, upstream_details: &'static str) -> Self {
        let kind = error.kind();
        let details = match kind {
            ErrorKind::Validation => None,
            ErrorKind::Decode => Some(DECODE_FAILED),
            ErrorKind::Upstream | ErrorKind::Internal => Some(upstream_details),
        };

        if kind.is_client_error() {
            tracing::warn!("Rejected request ({:?}): {}", kind, error);
        } else {
            tracing::error!("Request failed ({:?}): {}", kind, error);
        }

        let trace = (state.settings.expose_error_traces && !kind.is_client_error())
            .then(|| format!("{:?}", error).chars().take(TRACE_LIMIT).collect());

        Self {
            kind,
            message: error.to_string(),
            details,
            trace,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn status(&self) -> StatusCode {
        if self.kind.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                kind: self.kind,
                message: &self.message,
                details: self.details,
                trace: self.trace.as_deref(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    body.map(|Json(value)| value).map_err(|rejection| {
        Error::Validation(format!("잘못된 JSON 요청입니다: {}", rejection.body_text()))
    })
}

pub async fn home() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: HOME_MESSAGE.to_string(),
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: HEALTH_MESSAGE.to_string(),
    })
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let reject = |e| ApiError::from_error(&state, e, CHAT_FAILED);

    let message = json_body(body)
        .and_then(translate::chat_message)
        .map_err(reject)?;

    let response = state
        .generator
        .generate(Capability::Text, &[InputItem::Text(message)])
        .await
        .map_err(reject)?;

    Ok(Json(ChatResponse {
        success: true,
        response,
    }))
}

pub async fn generate_image(
    State(state): State<AppState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let reject = |e| ApiError::from_error(&state, e, IMAGE_GENERATION_FAILED);

    let inputs = json_body(body)
        .and_then(|request| translate::generation_inputs(request, state.settings.image_decoding))
        .map_err(reject)?;

    let text = state
        .generator
        .generate(Capability::Multimodal, &inputs)
        .await
        .map_err(reject)?;

    Ok(Json(GenerationResponse::from_text(text)))
}
