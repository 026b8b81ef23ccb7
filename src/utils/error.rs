use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 검색 입력 누락/오류. 사용자가 바로 고칠 수 있는 종류.
    #[error("{0}")]
    InputError(String),

    /// 스냅샷도 아니고 payload 로도 보이지 않는 JSON, 혹은 basic 누락
    #[error("형식 오류: {0}")]
    FormatError(String),

    /// 업스트림 비정상 응답. 상태 코드와 본문을 한 줄로 노출한다.
    #[error("{status} {body}")]
    TransportError { status: u16, body: String },

    #[error("렌더링 오류: {0}")]
    RenderError(String),

    #[error("설정 오류: {0}")]
    ConfigError(String),

    #[error("HTTP 요청 오류: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON 오류: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    IoError(#[from] std::io::Error),

    #[error("내부 오류: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// 오류 분류. 컨트롤러와 호출자가 메시지 문자열 대신 이것으로 분기한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Format,
    Transport,
    Render,
    Internal,
}

impl AppError {
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        AppError::TransportError {
            status,
            body: body.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InputError(_) => ErrorKind::Input,
            AppError::FormatError(_) | AppError::SerdeJsonError(_) => ErrorKind::Format,
            AppError::TransportError { .. } | AppError::ReqwestError(_) => ErrorKind::Transport,
            AppError::RenderError(_) => ErrorKind::Render,
            AppError::ConfigError(_) | AppError::IoError(_) | AppError::InternalError(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputError(_) | AppError::FormatError(_) | AppError::SerdeJsonError(_) => {
                StatusCode::BAD_REQUEST
            }
            // 업스트림 상태를 그대로 전달하되, 성공 코드나 이상한 값이면 502
            AppError::TransportError { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            AppError::RenderError(_)
            | AppError::ConfigError(_)
            | AppError::IoError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            AppError::InputError(_) => "input_error",
            AppError::FormatError(_) => "format_error",
            AppError::TransportError { .. } => "transport_error",
            AppError::RenderError(_) => "render_error",
            AppError::ConfigError(_) => "configuration_error",
            AppError::ReqwestError(_) => "request_error",
            AppError::SerdeJsonError(_) => "serialization_error",
            AppError::IoError(_) => "io_error",
            AppError::InternalError(_) => "internal_error",
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        })
    }
}
