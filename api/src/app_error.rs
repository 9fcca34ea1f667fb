use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use pdf_summarizer::SummarizerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Summarizer(#[from] SummarizerError),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Multipart(e) => {
                log::warn!("Rejected request: {}", e);
                (StatusCode::BAD_REQUEST, format!("Invalid multipart body: {e}")).into_response()
            }
            AppError::Summarizer(e) => {
                log::error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(
                        "<html><body><h1>Internal Server Error</h1>\
                         <p>The server encountered an internal error and was unable to complete your request.</p>\
                         </body></html>",
                    ),
                )
                    .into_response()
            }
        }
    }
}
