use crate::app_error::AppError;
use crate::template::render_index;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use pdf_summarizer::{Summarizer, UploadStore};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
    pub uploads: UploadStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// GET /
async fn index() -> Html<String> {
    Html(render_index(None))
}

struct PdfPart {
    filename: String,
    bytes: Bytes,
}

#[derive(Default)]
struct UploadForm {
    pdf: Option<PdfPart>,
    question: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            // Only a part carrying a filename or content type counts as a file.
            "pdf" if field.file_name().is_some() || field.content_type().is_some() => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                form.pdf = Some(PdfPart { filename, bytes });
            }
            "question" => {
                form.question = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /
///
/// Multipart fields `pdf` (file) and `question` (text). Validation failures
/// answer with a short plain-text body.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(&mut multipart).await?;

    let Some(pdf) = form.pdf else {
        return Ok("No file part".into_response());
    };
    if pdf.filename.is_empty() {
        return Ok("No selected file".into_response());
    }

    let stored = state.uploads.save(&pdf.filename, &pdf.bytes).await?;
    let pdf_text = state.summarizer.extract(stored.path.clone()).await?;

    let question = match form.question {
        Some(q) if !q.is_empty() => q,
        _ => return Ok("No question provided".into_response()),
    };

    log::info!(
        "Answering question for upload {} ('{}')",
        stored.id,
        stored.original_filename
    );

    let short_summary = state.summarizer.answer(&question, &pdf_text).await?;

    Ok(Html(render_index(Some(&short_summary))).into_response())
}
