//! Document Upload
//!
//! Stores a single multipart file under a collision-proof name inside the
//! uploads directory. Contact submissions then reference the stored name;
//! nothing is mailed at upload time.

use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use rand::Rng;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Upload ceiling, enforced through the router's body limit.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Stored name, to pass back as `uploadedFilename`
    pub filename: String,
    /// Client's original name, to pass back as `uploadedOriginalName`
    pub originalname: String,
    pub mimetype: String,
    pub size: usize,
    pub path: String,
}

/// A file persisted into the uploads directory.
pub(crate) struct SavedUpload {
    pub filename: String,
    pub size: usize,
}

/// Write uploaded bytes under `{field}-{millis}-{random}{ext}`, keeping
/// only the extension from the client-supplied name.
pub(crate) async fn save_upload(
    uploads_dir: &Path,
    field: &str,
    original_name: &str,
    data: &[u8],
) -> Result<SavedUpload, ApiError> {
    let ext = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let filename = format!(
        "{field}-{}-{}{ext}",
        chrono::Utc::now().timestamp_millis(),
        rand::thread_rng().gen_range(0..1_000_000_000_u32),
    );

    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| ApiError::upstream("Upload failed", e))?;
    tokio::fs::write(uploads_dir.join(&filename), data)
        .await
        .map_err(|e| ApiError::upstream("Upload failed", e))?;

    Ok(SavedUpload {
        filename,
        size: data.len(),
    })
}

/// Single file upload under the `document` form field
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?
    {
        if field.name() != Some("document") {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mimetype = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), str::to_string);

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?;

        let saved = save_upload(&state.config.uploads_dir, "document", &original, &data).await?;
        tracing::info!(filename = %saved.filename, size = saved.size, "document uploaded");

        let path = format!("/uploads/{}", saved.filename);
        return Ok(Json(UploadResponse {
            filename: saved.filename,
            originalname: original,
            mimetype,
            size: saved.size,
            path,
        }));
    }

    Err(ApiError::Validation("No file uploaded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testkit::multipart_from;
    use crate::state::testing::{state_with, test_config};
    use axum::http::StatusCode;
    use gatekit_core::MockGateway;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_document_upload_round_trip() {
        let gateway = Arc::new(MockGateway::new());
        let config = test_config();
        let uploads_dir = config.uploads_dir.clone();
        let (state, _) = state_with(config, gateway);

        let multipart =
            multipart_from(&[("document", Some("report.pdf"), "pdf bytes go here")]).await;

        let Json(response) = upload_document(State(state), multipart).await.unwrap();

        assert!(response.filename.starts_with("document-"));
        assert!(response.filename.ends_with(".pdf"));
        assert_eq!(response.originalname, "report.pdf");
        assert_eq!(response.size, "pdf bytes go here".len());
        assert_eq!(response.path, format!("/uploads/{}", response.filename));

        let on_disk = tokio::fs::read(uploads_dir.join(&response.filename))
            .await
            .unwrap();
        assert_eq!(on_disk, b"pdf bytes go here");

        tokio::fs::remove_dir_all(&uploads_dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        let (state, _) = state_with(test_config(), gateway);

        let multipart = multipart_from(&[("note", None, "just a text field")]).await;

        let err = upload_document(State(state), multipart).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No file uploaded");
    }

    #[tokio::test]
    async fn test_stored_names_are_unique_per_upload() {
        let gateway = Arc::new(MockGateway::new());
        let config = test_config();
        let uploads_dir = config.uploads_dir.clone();
        let (state, _) = state_with(config, gateway);

        let first = upload_document(
            State(state.clone()),
            multipart_from(&[("document", Some("a.txt"), "one")]).await,
        )
        .await
        .unwrap();
        let second = upload_document(
            State(state),
            multipart_from(&[("document", Some("a.txt"), "two")]).await,
        )
        .await
        .unwrap();

        assert_ne!(first.0.filename, second.0.filename);

        tokio::fs::remove_dir_all(&uploads_dir).await.unwrap();
    }
}
