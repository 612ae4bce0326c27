use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::storage::{check_upload, generate_file_name, ObjectStorage, UploadKind};
use crate::utils::app_error::AppError;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
    pub file_name: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

pub async fn upload_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if auth_user.is_none() {
        return Err(AppError::unauthorized());
    }

    let mut file: Option<(String, axum::body::Bytes)> = None;
    let mut kind: Option<UploadKind> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Error reading multipart body : {e}");
        AppError::bad_request("Invalid multipart body.")
    })? {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    warn!("Error reading uploaded file : {e}");
                    AppError::bad_request("Could not read the uploaded file.")
                })?;
                file = Some((content_type, data));
            }
            Some("type") => {
                let value = field.text().await.map_err(|e| {
                    warn!("Error reading upload type : {e}");
                    AppError::bad_request("Invalid multipart body.")
                })?;
                match UploadKind::parse(&value) {
                    Some(parsed) => kind = Some(parsed),
                    None => {
                        return Err(AppError::bad_request(
                            "The upload type must be `post` or `profile`.",
                        ))
                    }
                }
            }
            _ => {}
        }
    }

    let Some((content_type, data)) = file else {
        return Err(AppError::bad_request("Missing `file` field."));
    };
    let kind = kind.unwrap_or(UploadKind::Post);

    check_upload(kind, &content_type, data.len())?;

    let file_name = generate_file_name(kind, &content_type);
    let url = app_state.storage.store(&file_name, &data).await?;

    Ok(Json(UploadResponse {
        url,
        file_name,
        size: data.len(),
        kind: kind.as_str(),
    }))
}
