//! Post image endpoints (multipart upload).

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;
use tracing::debug;

use super::{Access, ApiClient};
use crate::error::{ApiError, ApiResult};
use crate::models::PostImage;

/// Build the upload form: one `images` part per file, one
/// `remainImageIds` field per image that should survive the update
async fn build_form(files: &[&Path], remain_image_ids: &[i64]) -> ApiResult<Form> {
    let mut form = Form::new();

    for path in files {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::validation("images", format!("Cannot read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;
        form = form.part("images", part);
    }

    for id in remain_image_ids {
        form = form.text("remainImageIds", id.to_string());
    }

    Ok(form)
}

impl ApiClient {
    pub async fn list_post_images(&self, post_id: i64) -> ApiResult<Vec<PostImage>> {
        self.get_list(&format!("/api/posts/{}/images", post_id), Access::Session)
            .await
    }

    /// Replace a post's images.
    ///
    /// Existing images not listed in `remain_image_ids` are removed by the
    /// backend; every file in `files` is added.
    pub async fn update_post_images(
        &self,
        post_id: i64,
        files: &[&Path],
        remain_image_ids: &[i64],
    ) -> ApiResult<Vec<PostImage>> {
        let form = build_form(files, remain_image_ids).await?;
        debug!(
            post_id,
            uploads = files.len(),
            kept = remain_image_ids.len(),
            "Uploading post images"
        );

        let builder = self
            .request(
                Method::PUT,
                &format!("/api/posts/{}/images", post_id),
                Access::Required,
            )?
            .multipart(form);
        let value = self.execute_json(builder).await?;
        super::envelope::normalize_list(value)
    }
}
