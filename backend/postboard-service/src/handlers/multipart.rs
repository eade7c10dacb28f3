/// `multipart/form-data` decoding for post and profile writes
use crate::domain::validation::{MAX_GALLERY_IMAGES, MAX_IMAGE_BYTES};
use crate::error::{ServiceError, ServiceResult};
use actix_multipart::{Field, Multipart};
use actix_web::http::header::{ContentDisposition, CONTENT_DISPOSITION, CONTENT_TYPE};
use futures_util::stream::StreamExt;
use media_storage::MediaUpload;
use std::collections::HashMap;

const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;
// Cover image plus a full gallery
const MAX_FILE_PARTS: usize = MAX_GALLERY_IMAGES + 1;
const MAX_TEXT_PARTS: usize = 16;

/// Text fields and file parts of one multipart body
///
/// File parts are grouped by field name, with a trailing `[]` stripped so
/// `images[]` and `images` land in the same list.
#[derive(Debug, Default)]
pub struct FormData {
    pub texts: HashMap<String, String>,
    pub files: HashMap<String, Vec<MediaUpload>>,
}

impl FormData {
    pub fn text(&self, name: &str) -> String {
        self.texts.get(name).cloned().unwrap_or_default()
    }

    /// First file of a field
    pub fn take_file(&mut self, name: &str) -> Option<MediaUpload> {
        self.files
            .remove(name)
            .and_then(|files| files.into_iter().next())
    }

    pub fn take_files(&mut self, name: &str) -> Option<Vec<MediaUpload>> {
        self.files.remove(name)
    }
}

fn malformed(detail: impl std::fmt::Display) -> ServiceError {
    ServiceError::Validation(format!("Malformed form data: {}", detail))
}

pub async fn read_form(mut payload: Multipart) -> ServiceResult<FormData> {
    let mut form = FormData::default();
    let mut file_parts = 0;

    while let Some(item) = payload.next().await {
        let field = item.map_err(malformed)?;

        let disposition = field
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| ContentDisposition::from_raw(value).ok());
        let Some(disposition) = disposition else {
            return Err(malformed("part without content disposition"));
        };
        let Some(name) = disposition.get_name() else {
            return Err(malformed("part without a field name"));
        };
        let name = name.trim_end_matches("[]").to_string();
        let file_name = disposition.get_filename().map(str::to_string);

        match file_name {
            Some(file_name) => {
                file_parts += 1;
                if file_parts > MAX_FILE_PARTS {
                    return Err(ServiceError::Validation(format!(
                        "No more than {} files may be uploaded at once.",
                        MAX_FILE_PARTS
                    )));
                }
                let content_type = field
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = read_field(field, MAX_IMAGE_BYTES + 1, &name).await?;
                // Browsers send an empty part for an untouched file input
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files
                    .entry(name)
                    .or_default()
                    .push(MediaUpload::new(file_name, content_type, bytes));
            }
            None => {
                if form.texts.len() >= MAX_TEXT_PARTS && !form.texts.contains_key(&name) {
                    return Err(malformed("too many fields"));
                }
                let bytes = read_field(field, MAX_TEXT_FIELD_BYTES, &name).await?;
                let text = String::from_utf8(bytes)
                    .map_err(|_| malformed(format!("{} is not valid UTF-8", name)))?;
                form.texts.insert(name, text);
            }
        }
    }

    Ok(form)
}

/// Read a part into memory, rejecting it once it grows past `limit`
async fn read_field(mut field: Field, limit: usize, name: &str) -> ServiceResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        if bytes.len() + chunk.len() > limit {
            return Err(ServiceError::Validation(format!(
                "The {} field is too large.",
                name
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
