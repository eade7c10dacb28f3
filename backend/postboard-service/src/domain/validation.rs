/// Input validation for comments, posts and profiles
use crate::error::{ServiceError, ServiceResult};
use media_storage::MediaUpload;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_GALLERY_IMAGES: usize = 10;
pub const MAX_IMAGE_BYTES: usize = 3072 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

// Hardcoded pattern, compiled once
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9-]+(\.[a-z0-9-]+)*\.[a-z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::Validation(message.into())
}

/// Trim and check a required text field, returning the trimmed value
fn required_text(value: &str, field: &str, max_chars: Option<usize>) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("The {} field is required.", field)));
    }
    if let Some(max) = max_chars {
        if trimmed.chars().count() > max {
            return Err(invalid(format!(
                "The {} field must not be greater than {} characters.",
                field, max
            )));
        }
    }
    Ok(trimmed.to_string())
}

pub fn comment_content(content: &str) -> ServiceResult<String> {
    required_text(content, "content", Some(MAX_COMMENT_LENGTH))
}

pub fn post_title(title: &str) -> ServiceResult<String> {
    required_text(title, "title", Some(MAX_TITLE_LENGTH))
}

pub fn post_content(content: &str) -> ServiceResult<String> {
    required_text(content, "content", None)
}

pub fn profile_name(name: &str) -> ServiceResult<String> {
    required_text(name, "name", Some(MAX_NAME_LENGTH))
}

/// Emails are stored lowercase and must be `local@domain.tld`
pub fn profile_email(email: &str) -> ServiceResult<String> {
    let email = required_text(email, "email", Some(MAX_EMAIL_LENGTH))?;
    if email != email.to_lowercase() {
        return Err(invalid("The email field must be lowercase."));
    }
    if !EMAIL_REGEX.is_match(&email) {
        return Err(invalid("The email field must be a valid email address."));
    }
    Ok(email)
}

/// A single image upload: allowed type and within the size limit
pub fn image_upload(upload: &MediaUpload, field: &str) -> ServiceResult<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
        return Err(invalid(format!(
            "The {} field must be a file of type: jpeg, png, jpg, gif.",
            field
        )));
    }
    if upload.size() > MAX_IMAGE_BYTES {
        return Err(invalid(format!(
            "The {} field must not be greater than {} kilobytes.",
            field,
            MAX_IMAGE_BYTES / 1024
        )));
    }
    Ok(())
}

/// Gallery uploads: at most ten, each a valid image
pub fn gallery_uploads(uploads: &[MediaUpload]) -> ServiceResult<()> {
    if uploads.len() > MAX_GALLERY_IMAGES {
        return Err(invalid(format!(
            "The images field must not have more than {} items.",
            MAX_GALLERY_IMAGES
        )));
    }
    for (index, upload) in uploads.iter().enumerate() {
        image_upload(upload, &format!("images.{}", index))?;
    }
    Ok(())
}
