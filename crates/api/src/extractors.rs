//! Request extractors.

use axum::extract::{FromRequest, Multipart, Request};
use ringbook_core::attachment::Upload;

use crate::error::ApiError;

/// Minimum length of a post's text.
pub const MIN_CONTENT_CHARS: usize = 2;

/// Multipart form with an `entry` text field and any number of `file*`
/// fields. Unknown fields are ignored.
#[derive(Debug, Clone)]
pub struct EntryForm {
    /// Free-form transaction text.
    pub text: String,
    /// Attached files in field order.
    pub files: Vec<Upload>,
}

/// Multipart form carrying only `file*` fields.
#[derive(Debug, Clone)]
pub struct FileForm {
    /// Files in field order.
    pub files: Vec<Upload>,
}

/// Checks post text length, counting characters rather than bytes.
pub fn validate_content(text: &str) -> Result<(), ApiError> {
    if text.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ApiError::validation(format!(
            "Post text must be at least {MIN_CONTENT_CHARS} characters"
        )));
    }
    Ok(())
}

async fn read_fields(mut multipart: Multipart) -> Result<(Option<String>, Vec<Upload>), ApiError> {
    let mut text = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "entry" {
            text = Some(
                field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?,
            );
        } else if name.starts_with("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(e.body_text()))?;
            files.push(Upload {
                filename,
                content_type,
                data,
            });
        }
    }

    Ok((text, files))
}

impl<S> FromRequest<S> for EntryForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        let (text, files) = read_fields(multipart).await?;

        let text = text.ok_or_else(|| ApiError::validation("Missing 'entry' field"))?;
        validate_content(&text)?;

        Ok(Self {
            text: text.trim().to_string(),
            files,
        })
    }
}

impl<S> FromRequest<S> for FileForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        let (_, files) = read_fields(multipart).await?;

        if files.is_empty() {
            return Err(ApiError::validation("No files submitted"));
        }
        Ok(Self { files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use rstest::rstest;

    const BOUNDARY: &str = "X-RINGBOOK-BOUNDARY";

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request {
        let mut body = String::new();
        for (name, file, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file {
                Some((filename, mime)) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[rstest]
    #[case("ok", true)]
    #[case("  a ", false)]
    #[case("", false)]
    #[case("午餐", true)]
    fn test_validate_content(#[case] text: &str, #[case] ok: bool) {
        assert_eq!(validate_content(text).is_ok(), ok);
    }

    #[tokio::test]
    async fn test_entry_form_collects_files_in_order() {
        let req = multipart_request(&[
            ("entry", None, "Lunch with client 60"),
            ("file0", Some(("receipt.png", "image/png")), "png-bytes"),
            ("other", None, "ignored"),
            ("file1", Some(("invoice.pdf", "application/pdf")), "pdf-bytes"),
        ]);

        let form = EntryForm::from_request(req, &()).await.unwrap();
        assert_eq!(form.text, "Lunch with client 60");
        assert_eq!(form.files.len(), 2);
        assert_eq!(form.files[0].filename, "receipt.png");
        assert_eq!(form.files[0].content_type, "image/png");
        assert_eq!(form.files[1].content_type, "application/pdf");
        assert_eq!(&form.files[1].data[..], b"pdf-bytes");
    }

    #[tokio::test]
    async fn test_entry_form_requires_entry_text() {
        let req = multipart_request(&[("file0", Some(("a.png", "image/png")), "x")]);
        let err = EntryForm::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.0.error_code(), "VALIDATION_ERROR");

        let req = multipart_request(&[("entry", None, "x")]);
        assert!(EntryForm::from_request(req, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_file_form_requires_a_file() {
        let req = multipart_request(&[("entry", None, "no files here")]);
        assert!(FileForm::from_request(req, &()).await.is_err());
    }
}
