//! Extractors for post and comment form submissions.
//!
//! Forms arrive either URL-encoded or as `multipart/form-data` when an
//! image is attached. Both are read into the same raw shape before being
//! handed to the domain form types, which do all validation.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use actix_web::dev::{Payload, UrlEncoded};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::TryStreamExt;
use futures_util::future::LocalBoxFuture;
use serde::Deserialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::forms::{
    CommentFormInput, ImageInput, ImageUpload, MAX_IMAGE_BYTES, PostFormInput,
};

/// Largest accepted URL-encoded body and multipart text field.
const MAX_TEXT_BYTES: usize = 256 * 1024;
/// Checkbox asking to detach the current image.
pub const IMAGE_CLEAR_FIELD: &str = "image-clear";
const IMAGE_FIELD: &str = "image";

/// Post form fields as documented in the OpenAPI description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostFormBody {
    /// Post body.
    pub text: String,
    /// Id of the group to file the post under.
    pub group: Option<i64>,
    /// Attached picture.
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    /// Set to detach the current picture when editing.
    #[serde(rename = "image-clear")]
    pub image_clear: Option<String>,
}

/// Comment form fields as documented in the OpenAPI description.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentFormBody {
    /// Comment body.
    pub text: String,
}

#[derive(Debug, Default)]
struct RawSubmission {
    values: HashMap<String, String>,
    file: Option<ImageUpload>,
}

impl RawSubmission {
    fn take(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }
}

async fn read_submission(req: HttpRequest, mut payload: Payload) -> Result<RawSubmission, Error> {
    if req.content_type().starts_with("multipart/form-data") {
        read_multipart(&req, payload).await
    } else {
        let values = UrlEncoded::<HashMap<String, String>>::new(&req, &mut payload)
            .limit(MAX_TEXT_BYTES)
            .await
            .map_err(|err| Error::invalid_request(format!("unreadable form body: {err}")))?;
        Ok(RawSubmission { values, file: None })
    }
}

async fn read_multipart(req: &HttpRequest, payload: Payload) -> Result<RawSubmission, Error> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut submission = RawSubmission::default();
    while let Some(field) = multipart.try_next().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);
        match filename {
            Some(filename) if name == IMAGE_FIELD => {
                let bytes = read_field(field, MAX_IMAGE_BYTES).await?;
                // Browsers send an empty part when no file was chosen.
                if !(filename.is_empty() && bytes.is_empty()) {
                    submission.file = Some(ImageUpload { filename, bytes });
                }
            }
            Some(_) => {
                read_field(field, 0).await?;
            }
            None => {
                let bytes = read_field(field, MAX_TEXT_BYTES).await?;
                let value = String::from_utf8(bytes)
                    .map_err(|_| Error::invalid_request(format!("field {name} is not UTF-8")))?;
                submission.values.insert(name, value);
            }
        }
    }
    Ok(submission)
}

/// Read a field keeping at most `cap + 1` bytes, so oversized values stay
/// detectable without buffering the whole upload.
async fn read_field(mut field: Field, cap: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        let room = (cap + 1).saturating_sub(bytes.len());
        bytes.extend_from_slice(chunk.get(..room.min(chunk.len())).unwrap_or_default());
    }
    Ok(bytes)
}

fn multipart_error(err: actix_multipart::MultipartError) -> Error {
    debug!(error = %err, "rejected multipart body");
    Error::invalid_request(format!("unreadable multipart body: {err}"))
}

/// A submitted post form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSubmission(pub PostFormInput);

impl From<RawSubmission> for PostSubmission {
    fn from(mut raw: RawSubmission) -> Self {
        let image = match raw.file.take() {
            Some(upload) => ImageInput::Replace(upload),
            None if raw.take(IMAGE_CLEAR_FIELD).is_some() => ImageInput::Clear,
            None => ImageInput::Keep,
        };
        Self(PostFormInput {
            text: raw.take("text"),
            group: raw.take("group"),
            image,
        })
    }
}

impl FromRequest for PostSubmission {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = read_submission(req.clone(), payload.take());
        Box::pin(async move { fut.await.map(Self::from) })
    }
}

/// A submitted comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSubmission(pub CommentFormInput);

impl FromRequest for CommentSubmission {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = read_submission(req.clone(), payload.take());
        Box::pin(async move {
            let mut raw = fut.await?;
            Ok(Self(CommentFormInput {
                text: raw.take("text"),
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    use super::*;

    const BOUNDARY: &str = "XBOUNDARYX";

    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(filename) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_submission(request: TestRequest) -> PostSubmission {
        let (req, mut payload) = request.to_http_parts();
        PostSubmission::from_request(&req, &mut payload)
            .await
            .expect("form extracted")
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> TestRequest {
        TestRequest::post()
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    #[rstest]
    #[actix_web::test]
    async fn urlencoded_fields_are_read() {
        let request = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("text=Hello+world&group=3");

        let PostSubmission(form) = post_submission(request).await;

        assert_eq!(form.text.as_deref(), Some("Hello world"));
        assert_eq!(form.group.as_deref(), Some("3"));
        assert_eq!(form.image, ImageInput::Keep);
    }

    #[rstest]
    #[actix_web::test]
    async fn clear_checkbox_requests_image_removal() {
        let request = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("text=x&image-clear=on");

        let PostSubmission(form) = post_submission(request).await;
        assert_eq!(form.image, ImageInput::Clear);
    }

    #[rstest]
    #[actix_web::test]
    async fn multipart_uploads_carry_the_file() {
        let png = b"\x89PNG\r\n\x1a\nrest";
        let request = multipart_request(&[
            ("text", None, b"With a picture"),
            ("image", Some("cat.png"), png),
        ]);

        let PostSubmission(form) = post_submission(request).await;

        assert_eq!(form.text.as_deref(), Some("With a picture"));
        let upload = match form.image {
            ImageInput::Replace(upload) => upload,
            other => panic!("expected an upload, got {other:?}"),
        };
        assert_eq!(upload.filename, "cat.png");
        assert_eq!(upload.bytes, png);
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_file_parts_mean_no_upload() {
        let request = multipart_request(&[("text", None, b"plain"), ("image", Some(""), b"")]);

        let PostSubmission(form) = post_submission(request).await;
        assert_eq!(form.image, ImageInput::Keep);
    }

    #[rstest]
    #[actix_web::test]
    async fn comment_text_is_read() {
        let (req, mut payload) = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("text=Nice+post")
            .to_http_parts();

        let CommentSubmission(form) = CommentSubmission::from_request(&req, &mut payload)
            .await
            .expect("form extracted");
        assert_eq!(form.text.as_deref(), Some("Nice post"));
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_multipart_is_an_invalid_request() {
        let (req, mut payload) = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "multipart/form-data"))
            .set_payload("garbage")
            .to_http_parts();

        let error = PostSubmission::from_request(&req, &mut payload)
            .await
            .expect_err("missing boundary");
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
