//! Statically declared form schemas and their validation.
//!
//! Each submission type has a fixed [`FormSchema`] listing its fields, and a
//! `clean` function that turns raw input into typed values or a
//! [`FieldErrors`] map keyed by field name. Checks that need storage (does
//! the chosen group exist?) run in the services and add to the same map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::{CommentText, Error, ErrorCode, GroupId, PostText};

/// Message for a missing required value.
pub const REQUIRED_MESSAGE: &str = "This field is required.";
/// Message for a choice that does not exist.
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
/// Message for an upload that is not a supported image.
pub const INVALID_IMAGE_MESSAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Largest accepted image upload, in mebibytes.
pub const MAX_IMAGE_MIB: usize = 5;
/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = MAX_IMAGE_MIB * 1024 * 1024;

/// Kind of input a field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Multi-line text.
    Textarea,
    /// One of a set of choices, submitted by id.
    Choice,
    /// An uploaded image.
    Image,
}

/// Declaration of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldSpec {
    /// Submitted field name.
    pub name: &'static str,
    /// Human readable label.
    pub label: &'static str,
    /// Input kind.
    pub kind: FieldKind,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Hint shown next to the input.
    pub help_text: &'static str,
}

/// Declaration of a whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FormSchema {
    /// Stable form name.
    pub name: &'static str,
    /// Fields in display order.
    #[schema(value_type = Vec<FieldSpec>)]
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    /// Look up a field declaration.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Fields of the post create/edit form.
pub const POST_FORM: FormSchema = FormSchema {
    name: "post",
    fields: &[
        FieldSpec {
            name: "text",
            label: "Post text",
            kind: FieldKind::Textarea,
            required: true,
            help_text: "Text of the new post",
        },
        FieldSpec {
            name: "group",
            label: "Group",
            kind: FieldKind::Choice,
            required: false,
            help_text: "Group the post will belong to",
        },
        FieldSpec {
            name: "image",
            label: "Image",
            kind: FieldKind::Image,
            required: false,
            help_text: "Picture attached to the post",
        },
    ],
};

/// Fields of the comment form.
pub const COMMENT_FORM: FormSchema = FormSchema {
    name: "comment",
    fields: &[FieldSpec {
        name: "text",
        label: "Comment text",
        kind: FieldKind::Textarea,
        required: true,
        help_text: "Text of the comment",
    }],
};

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// An empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Whether no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded against a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fields with at least one message.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Convert into an [`ErrorCode::InvalidRequest`](super::ErrorCode) error
    /// carrying the messages under `details.fields`.
    pub fn into_error(self, message: impl Into<String>) -> Error {
        let message = message.into();
        match serde_json::to_value(&self) {
            Ok(fields) => Error::invalid_request(message).with_details(json!({ "fields": fields })),
            Err(_) => Error::invalid_request(message),
        }
    }

    /// Recover field messages from an error built by [`Self::into_error`].
    pub fn from_error(error: &Error) -> Option<Self> {
        if error.code() != ErrorCode::InvalidRequest {
            return None;
        }
        let fields = error.details()?.get("fields")?;
        serde_json::from_value(fields.clone()).ok()
    }
}

/// An uploaded file as received by an inbound adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied file name.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Image formats accepted for post attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
    /// GIF.
    Gif,
    /// WebP.
    Webp,
}

impl ImageFormat {
    /// Canonical file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

/// An upload that passed format and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidImage {
    /// Detected format.
    pub format: ImageFormat,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check extension, size and magic bytes.
    ///
    /// The detected format must agree with the file extension.
    pub fn validate(self) -> Result<ValidImage, String> {
        if self.bytes.is_empty() {
            return Err("The submitted file is empty.".to_owned());
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(format!("Ensure the image is at most {MAX_IMAGE_MIB} MiB."));
        }
        let declared = self
            .filename
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageFormat::from_extension(ext));
        match (declared, ImageFormat::sniff(&self.bytes)) {
            (Some(declared), Some(detected)) if declared == detected => Ok(ValidImage {
                format: detected,
                bytes: self.bytes,
            }),
            _ => Err(INVALID_IMAGE_MESSAGE.to_owned()),
        }
    }
}

/// What the submitter asked to do with the image field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageInput {
    /// Nothing supplied; keep whatever the post has.
    #[default]
    Keep,
    /// A new file was uploaded.
    Replace(ImageUpload),
    /// The clear checkbox was ticked.
    Clear,
}

/// Raw post form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormInput {
    /// Raw `text` value.
    pub text: Option<String>,
    /// Raw `group` value.
    pub group: Option<String>,
    /// Image action.
    pub image: ImageInput,
}

/// Image action after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    /// Leave the current image untouched.
    Keep,
    /// Store and attach a new image.
    Replace(ValidImage),
    /// Detach the current image.
    Clear,
}

/// Typed post form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPostForm {
    /// Validated body.
    pub text: PostText,
    /// Selected group, not yet checked for existence.
    pub group_id: Option<GroupId>,
    /// Image action.
    pub image: ImageChange,
}

impl PostFormInput {
    /// Validate field shapes.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::forms::{PostFormInput, REQUIRED_MESSAGE};
    ///
    /// let errors = PostFormInput::default().clean().unwrap_err();
    /// assert_eq!(errors.get("text"), [REQUIRED_MESSAGE]);
    /// ```
    pub fn clean(self) -> Result<CleanPostForm, FieldErrors> {
        let mut errors = FieldErrors::new();

        let text = match self.text.map(PostText::new) {
            Some(Ok(text)) => Some(text),
            Some(Err(_)) | None => {
                errors.add("text", REQUIRED_MESSAGE);
                None
            }
        };

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(GroupId::new(id)),
                Err(_) => {
                    errors.add("group", INVALID_CHOICE_MESSAGE);
                    None
                }
            },
        };

        let image = match self.image {
            ImageInput::Keep => Some(ImageChange::Keep),
            ImageInput::Clear => Some(ImageChange::Clear),
            ImageInput::Replace(upload) => match upload.validate() {
                Ok(valid) => Some(ImageChange::Replace(valid)),
                Err(message) => {
                    errors.add("image", message);
                    None
                }
            },
        };

        match (text, image) {
            (Some(text), Some(image)) if errors.is_empty() => Ok(CleanPostForm {
                text,
                group_id,
                image,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw comment form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFormInput {
    /// Raw `text` value.
    pub text: Option<String>,
}

impl CommentFormInput {
    /// Validate the comment text.
    pub fn clean(self) -> Result<CommentText, FieldErrors> {
        match self.text.map(CommentText::new) {
            Some(Ok(text)) => Ok(text),
            Some(Err(_)) | None => {
                let mut errors = FieldErrors::new();
                errors.add("text", REQUIRED_MESSAGE);
                Err(errors)
            }
        }
    }
}

/// Group offered in the post form's choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupChoice {
    /// Submitted value.
    pub id: GroupId,
    /// Displayed label.
    pub title: String,
}

/// A form ready to render: declaration, current values, errors and choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FormView {
    /// Form declaration.
    pub schema: FormSchema,
    /// Current value of each text-like field.
    pub values: BTreeMap<String, String>,
    /// Validation messages; empty for an unbound form.
    pub errors: FieldErrors,
    /// Options for choice fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<GroupChoice>,
    /// Image currently attached to the edited post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_image: Option<String>,
}

impl FormView {
    /// An empty form for the given schema.
    pub fn unbound(schema: FormSchema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            errors: FieldErrors::new(),
            choices: Vec::new(),
            current_image: None,
        }
    }

    /// Set a field value.
    #[must_use]
    pub fn with_value(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.insert(field.to_owned(), value.into());
        self
    }

    /// Attach validation errors.
    #[must_use]
    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors;
        self
    }

    /// Attach choice options.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<GroupChoice>) -> Self {
        self.choices = choices;
        self
    }

    /// Whether the form carries validation errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
#[path = "forms_tests.rs"]
mod tests;
