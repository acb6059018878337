#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Feedback items exchanged with the platform and everything that produces
//! them.

/// Round-trip storage of annotations inside invisible feedback items.
pub mod codec;
/// Rendering an assessment into feedback items.
pub mod render;
/// Size-bounded splitting of long feedback texts.
pub mod split;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

pub use self::{
    codec::{CLIENT_DATA_TEXT, deserialize_annotations, serialize_annotations},
    render::{RenderedAssessment, render_feedback},
    split::split_feedback,
};

/// Kind of a feedback item on the platform.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
    /// Result of an automatic test.
    Automatic,
    /// Manual feedback attached to a code line.
    Manual,
    /// Manual feedback not attached to any line.
    #[default]
    ManualUnreferenced,
}

/// Who may see a feedback item.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Always visible to the student.
    #[default]
    Always,
    /// Visible once the due date has passed.
    AfterDueDate,
    /// Never shown to the student.
    Never,
}

/// One feedback record as stored by the platform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default))]
#[builder(doc)]
pub struct FeedbackItem {
    /// Platform id of the item, once stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option))]
    pub id: Option<i64>,

    /// Kind of the item.
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,

    /// Who may see the item.
    #[serde(default)]
    pub visibility: Visibility,

    /// Short title.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option, into))]
    pub text: Option<String>,

    /// Body text; subject to the platform's length limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option, into))]
    pub detail_text: Option<String>,

    /// Line reference for inline items (`file:<path>_line:<line>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option, into))]
    pub reference: Option<String>,

    /// Points carried by the item.
    #[serde(default)]
    pub credits: f64,

    /// Name of the linked test case, for automatic items.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option, into))]
    pub test_case: Option<String>,

    /// Whether the body is stored separately and must be fetched first.
    #[serde(default)]
    pub has_long_text: bool,
}

/// Builds the reference of an inline item for a 0-indexed line.
pub fn line_reference(path: &str, line: u32) -> String {
    format!("file:{path}_line:{line}")
}
