#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{FeedbackItem, FeedbackType, Visibility};
use crate::{
    annotation::{Annotation, AnnotationSource, LineColumn, Location},
    config::GradingConfig,
    error::MappingError,
};

/// Title marking the invisible items that carry serialized annotations.
pub const CLIENT_DATA_TEXT: &str = "CLIENT_DATA";

/// Stored form of one annotation, with short keys to save space.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct AnnotationDto {
    /// Annotation id.
    #[serde(rename = "i")]
    id:             String,
    /// Short name of the mistake type.
    #[serde(rename = "t")]
    mistake_type:   String,
    /// File path.
    #[serde(rename = "f")]
    file_path:      String,
    /// Start line.
    #[serde(rename = "sl")]
    start_line:     u32,
    /// Start column.
    #[serde(rename = "sc", default, skip_serializing_if = "Option::is_none")]
    start_column:   Option<u32>,
    /// End line.
    #[serde(rename = "el")]
    end_line:       u32,
    /// End column.
    #[serde(rename = "ec", default, skip_serializing_if = "Option::is_none")]
    end_column:     Option<u32>,
    /// Custom message.
    #[serde(rename = "m", default, skip_serializing_if = "Option::is_none")]
    custom_message: Option<String>,
    /// Custom score.
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    custom_score:   Option<f64>,
    /// Source of the annotation.
    #[serde(rename = "o", default)]
    source:         AnnotationSource,
    /// Classifiers.
    #[serde(rename = "c", default, skip_serializing_if = "Vec::is_empty")]
    classifiers:    Vec<String>,
    /// Display limit override.
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    display_limit:  Option<usize>,
}

impl AnnotationDto {
    /// Captures an annotation, naming its mistake type by short name.
    fn from_annotation(
        annotation: &Annotation,
        config: &GradingConfig,
    ) -> Result<Self, MappingError> {
        let mistake_type = config
            .mistake_type(annotation.mistake_type())
            .ok_or_else(|| MappingError::MismatchedGradingConfig {
                annotation:   annotation.id().to_string(),
                mistake_type: format!("{:?}", annotation.mistake_type()),
            })?;
        let location = annotation.location();
        Ok(Self {
            id:             annotation.id().to_string(),
            mistake_type:   mistake_type.short_name().to_string(),
            file_path:      location.file_path().to_string(),
            start_line:     location.start().line,
            start_column:   location.start().column,
            end_line:       location.end().line,
            end_column:     location.end().column,
            custom_message: annotation.custom_message().map(str::to_string),
            custom_score:   annotation.custom_score(),
            source:         annotation.source(),
            classifiers:    annotation.classifiers().to_vec(),
            display_limit:  annotation.display_limit(),
        })
    }

    /// Rebuilds the annotation against the current config.
    fn into_annotation(self, config: &GradingConfig) -> Result<Annotation, MappingError> {
        let mistake_type = config
            .mistake_type_by_name(&self.mistake_type)
            .ok_or_else(|| MappingError::MismatchedGradingConfig {
                annotation:   self.id.clone(),
                mistake_type: self.mistake_type.clone(),
            })?;
        let location = Location::new(
            self.file_path,
            LineColumn {
                line:   self.start_line,
                column: self.start_column,
            },
            LineColumn {
                line:   self.end_line,
                column: self.end_column,
            },
        )
        .map_err(|e| MappingError::Corrupt(e.to_string()))?;

        Annotation::builder()
            .mistake_type(mistake_type)
            .location(location)
            .id(self.id)
            .maybe_custom_message(self.custom_message)
            .maybe_custom_score(self.custom_score)
            .source(self.source)
            .classifiers(self.classifiers)
            .maybe_display_limit(self.display_limit)
            .build()
            .map_err(|e| MappingError::Corrupt(e.to_string()))
    }
}

/// Stores `annotations` in as few invisible feedback items as possible,
/// each payload at most `max_len` characters.
///
/// A payload that is too long is split in half, recursively; splitting
/// happens between annotations only. Nothing is emitted for an empty list.
pub fn serialize_annotations(
    annotations: &[Annotation],
    config: &GradingConfig,
    max_len: usize,
) -> Result<Vec<FeedbackItem>, MappingError> {
    let dtos = annotations
        .iter()
        .map(|annotation| AnnotationDto::from_annotation(annotation, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut payloads = Vec::new();
    if !dtos.is_empty() {
        split_payloads(&dtos, max_len, &mut payloads)?;
    }
    tracing::debug!(
        "Stored {} annotations in {} client data items",
        annotations.len(),
        payloads.len()
    );

    Ok(payloads
        .into_iter()
        .map(|payload| {
            FeedbackItem::builder()
                .feedback_type(FeedbackType::ManualUnreferenced)
                .visibility(Visibility::Never)
                .text(CLIENT_DATA_TEXT)
                .detail_text(payload)
                .build()
        })
        .collect())
}

/// Serializes `dtos`, halving until every payload fits.
fn split_payloads(
    dtos: &[AnnotationDto],
    max_len: usize,
    payloads: &mut Vec<String>,
) -> Result<(), MappingError> {
    let payload = serde_json::to_string(dtos).map_err(|e| MappingError::Corrupt(e.to_string()))?;
    let size = payload.chars().count();
    if size <= max_len {
        payloads.push(payload);
        return Ok(());
    }

    match dtos {
        [single] => Err(MappingError::AnnotationTooLarge {
            annotation: single.id.clone(),
            size,
            limit: max_len,
        }),
        _ => {
            let (left, right) = dtos.split_at(dtos.len() / 2);
            split_payloads(left, max_len, payloads)?;
            split_payloads(right, max_len, payloads)
        }
    }
}

/// Restores the annotations stored in `items`, in storage order.
///
/// Items other than client data items are ignored. Unknown mistake types
/// fail with [`MappingError::MismatchedGradingConfig`] instead of being
/// dropped.
pub fn deserialize_annotations(
    items: &[FeedbackItem],
    config: &GradingConfig,
) -> Result<Vec<Annotation>, MappingError> {
    let mut annotations = Vec::new();
    for item in items
        .iter()
        .filter(|item| item.text.as_deref() == Some(CLIENT_DATA_TEXT))
    {
        let payload = item.detail_text.as_deref().ok_or_else(|| {
            MappingError::Corrupt("client data item without payload".to_string())
        })?;
        let dtos: Vec<AnnotationDto> =
            serde_json::from_str(payload).map_err(|e| MappingError::Corrupt(e.to_string()))?;
        for dto in dtos {
            annotations.push(dto.into_annotation(config)?);
        }
    }
    Ok(annotations)
}
