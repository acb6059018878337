#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{cmp::Ordering, fmt};

use bon::bon;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{MistakeType, MistakeTypeId},
    error::AnnotationError,
};

/// A 0-indexed line with an optional 0-indexed column.
///
/// Positions order by line first, then column; a missing column sorts after
/// every present column on the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineColumn {
    /// 0-indexed line.
    pub line:   u32,
    /// 0-indexed column, if known.
    pub column: Option<u32>,
}

impl LineColumn {
    /// A position covering the whole line.
    pub fn line(line: u32) -> Self {
        Self { line, column: None }
    }

    /// A position at a specific column.
    pub fn at(line: u32, column: u32) -> Self {
        Self {
            line,
            column: Some(column),
        }
    }
}

impl Ord for LineColumn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| match (self.column, other.column) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for LineColumn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A range in a submission file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// Path with `/` separators.
    file_path: String,
    /// Start of the range.
    start:     LineColumn,
    /// End of the range, never before `start`.
    end:       LineColumn,
}

impl Location {
    /// Creates a location; backslashes in `file_path` become `/`.
    pub fn new(
        file_path: impl Into<String>,
        start: LineColumn,
        end: LineColumn,
    ) -> Result<Self, AnnotationError> {
        let file_path = file_path.into().replace('\\', "/");
        if end < start {
            return Err(AnnotationError::InvertedLocation { path: file_path });
        }
        Ok(Self {
            file_path,
            start,
            end,
        })
    }

    /// A location spanning whole lines `start..=end`.
    pub fn lines(
        file_path: impl Into<String>,
        start: u32,
        end: u32,
    ) -> Result<Self, AnnotationError> {
        Self::new(file_path, LineColumn::line(start), LineColumn::line(end))
    }

    /// A location covering a single whole line.
    pub fn line(file_path: impl Into<String>, line: u32) -> Self {
        Self {
            file_path: file_path.into().replace('\\', "/"),
            start:     LineColumn::line(line),
            end:       LineColumn::line(line),
        }
    }

    /// Returns the file path.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Returns the start position.
    pub fn start(&self) -> LineColumn {
        self.start
    }

    /// Returns the end position.
    pub fn end(&self) -> LineColumn {
        self.end
    }
}

impl fmt::Display for Location {
    /// Renders the line part, 1-indexed: `L5` or `L5-7`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "L{}", self.start.line + 1)
        } else {
            write!(f, "L{}-{}", self.start.line + 1, self.end.line + 1)
        }
    }
}

/// Who created an annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationSource {
    /// Produced by an automatic checker.
    Tool,
    /// Added by the grader in the first correction round.
    #[default]
    ManualFirstRound,
    /// Added by the grader in the second correction round.
    ManualSecondRound,
    /// Added while reviewing a finished assessment.
    Review,
}

/// One instance of a mistake type at a code location.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Unique id.
    id:             String,
    /// The mistake type, owned by the grading config.
    mistake_type:   MistakeTypeId,
    /// Where the mistake is.
    location:       Location,
    /// Message replacing or extending the mistake type's message.
    custom_message: Option<String>,
    /// Score of a custom mistake type.
    custom_score:   Option<f64>,
    /// Who created the annotation.
    source:         AnnotationSource,
    /// Grouping tags used when merging for display.
    classifiers:    Vec<String>,
    /// Overrides the display limit of the annotation's classifier group.
    display_limit:  Option<usize>,
}

#[bon]
impl Annotation {
    /// Creates an annotation for `mistake_type`.
    ///
    /// A custom score is required for custom mistake types and rejected for
    /// all others, and must be finite. A random id is generated unless one is
    /// given.
    #[builder(finish_fn = build)]
    pub fn new(
        mistake_type: &MistakeType,
        location: Location,
        #[builder(into)] id: Option<String>,
        #[builder(into)] custom_message: Option<String>,
        custom_score: Option<f64>,
        #[builder(default)] source: AnnotationSource,
        #[builder(default)] classifiers: Vec<String>,
        display_limit: Option<usize>,
    ) -> Result<Self, AnnotationError> {
        match (mistake_type.is_custom(), custom_score) {
            (true, None) => {
                return Err(AnnotationError::MissingCustomScore(
                    mistake_type.short_name().to_string(),
                ));
            }
            (false, Some(_)) => {
                return Err(AnnotationError::UnexpectedCustomScore(
                    mistake_type.short_name().to_string(),
                ));
            }
            (_, Some(score)) if !score.is_finite() => {
                return Err(AnnotationError::NonFiniteScore(score));
            }
            _ => {}
        }

        Ok(Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            mistake_type: mistake_type.id(),
            location,
            custom_message: custom_message.filter(|m| !m.is_empty()),
            custom_score,
            source,
            classifiers,
            display_limit,
        })
    }
}

impl Annotation {
    /// Returns the id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the mistake type handle.
    pub fn mistake_type(&self) -> MistakeTypeId {
        self.mistake_type
    }

    /// Returns the location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the custom message, if any.
    pub fn custom_message(&self) -> Option<&str> {
        self.custom_message.as_deref()
    }

    /// Returns the custom score, if any.
    pub fn custom_score(&self) -> Option<f64> {
        self.custom_score
    }

    /// Returns the source.
    pub fn source(&self) -> AnnotationSource {
        self.source
    }

    /// Returns the classifiers.
    pub fn classifiers(&self) -> &[String] {
        &self.classifiers
    }

    /// Returns the display limit override.
    pub fn display_limit(&self) -> Option<usize> {
        self.display_limit
    }

    /// Returns a copy with a different id and message; used for merged
    /// representatives.
    pub(crate) fn with_id_and_message(&self, id: String, message: String) -> Self {
        Self {
            id,
            custom_message: Some(message),
            ..self.clone()
        }
    }
}
