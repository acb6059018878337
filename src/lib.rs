//! # gradekit
//!
//! Scoring and feedback rendering for programming-exercise assessments.
//!
//! Graders (and automatic checkers) attach [`Annotation`]s of configured
//! mistake types to submission code. This crate turns them into a point
//! total bounded by per-rating-group limits, and into size-limited feedback
//! items that can be uploaded to the learning platform and later reloaded.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Annotations and the code locations they point at
pub mod annotation;
/// In-progress assessments owning an annotation list
pub mod assessment;
/// Grading configuration: rating groups, mistake types, penalty rules
pub mod config;
/// Error types
pub mod error;
/// Feedback items and their rendering, splitting and storage
pub mod feedback;
/// Engine texts and config-provided translations
pub mod locale;
/// Compact rendering of many locations
pub mod location;
/// Display-only merging of large annotation sets
pub mod merge;
/// Point values
pub mod points;
/// Point calculation per mistake type, rating group and in total
pub mod scoring;
/// Rendering options and their environment overrides
pub mod settings;

pub use annotation::{Annotation, AnnotationSource, LineColumn, Location};
pub use assessment::Assessment;
pub use config::{
    GradingConfig, MistakeType, MistakeTypeId, PenaltyRule, RatingGroup, RatingGroupId,
};
pub use error::{AnnotationError, AssessmentError, ConfigError, MappingError};
pub use feedback::{FeedbackItem, FeedbackType, RenderedAssessment, Visibility};
pub use locale::{Locale, LocalizedText};
pub use location::LocationFormatter;
pub use merge::merge_annotations;
pub use points::Points;
pub use scoring::TestResult;
pub use settings::RenderOptions;
