#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use thiserror::Error;

/// Problems found while decoding or validating a grading configuration.
///
/// These are fatal: a grading session cannot start with a broken config.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The JSON text could not be decoded.
    #[error("Could not parse grading config: {0}")]
    Parse(String),
    /// A rating group's range does not contain zero.
    #[error(
        "Rating group `{group}` has an invalid range [{min}, {max}]: the negative limit must be \
         <= 0 and the positive limit >= 0."
    )]
    InvalidRange {
        /// Short name of the offending rating group.
        group: String,
        /// Configured negative limit.
        min:   f64,
        /// Configured positive limit.
        max:   f64,
    },
    /// Two rating groups share a short name.
    #[error("Duplicate rating group `{0}`.")]
    DuplicateRatingGroup(String),
    /// Two mistake types share a short name.
    #[error("Duplicate mistake type `{0}`.")]
    DuplicateMistakeType(String),
    /// A mistake type applies to a rating group that does not exist.
    #[error("Mistake type `{mistake_type}` applies to unknown rating group `{group}`.")]
    UnknownRatingGroup {
        /// Short name of the mistake type.
        mistake_type: String,
        /// The referenced rating group.
        group:        String,
    },
    /// A subgroup names a parent that is missing, itself, or another subgroup.
    #[error("Rating group `{group}` references invalid parent group `{parent}`.")]
    InvalidParent {
        /// Short name of the subgroup.
        group:  String,
        /// The referenced parent.
        parent: String,
    },
    /// A penalty rule discriminator is not known.
    #[error("Mistake type `{mistake_type}` uses unknown penalty rule `{rule}`.")]
    UnknownPenaltyRule {
        /// Short name of the mistake type.
        mistake_type: String,
        /// The unknown discriminator.
        rule:         String,
    },
    /// A penalty rule has out-of-range parameters.
    #[error("Mistake type `{mistake_type}` has an invalid penalty rule: {reason}")]
    InvalidPenaltyRule {
        /// Short name of the mistake type.
        mistake_type: String,
        /// What is wrong with the rule.
        reason:       String,
    },
    /// The config is not meant for the exercise being assessed.
    #[error("Grading config `{config}` is not valid for exercise {exercise_id}.")]
    ExerciseNotAllowed {
        /// Short name of the config.
        config:      String,
        /// The exercise that was requested.
        exercise_id: i64,
    },
}

/// Problems converting annotations to and from their stored form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// A stored payload could not be decoded.
    #[error("Stored annotation data is corrupt: {0}")]
    Corrupt(String),
    /// A stored annotation names a mistake type the current config lacks.
    #[error(
        "Stored annotation `{annotation}` uses mistake type `{mistake_type}`, which is not part \
         of the current grading config."
    )]
    MismatchedGradingConfig {
        /// Id of the stored annotation.
        annotation:   String,
        /// The unresolvable mistake type short name.
        mistake_type: String,
    },
    /// One annotation alone does not fit into a feedback item.
    #[error(
        "Annotation `{annotation}` needs {size} characters when serialized, which exceeds the \
         limit of {limit}."
    )]
    AnnotationTooLarge {
        /// Id of the annotation.
        annotation: String,
        /// Serialized size in characters.
        size:       usize,
        /// The per-item limit.
        limit:      usize,
    },
}

/// Invalid annotation construction or grader actions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotationError {
    /// A custom mistake type was used without a score.
    #[error("Mistake type `{0}` is custom and requires a custom score.")]
    MissingCustomScore(String),
    /// A predefined mistake type was given a score.
    #[error("Mistake type `{0}` is not custom and must not carry a custom score.")]
    UnexpectedCustomScore(String),
    /// A custom score is NaN or infinite.
    #[error("Custom scores must be finite numbers (got {0}).")]
    NonFiniteScore(f64),
    /// Positive points were given although the config forbids them.
    #[error("Positive custom scores are not allowed by this grading config (got {0}).")]
    PositiveScoreNotAllowed(f64),
    /// The location ends before it starts.
    #[error("Location in `{path}` ends before it starts.")]
    InvertedLocation {
        /// File the location refers to.
        path: String,
    },
    /// No annotation with the given id exists.
    #[error("No annotation with id `{0}`.")]
    NotFound(String),
    /// A mistake type handle does not belong to the config.
    #[error("Unknown mistake type `{0}`.")]
    UnknownMistakeType(String),
}

/// Top-level error for assessment operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssessmentError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`MappingError`].
    #[error(transparent)]
    Mapping(#[from] MappingError),
    /// See [`AnnotationError`].
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    /// The rendered feedback does not add up to the computed score.
    #[error(
        "Internal error: rendered feedback sums to {rendered} points, but the computed total is \
         {expected}."
    )]
    ScoreMismatch {
        /// Clamped sum of the rendered feedback credits.
        rendered: f64,
        /// The computed total.
        expected: f64,
    },
}
