#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde_json::{Map, Value, json};

use crate::{annotation::Annotation, error::ConfigError, points::Points};

/// Discriminator of [`PenaltyRule::Stacking`] in config JSON.
pub const STACKING_PENALTY: &str = "stackingPenalty";
/// Discriminator of [`PenaltyRule::Threshold`] in config JSON.
pub const THRESHOLD_PENALTY: &str = "thresholdPenalty";
/// Discriminator of [`PenaltyRule::Custom`] in config JSON.
pub const CUSTOM_PENALTY: &str = "customPenalty";

/// How annotations of one mistake type turn into points.
#[derive(Debug, Clone, PartialEq)]
pub enum PenaltyRule {
    /// Every annotation deducts `penalty`, up to `max_uses` times.
    Stacking {
        /// Points deducted per annotation.
        penalty:  f64,
        /// Maximum number of annotations that count.
        max_uses: Option<u32>,
    },
    /// Every `threshold` annotations deduct `penalty`, at most `repetitions`
    /// times.
    Threshold {
        /// Annotations needed per deduction.
        threshold:   u32,
        /// Points deducted per reached threshold.
        penalty:     f64,
        /// Maximum number of deductions.
        repetitions: u32,
    },
    /// Each annotation carries its own score.
    Custom,
}

impl PenaltyRule {
    /// Computes the points for all annotations of one mistake type.
    ///
    /// The caller passes only annotations of the mistake type this rule
    /// belongs to.
    pub fn calculate_points(&self, annotations: &[&Annotation]) -> Points {
        let n = annotations.len() as u64;
        match *self {
            PenaltyRule::Stacking { penalty, max_uses } => {
                let multiplier = max_uses.map_or(n, |max| n.min(u64::from(max)));
                let capped = max_uses.is_some_and(|max| n > u64::from(max));
                Points::new(-(multiplier as f64) * penalty, capped)
            }
            PenaltyRule::Threshold {
                threshold,
                penalty,
                repetitions,
            } => {
                let applied = (n / u64::from(threshold)).min(u64::from(repetitions));
                let capped = n > u64::from(threshold) * u64::from(repetitions);
                Points::new(-(applied as f64) * penalty, capped)
            }
            PenaltyRule::Custom => Points::new(
                annotations
                    .iter()
                    .filter_map(|annotation| annotation.custom_score())
                    .sum(),
                false,
            ),
        }
    }

    /// Returns whether annotations must carry their own score.
    pub fn is_custom(&self) -> bool {
        matches!(self, PenaltyRule::Custom)
    }

    /// Decodes a rule from its config JSON object, switching on `shortName`.
    pub fn from_json(mistake_type: &str, value: &Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or_else(|| ConfigError::InvalidPenaltyRule {
            mistake_type: mistake_type.to_string(),
            reason:       "the penalty rule must be an object".to_string(),
        })?;
        let invalid = |reason: &str| ConfigError::InvalidPenaltyRule {
            mistake_type: mistake_type.to_string(),
            reason:       reason.to_string(),
        };
        let short_name = object
            .get("shortName")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing `shortName`"))?;

        let rule = match short_name {
            STACKING_PENALTY => PenaltyRule::Stacking {
                penalty:  required_f64(object, "penalty")
                    .ok_or_else(|| invalid("missing `penalty`"))?,
                max_uses: optional_u32(mistake_type, object, "maxUses")?,
            },
            THRESHOLD_PENALTY => {
                let threshold = object
                    .get("threshold")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| invalid("missing `threshold`"))?;
                if threshold <= 0 {
                    return Err(invalid("`threshold` must be at least 1"));
                }
                let repetitions = match object.get("repetitions") {
                    None | Some(Value::Null) => 1,
                    Some(value) => value
                        .as_i64()
                        .ok_or_else(|| invalid("`repetitions` must be an integer"))?,
                };
                if repetitions < 1 {
                    return Err(invalid("`repetitions` must be at least 1"));
                }
                PenaltyRule::Threshold {
                    threshold:   u32::try_from(threshold)
                        .map_err(|_| invalid("`threshold` is too large"))?,
                    penalty:     required_f64(object, "penalty")
                        .ok_or_else(|| invalid("missing `penalty`"))?,
                    repetitions: u32::try_from(repetitions)
                        .map_err(|_| invalid("`repetitions` is too large"))?,
                }
            }
            CUSTOM_PENALTY => PenaltyRule::Custom,
            other => {
                return Err(ConfigError::UnknownPenaltyRule {
                    mistake_type: mistake_type.to_string(),
                    rule:         other.to_string(),
                });
            }
        };

        match rule {
            PenaltyRule::Stacking { penalty, .. } | PenaltyRule::Threshold { penalty, .. }
                if penalty < 0.0 || !penalty.is_finite() =>
            {
                Err(invalid("`penalty` must be a non-negative number"))
            }
            rule => Ok(rule),
        }
    }

    /// Encodes the rule back into its config JSON object.
    pub fn to_json(&self) -> Value {
        match self {
            PenaltyRule::Stacking { penalty, max_uses } => json!({
                "shortName": STACKING_PENALTY,
                "penalty": penalty,
                "maxUses": max_uses,
            }),
            PenaltyRule::Threshold {
                threshold,
                penalty,
                repetitions,
            } => json!({
                "shortName": THRESHOLD_PENALTY,
                "threshold": threshold,
                "penalty": penalty,
                "repetitions": repetitions,
            }),
            PenaltyRule::Custom => json!({ "shortName": CUSTOM_PENALTY }),
        }
    }
}

/// Reads a required number field.
fn required_f64(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key).and_then(Value::as_f64)
}

/// Reads an optional non-negative integer field; `null` counts as absent.
fn optional_u32(
    mistake_type: &str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<u32>, ConfigError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidPenaltyRule {
                mistake_type: mistake_type.to_string(),
                reason:       format!("`{key}` must be a non-negative integer"),
            }),
    }
}
