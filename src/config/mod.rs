#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grading configuration: rating groups, mistake types and their penalty
//! rules.
//!
//! Rating groups and mistake types reference each other. Both live in flat
//! arenas inside [`GradingConfig`] and point at each other through the
//! [`RatingGroupId`] and [`MistakeTypeId`] handles. Handles remember the
//! config that issued them, so a handle from another config resolves to
//! nothing instead of to an unrelated entry.

/// Penalty rule variants and their point calculation.
pub mod penalty;

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::Deserialize;
use serde_json::Value;

pub use self::penalty::PenaltyRule;
use crate::{
    error::ConfigError,
    locale::{Locale, LocalizedText},
};

/// Source of the tags that tie handles to the config that issued them.
static NEXT_CONFIG_TAG: AtomicU64 = AtomicU64::new(0);

/// Handle of a [`RatingGroup`] inside its [`GradingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingGroupId {
    /// Tag of the issuing config.
    config: u64,
    /// Position in the rating group arena.
    index:  usize,
}

/// Handle of a [`MistakeType`] inside its [`GradingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MistakeTypeId {
    /// Tag of the issuing config.
    config: u64,
    /// Position in the mistake type arena.
    index:  usize,
}

/// A scoring bucket with its own penalty range.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingGroup {
    /// Handle of this group.
    id:            RatingGroupId,
    /// Unique short name from the config.
    short_name:    String,
    /// Name shown to students.
    display_name:  LocalizedText,
    /// Lower bound of the group's points (<= 0).
    min_penalty:   f64,
    /// Upper bound of the group's points (>= 0).
    max_penalty:   f64,
    /// Parent group for subgroups.
    parent:        Option<RatingGroupId>,
    /// Mistake types of this group, in config order.
    mistake_types: Vec<MistakeTypeId>,
}

impl RatingGroup {
    /// Returns the handle of this group.
    pub fn id(&self) -> RatingGroupId {
        self.id
    }

    /// Returns the short name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns the display name in `locale`.
    pub fn display_name(&self, locale: Locale) -> &str {
        self.display_name.translate(locale)
    }

    /// Returns the lower bound of the group's points.
    pub fn min_penalty(&self) -> f64 {
        self.min_penalty
    }

    /// Returns the upper bound of the group's points.
    pub fn max_penalty(&self) -> f64 {
        self.max_penalty
    }

    /// Returns the parent group, if this is a subgroup.
    pub fn parent(&self) -> Option<RatingGroupId> {
        self.parent
    }

    /// Returns the group's mistake types in config order.
    pub fn mistake_types(&self) -> &[MistakeTypeId] {
        &self.mistake_types
    }
}

/// A named category of grading issue.
#[derive(Debug, Clone, PartialEq)]
pub struct MistakeType {
    /// Handle of this mistake type.
    id:           MistakeTypeId,
    /// Unique short name from the config.
    short_name:   String,
    /// How annotations turn into points.
    rule:         PenaltyRule,
    /// The owning rating group.
    rating_group: RatingGroupId,
    /// Message shown for annotations without a custom message.
    message:      LocalizedText,
    /// Text of the grader's button.
    button_text:  LocalizedText,
    /// Whether annotations contribute to the score.
    should_score: bool,
}

impl MistakeType {
    /// Returns the handle of this mistake type.
    pub fn id(&self) -> MistakeTypeId {
        self.id
    }

    /// Returns the short name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns the penalty rule.
    pub fn rule(&self) -> &PenaltyRule {
        &self.rule
    }

    /// Returns the owning rating group.
    pub fn rating_group(&self) -> RatingGroupId {
        self.rating_group
    }

    /// Returns the message in `locale`.
    pub fn message(&self, locale: Locale) -> &str {
        self.message.translate(locale)
    }

    /// Returns the button text in `locale`.
    pub fn button_text(&self, locale: Locale) -> &str {
        self.button_text.translate(locale)
    }

    /// Returns whether annotations of this type are scored.
    pub fn should_score(&self) -> bool {
        self.should_score
    }

    /// Returns whether annotations of this type carry their own score.
    pub fn is_custom(&self) -> bool {
        self.rule.is_custom()
    }
}

/// Resolved grading configuration for one exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct GradingConfig {
    /// Tag carried by every handle of this config; clones share it.
    tag:                       u64,
    /// Name of the config.
    short_name:                String,
    /// Exercises this config may be used for; `None` allows all.
    allowed_exercises:         Option<Vec<i64>>,
    /// Whether custom annotations may award points.
    positive_feedback_allowed: bool,
    /// Rating group arena.
    rating_groups:             Vec<RatingGroup>,
    /// Mistake type arena.
    mistake_types:             Vec<MistakeType>,
    /// Mistake type lookup by short name.
    by_name:                   HashMap<String, MistakeTypeId>,
}

/// Wire form of the config root.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradingConfigDto {
    /// See [`GradingConfig::short_name`].
    #[serde(default)]
    short_name:                String,
    /// See [`GradingConfig::allowed_exercises`].
    #[serde(default)]
    allowed_exercises:         Option<Vec<i64>>,
    /// See [`GradingConfig::positive_feedback_allowed`].
    #[serde(default = "default_true")]
    positive_feedback_allowed: bool,
    /// Rating groups in display order.
    rating_groups:             Vec<RatingGroupDto>,
    /// Mistake types in display order.
    mistake_types:             Vec<MistakeTypeDto>,
}

/// Wire form of a rating group.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingGroupDto {
    /// Unique short name.
    short_name:     String,
    /// Display name; defaults to the short name.
    #[serde(default)]
    display_name:   Option<LocalizedText>,
    /// Lower bound.
    #[serde(default)]
    negative_limit: f64,
    /// Upper bound.
    #[serde(default)]
    positive_limit: f64,
    /// Short name of the parent group.
    #[serde(default)]
    parent:         Option<String>,
}

/// Wire form of a mistake type.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MistakeTypeDto {
    /// Unique short name.
    short_name:   String,
    /// Default message.
    #[serde(default)]
    message:      LocalizedText,
    /// Button text; defaults to the short name.
    #[serde(default)]
    button:       Option<LocalizedText>,
    /// Penalty rule, decoded by [`PenaltyRule::from_json`].
    penalty_rule: Value,
    /// Short name of the owning rating group.
    applies_to:   String,
    /// Whether the type is scored.
    #[serde(default = "default_true")]
    should_score: bool,
}

/// Serde default helper.
fn default_true() -> bool {
    true
}

impl GradingConfig {
    /// Decodes and validates a grading config from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let dto: GradingConfigDto =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_dto(dto)
    }

    /// Builds the arenas: rating groups first, then mistake types pointing
    /// into them.
    fn from_dto(dto: GradingConfigDto) -> Result<Self, ConfigError> {
        let tag = NEXT_CONFIG_TAG.fetch_add(1, Ordering::Relaxed);
        let group_id = |index| RatingGroupId { config: tag, index };
        let mut group_ids: HashMap<String, RatingGroupId> = HashMap::new();
        let mut rating_groups = Vec::with_capacity(dto.rating_groups.len());

        for (index, group) in dto.rating_groups.iter().enumerate() {
            if !(group.negative_limit <= 0.0 && group.positive_limit >= 0.0) {
                return Err(ConfigError::InvalidRange {
                    group: group.short_name.clone(),
                    min:   group.negative_limit,
                    max:   group.positive_limit,
                });
            }
            if group_ids
                .insert(group.short_name.clone(), group_id(index))
                .is_some()
            {
                return Err(ConfigError::DuplicateRatingGroup(group.short_name.clone()));
            }
            rating_groups.push(RatingGroup {
                id:            group_id(index),
                short_name:    group.short_name.clone(),
                display_name:  group
                    .display_name
                    .clone()
                    .unwrap_or_else(|| LocalizedText::Plain(group.short_name.clone())),
                min_penalty:   group.negative_limit,
                max_penalty:   group.positive_limit,
                parent:        None,
                mistake_types: Vec::new(),
            });
        }

        // Parents are resolved once every group has an id. Only one level of
        // nesting is allowed.
        for (index, group) in dto.rating_groups.iter().enumerate() {
            let Some(parent) = &group.parent else {
                continue;
            };
            let invalid = || ConfigError::InvalidParent {
                group:  group.short_name.clone(),
                parent: parent.clone(),
            };
            let parent_id = *group_ids.get(parent).ok_or_else(invalid)?;
            let parent_dto = &dto.rating_groups[parent_id.index];
            if parent_id.index == index || parent_dto.parent.is_some() {
                return Err(invalid());
            }
            rating_groups[index].parent = Some(parent_id);
        }

        let mut mistake_types = Vec::with_capacity(dto.mistake_types.len());
        let mut by_name = HashMap::new();
        for (index, mistake_type) in dto.mistake_types.into_iter().enumerate() {
            let id = MistakeTypeId { config: tag, index };
            let group = *group_ids.get(&mistake_type.applies_to).ok_or_else(|| {
                ConfigError::UnknownRatingGroup {
                    mistake_type: mistake_type.short_name.clone(),
                    group:        mistake_type.applies_to.clone(),
                }
            })?;
            if by_name
                .insert(mistake_type.short_name.clone(), id)
                .is_some()
            {
                return Err(ConfigError::DuplicateMistakeType(mistake_type.short_name));
            }
            let rule =
                PenaltyRule::from_json(&mistake_type.short_name, &mistake_type.penalty_rule)?;
            rating_groups[group.index].mistake_types.push(id);
            mistake_types.push(MistakeType {
                id,
                button_text: mistake_type
                    .button
                    .unwrap_or_else(|| LocalizedText::Plain(mistake_type.short_name.clone())),
                short_name: mistake_type.short_name,
                rule,
                rating_group: group,
                message: mistake_type.message,
                should_score: mistake_type.should_score,
            });
        }

        tracing::debug!(
            "Loaded grading config `{}` with {} rating groups and {} mistake types",
            dto.short_name,
            rating_groups.len(),
            mistake_types.len()
        );

        Ok(Self {
            tag,
            short_name: dto.short_name,
            allowed_exercises: dto.allowed_exercises,
            positive_feedback_allowed: dto.positive_feedback_allowed,
            rating_groups,
            mistake_types,
            by_name,
        })
    }

    /// Returns the config's short name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Returns whether custom annotations may award points.
    pub fn positive_feedback_allowed(&self) -> bool {
        self.positive_feedback_allowed
    }

    /// Fails unless the config may be used for `exercise_id`.
    pub fn check_exercise(&self, exercise_id: i64) -> Result<(), ConfigError> {
        match &self.allowed_exercises {
            Some(allowed) if !allowed.contains(&exercise_id) => {
                Err(ConfigError::ExerciseNotAllowed {
                    config: self.short_name.clone(),
                    exercise_id,
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns all rating groups in config order.
    pub fn rating_groups(&self) -> &[RatingGroup] {
        &self.rating_groups
    }

    /// Returns all mistake types in config order.
    pub fn mistake_types(&self) -> &[MistakeType] {
        &self.mistake_types
    }

    /// Resolves a rating group handle; `None` if another config issued it.
    pub fn rating_group(&self, id: RatingGroupId) -> Option<&RatingGroup> {
        if id.config != self.tag {
            return None;
        }
        self.rating_groups.get(id.index)
    }

    /// Resolves a mistake type handle; `None` if another config issued it.
    pub fn mistake_type(&self, id: MistakeTypeId) -> Option<&MistakeType> {
        if id.config != self.tag {
            return None;
        }
        self.mistake_types.get(id.index)
    }

    /// Looks up a mistake type by its short name.
    pub fn mistake_type_by_name(&self, short_name: &str) -> Option<&MistakeType> {
        self.by_name
            .get(short_name)
            .and_then(|id| self.mistake_type(*id))
    }

    /// Returns whether `id` was handed out by this config (or a clone of it).
    pub fn contains(&self, id: MistakeTypeId) -> bool {
        self.mistake_type(id).is_some()
    }

    /// Title of a rating group, prefixed by its parent's name for subgroups.
    pub fn rating_group_title(&self, group: &RatingGroup, locale: Locale) -> String {
        match group.parent().and_then(|parent| self.rating_group(parent)) {
            Some(parent) => format!(
                "{} > {}",
                parent.display_name(locale),
                group.display_name(locale)
            ),
            None => group.display_name(locale).to_string(),
        }
    }
}
