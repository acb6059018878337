#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::{
    annotation::Annotation,
    config::{GradingConfig, MistakeTypeId, RatingGroupId},
    locale::Locale,
    points::{Points, format_points},
};

/// Outcome of one automatic test, passed through to the feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Platform id of the test case, if known.
    pub id:          Option<i64>,
    /// Name of the test.
    pub test_name:   String,
    /// Points awarded by the test.
    pub score:       f64,
    /// Output shown to the student.
    pub detail_text: Option<String>,
}

/// Points of one mistake type over all annotations of that type.
///
/// Annotations of other mistake types in `annotations` are ignored. A
/// handle that `config` did not issue scores zero.
pub fn calculate_points_for_mistake_type(
    config: &GradingConfig,
    mistake_type: MistakeTypeId,
    annotations: &[Annotation],
) -> Points {
    let Some(rule) = config.mistake_type(mistake_type).map(|m| m.rule()) else {
        tracing::warn!("Mistake type {mistake_type:?} is not part of this grading config");
        return Points::zero();
    };
    let matching = annotations
        .iter()
        .filter(|annotation| annotation.mistake_type() == mistake_type)
        .collect_vec();
    rule.calculate_points(&matching)
}

/// Points of one rating group, clamped into the group's range.
///
/// Report-only mistake types are skipped, and so are annotations whose
/// mistake type `config` did not issue.
pub fn calculate_points_for_rating_group(
    config: &GradingConfig,
    group: RatingGroupId,
    annotations: &[Annotation],
) -> Points {
    let Some(group) = config.rating_group(group) else {
        tracing::warn!("Rating group {group:?} is not part of this grading config");
        return Points::zero();
    };
    let by_type = annotations
        .iter()
        .filter_map(|annotation| {
            config
                .mistake_type(annotation.mistake_type())
                .filter(|m| m.rating_group() == group.id() && m.should_score())
                .map(|m| (m, annotation))
        })
        .into_group_map_by(|(mistake_type, _)| mistake_type.id());

    let sum: f64 = by_type
        .into_iter()
        .sorted_by_key(|(id, _)| *id)
        .map(|(id, entries)| {
            let annotations = entries.into_iter().map(|(_, a)| a).collect_vec();
            config
                .mistake_type(id)
                .map_or(0.0, |m| m.rule().calculate_points(&annotations).value())
        })
        .sum();

    Points::new(sum, false).clamp(group.min_penalty(), group.max_penalty())
}

/// Total score: all rating groups plus automatic tests, clamped into
/// `[0, max_points]`.
pub fn calculate_total_score(
    config: &GradingConfig,
    annotations: &[Annotation],
    test_results: &[TestResult],
    max_points: f64,
) -> f64 {
    let groups: f64 = config
        .rating_groups()
        .iter()
        .map(|group| calculate_points_for_rating_group(config, group.id(), annotations).value())
        .sum();
    let tests: f64 = test_results.iter().map(|result| result.score).sum();
    clamp_total(groups + tests, max_points)
}

/// Clamps a raw total into `[0, max_points]`.
pub fn clamp_total(raw: f64, max_points: f64) -> f64 {
    let total = Points::new(raw, false).clamp(0.0, max_points.max(0.0));
    if total.capped() {
        tracing::warn!(
            "Total of {} points clamped to {} (maximum {})",
            format_points(raw),
            format_points(total.value()),
            format_points(max_points)
        );
    }
    total.value()
}

/// One row of the points overview.
#[derive(Tabled, Clone, Debug)]
pub struct RatingGroupSummary {
    /// Rating group title.
    #[tabled(rename = "Rating group")]
    pub name:        String,
    /// Clamped points.
    #[tabled(rename = "Points")]
    pub points:      String,
    /// Allowed range.
    #[tabled(rename = "Range")]
    pub range:       String,
    /// Number of annotations in the group.
    #[tabled(rename = "Annotations")]
    pub annotations: usize,
}

/// Builds the per-rating-group overview rows, in config order.
pub fn summarize(
    config: &GradingConfig,
    annotations: &[Annotation],
    locale: Locale,
) -> Vec<RatingGroupSummary> {
    config
        .rating_groups()
        .iter()
        .map(|group| {
            let points = calculate_points_for_rating_group(config, group.id(), annotations);
            RatingGroupSummary {
                name:        config.rating_group_title(group, locale),
                points:      points.to_string(),
                range:       format!(
                    "[{}, {}]",
                    format_points(group.min_penalty()),
                    format_points(group.max_penalty())
                ),
                annotations: annotations
                    .iter()
                    .filter(|a| {
                        config
                            .mistake_type(a.mistake_type())
                            .is_some_and(|m| m.rating_group() == group.id())
                    })
                    .count(),
            }
        })
        .collect()
}

/// Renders the overview rows as a text table.
pub fn summary_table(rows: &[RatingGroupSummary]) -> String {
    Table::new(rows)
        .with(Style::modern())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
        .to_string()
}
