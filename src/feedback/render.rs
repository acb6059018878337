#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;

use super::{
    FeedbackItem, FeedbackType, Visibility,
    codec::serialize_annotations,
    line_reference,
    split::{pack_lines, split_feedback},
};
use crate::{
    annotation::Annotation,
    config::GradingConfig,
    error::{AnnotationError, AssessmentError},
    locale::{Locale, Message},
    location::LocationFormatter,
    merge::merge_annotations,
    points::{EPSILON, format_points},
    scoring::{
        TestResult, calculate_points_for_mistake_type, calculate_points_for_rating_group,
        calculate_total_score, clamp_total,
    },
    settings::RenderOptions,
};

/// Feedback items ready for upload, plus the score they add up to.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAssessment {
    /// Items in upload order.
    pub items: Vec<FeedbackItem>,
    /// Total score, clamped into `[0, max_points]`.
    pub total: f64,
}

/// Renders an assessment into feedback items.
///
/// Items come in this order: automatic test results, the inline items of
/// each annotated line, the global items of each rating group, a
/// placeholder if there is no global item, and the invisible items storing
/// the annotations for a later reload. Inline and global texts are split to
/// fit the item size limit.
///
/// Scores are computed on `annotations` as given; the merged list is only
/// used for display. Fails if an annotation's mistake type is not part of
/// `config`, or if the credits of the items do not add up to the computed
/// total (or either is not a finite number).
pub fn render_feedback(
    config: &GradingConfig,
    annotations: &[Annotation],
    test_results: &[TestResult],
    max_points: f64,
    options: &RenderOptions,
) -> Result<RenderedAssessment, AssessmentError> {
    if let Some(foreign) = annotations
        .iter()
        .find(|annotation| !config.contains(annotation.mistake_type()))
    {
        return Err(AnnotationError::UnknownMistakeType(format!(
            "{:?} of annotation `{}`",
            foreign.mistake_type(),
            foreign.id()
        ))
        .into());
    }

    let locale = options.locale();
    let shown = merge_annotations(annotations, options.merge_limit(), config, locale);

    let mut items = test_results
        .iter()
        .map(test_item)
        .collect::<Vec<_>>();
    items.extend(inline_items(config, &shown, options));

    let global = global_items(config, annotations, &shown, options);
    if global.is_empty() {
        items.push(
            FeedbackItem::builder()
                .feedback_type(FeedbackType::ManualUnreferenced)
                .detail_text(locale.render(&Message::NoFeedback))
                .build(),
        );
    } else {
        items.extend(global);
    }

    items.extend(serialize_annotations(annotations, config, options.max_feedback_length())?);

    let total = calculate_total_score(config, annotations, test_results, max_points);
    let rendered = clamp_total(items.iter().map(|item| item.credits).sum(), max_points);
    if !rendered.is_finite() || !total.is_finite() || (rendered - total).abs() > EPSILON {
        return Err(AssessmentError::ScoreMismatch {
            rendered,
            expected: total,
        });
    }

    tracing::info!(
        "Rendered {} feedback items for {} annotations, total {} of {} points",
        items.len(),
        annotations.len(),
        format_points(total),
        format_points(max_points)
    );

    Ok(RenderedAssessment { items, total })
}

/// Passes an automatic test result through.
fn test_item(result: &TestResult) -> FeedbackItem {
    let mut item = FeedbackItem::builder()
        .feedback_type(FeedbackType::Automatic)
        .text(result.test_name.clone())
        .test_case(result.test_name.clone())
        .credits(result.score)
        .build();
    item.id = result.id;
    item.detail_text = result.detail_text.clone();
    item
}

/// Zero-point items per annotated (file, line), listing every message on
/// that line. A line whose messages do not fit into one item gets several
/// items with the same title and reference.
fn inline_items(
    config: &GradingConfig,
    shown: &[Annotation],
    options: &RenderOptions,
) -> Vec<FeedbackItem> {
    let locale = options.locale();
    let budget = options.body_budget("");
    let mut by_line: BTreeMap<(&str, u32), Vec<&Annotation>> = BTreeMap::new();
    for annotation in shown {
        let location = annotation.location();
        by_line
            .entry((location.file_path(), location.start().line))
            .or_default()
            .push(annotation);
    }

    let mut items = Vec::new();
    for ((path, line), annotations) in by_line {
        let texts = annotations
            .iter()
            .filter_map(|annotation| inline_text(config, annotation, locale))
            .map(|text| truncate_chars(text, budget))
            .collect::<Vec<_>>();
        let title = locale.render(&Message::InlineTitle {
            path,
            line: line + 1,
        });
        for chunk in pack_lines(&texts, budget) {
            items.push(
                FeedbackItem::builder()
                    .feedback_type(FeedbackType::Manual)
                    .text(title.clone())
                    .detail_text(chunk.join("\n"))
                    .reference(line_reference(path, line))
                    .build(),
            );
        }
    }
    items
}

/// Inline text of one annotation: `[Group:Mistake] message (points)`.
fn inline_text(
    config: &GradingConfig,
    annotation: &Annotation,
    locale: Locale,
) -> Option<String> {
    let mistake_type = config.mistake_type(annotation.mistake_type())?;
    let group = config.rating_group(mistake_type.rating_group())?;
    let message = annotation
        .custom_message()
        .unwrap_or_else(|| mistake_type.message(locale));
    let mut text = format!(
        "[{}:{}] {message}",
        config.rating_group_title(group, locale),
        mistake_type.button_text(locale)
    );
    if let Some(score) = annotation.custom_score() {
        text.push_str(&format!(" ({}P)", format_points(score)));
    }
    Some(text)
}

/// Cuts `text` to at most `max_len` characters, ending it with `…` if
/// anything was dropped.
fn truncate_chars(text: String, max_len: usize) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text;
    }
    tracing::warn!("Inline feedback of {len} characters cut to the limit of {max_len}");
    let mut cut = text
        .chars()
        .take(max_len.saturating_sub(1))
        .collect::<String>();
    if max_len > 0 {
        cut.push('…');
    }
    cut
}

/// The global items of every rating group with annotations, in config
/// order. Only the first part of a group carries its points.
fn global_items(
    config: &GradingConfig,
    annotations: &[Annotation],
    shown: &[Annotation],
    options: &RenderOptions,
) -> Vec<FeedbackItem> {
    let locale = options.locale();
    let formatter = LocationFormatter::new();
    let mut items = Vec::new();

    for group in config.rating_groups() {
        let mut lines = Vec::new();
        for &mistake_type_id in group.mistake_types() {
            let Some(mistake_type) = config.mistake_type(mistake_type_id) else {
                continue;
            };
            // Merging may fold every shown annotation of a type into another
            // type's representative; the type still gets its line.
            if !annotations
                .iter()
                .any(|annotation| annotation.mistake_type() == mistake_type_id)
            {
                continue;
            }

            let name = mistake_type.button_text(locale);
            if mistake_type.is_custom() || !mistake_type.should_score() {
                lines.push(locale.render(&Message::PlainMistakeTypeLine { name }));
            } else {
                let points =
                    calculate_points_for_mistake_type(config, mistake_type_id, annotations);
                lines.push(locale.render(&Message::MistakeTypeLine {
                    name,
                    points: points.value(),
                    capped: points.capped(),
                }));
            }

            for annotation in shown
                .iter()
                .filter(|annotation| annotation.mistake_type() == mistake_type_id)
            {
                let location = formatter.format([annotation.location()]);
                lines.push(locale.render(&Message::AnnotationLine {
                    location: &location,
                    message:  annotation.custom_message(),
                    points:   annotation
                        .custom_score()
                        .filter(|_| mistake_type.should_score()),
                }));
            }
        }
        if lines.is_empty() {
            continue;
        }

        let points = calculate_points_for_rating_group(config, group.id(), annotations);
        let title = config.rating_group_title(group, locale);
        let header = locale.render(&Message::GroupHeader {
            name:   &title,
            points: points.value(),
            min:    group.min_penalty(),
            max:    group.max_penalty(),
        });

        let parts = split_feedback(&lines, &header, options.body_budget(&header), locale);
        for (index, part) in parts.into_iter().enumerate() {
            items.push(
                FeedbackItem::builder()
                    .feedback_type(FeedbackType::ManualUnreferenced)
                    .visibility(Visibility::Always)
                    .detail_text(part)
                    .credits(if index == 0 { points.value() } else { 0.0 })
                    .build(),
            );
        }
    }
    items
}
