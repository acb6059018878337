#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Display-only reduction of large annotation sets.
//!
//! Merging never changes the score: scoring always runs on the unmerged
//! list, and a merged representative keeps only the score of the annotation
//! it was copied from.

use std::{collections::HashMap, hash::Hash};

use crate::{
    annotation::Annotation,
    config::GradingConfig,
    locale::{Locale, Message},
    location::LocationFormatter,
};

/// What puts annotations into the same merge group.
#[derive(PartialEq, Eq, Hash)]
enum GroupKey {
    /// All annotations sharing a first classifier.
    Classifier(String),
    /// An unclassified annotation, alone in its group.
    Alone(String),
}

/// Limits how many annotations of each classifier group are shown.
///
/// Annotations are grouped by their first classifier (unclassified
/// annotations stand alone). A group larger than its limit keeps its first
/// annotations and folds the rest into one representative whose message
/// lists the other locations. `upper_limit` of `None` disables merging.
///
/// Merging an already merged list returns it unchanged.
pub fn merge_annotations(
    annotations: &[Annotation],
    upper_limit: Option<usize>,
    config: &GradingConfig,
    locale: Locale,
) -> Vec<Annotation> {
    let Some(upper_limit) = upper_limit else {
        return annotations.to_vec();
    };

    let groups = group_in_order(annotations.iter(), |annotation| {
        match annotation.classifiers().first() {
            Some(classifier) => GroupKey::Classifier(classifier.clone()),
            None => GroupKey::Alone(annotation.id().to_string()),
        }
    });

    let mut result = Vec::with_capacity(annotations.len());
    for group in groups {
        let target = group
            .iter()
            .filter_map(|annotation| annotation.display_limit())
            .min()
            .map_or(upper_limit, |limit| limit.min(upper_limit))
            .max(1);

        if group.len() <= target {
            result.extend(group.into_iter().cloned());
            continue;
        }

        // Annotations without further classifiers share one partition.
        let partitions = group_in_order(group.iter().copied(), |annotation| {
            annotation
                .classifiers()
                .get(1..)
                .unwrap_or_default()
                .to_vec()
        });

        if partitions.len() > target {
            // Not enough room to show every partition; treat the group as one.
            tracing::debug!(
                "Merging {} annotations in {} partitions down to {target}",
                group.len(),
                partitions.len()
            );
            result.extend(fold(&group, target, config, locale));
            continue;
        }

        let sizes = partitions.iter().map(Vec::len).collect::<Vec<_>>();
        let shares = distribute(&sizes, target);
        tracing::debug!(
            "Merging {} annotations down to {target} with partition shares {shares:?}",
            group.len()
        );
        for (partition, share) in partitions.iter().zip(shares) {
            if partition.len() <= share {
                result.extend(partition.iter().map(|annotation| (*annotation).clone()));
            } else {
                result.extend(fold(partition, share, config, locale));
            }
        }
    }
    result
}

/// Keeps the first `share - 1` annotations and folds the rest into a new
/// representative, appended last.
fn fold(
    annotations: &[&Annotation],
    share: usize,
    config: &GradingConfig,
    locale: Locale,
) -> Vec<Annotation> {
    let keep = share.saturating_sub(1);
    let (kept, remainder) = annotations.split_at(keep.min(annotations.len()));

    let mut result = kept
        .iter()
        .map(|annotation| (*annotation).clone())
        .collect::<Vec<_>>();

    let representative_index = remainder
        .iter()
        .position(|annotation| annotation.custom_message().is_some_and(|m| !m.is_empty()))
        .unwrap_or(0);
    let Some(representative) = remainder.get(representative_index) else {
        return result;
    };
    let others = remainder
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != representative_index)
        .map(|(_, annotation)| annotation.location())
        .collect::<Vec<_>>();

    let own_path = representative.location().file_path();
    let locations = LocationFormatter::new()
        .remove_extension(true)
        .merge_lines(true)
        .remove_shared_prefix(|prefix: &str| {
            own_path == prefix
                || own_path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .format(others);

    let mut message = representative
        .custom_message()
        .or_else(|| {
            config
                .mistake_type(representative.mistake_type())
                .map(|m| m.message(locale))
        })
        .unwrap_or_default()
        .trim_end()
        .to_string();
    if !message.ends_with('.') {
        message.push('.');
    }
    message.push(' ');
    message.push_str(&locale.render(&Message::OtherProblemsIn {
        locations: &locations,
    }));

    result.push(
        representative.with_id_and_message(format!("{}-merged", representative.id()), message),
    );
    result
}

/// Splits `share` over partitions of the given sizes.
///
/// Every partition receives at least one slot if `share >= sizes.len()`.
/// Slots a small partition cannot use go to the larger ones, so the shares
/// add up to `min(share, sum(sizes))`.
fn distribute(sizes: &[usize], share: usize) -> Vec<usize> {
    let mut shares = vec![0; sizes.len()];
    let mut remaining = share;
    let mut open = (0..sizes.len()).collect::<Vec<_>>();

    while remaining > 0 && !open.is_empty() {
        let per_partition = (remaining / open.len()).max(1);
        let mut still_open = Vec::new();
        for index in open {
            let give = per_partition
                .min(sizes[index] - shares[index])
                .min(remaining);
            shares[index] += give;
            remaining -= give;
            if shares[index] < sizes[index] {
                still_open.push(index);
            }
        }
        open = still_open;
    }
    shares
}

/// Groups items by key, keeping first-seen group order and item order.
fn group_in_order<'a, K, I, F>(items: I, key: F) -> Vec<Vec<&'a Annotation>>
where
    K: Eq + Hash,
    I: Iterator<Item = &'a Annotation>,
    F: Fn(&Annotation) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Annotation>> = Vec::new();
    for item in items {
        let slot = *index.entry(key(item)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribute_fills_up_to_the_share() {
        assert_eq!(distribute(&[10, 10], 5), vec![3, 2]);
        assert_eq!(distribute(&[1, 10, 10], 6), vec![1, 3, 2]);
        assert_eq!(distribute(&[2, 2], 10), vec![2, 2]);
        assert_eq!(distribute(&[4], 3), vec![3]);
    }
}
