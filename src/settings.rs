#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::str::FromStr;

use crate::locale::Locale;

/// Platform limit for the text of a single feedback item.
pub const MAX_FEEDBACK_LENGTH: usize = 5000;

/// Room left free below [`MAX_FEEDBACK_LENGTH`] for part suffixes and the
/// like.
pub const FEEDBACK_SAFETY_MARGIN: usize = 50;

/// Default number of annotations shown per classifier group.
pub const DEFAULT_MERGE_LIMIT: usize = 10;

/// Knobs for rendering an assessment into feedback items.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Maximum length of one feedback item's text.
    max_feedback_length: usize,
    /// Characters kept free below the maximum length.
    safety_margin:       usize,
    /// Annotations shown per classifier group; `None` shows all.
    merge_limit:         Option<usize>,
    /// Language of the rendered text.
    locale:              Locale,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_feedback_length: MAX_FEEDBACK_LENGTH,
            safety_margin:       FEEDBACK_SAFETY_MARGIN,
            merge_limit:         Some(DEFAULT_MERGE_LIMIT),
            locale:              Locale::default(),
        }
    }
}

impl RenderOptions {
    /// Reads options from the environment, using defaults for anything unset
    /// or unparsable.
    ///
    /// * `GRADEKIT_MAX_FEEDBACK_LENGTH`
    /// * `GRADEKIT_SAFETY_MARGIN`
    /// * `GRADEKIT_MERGE_LIMIT` (`-1` shows all annotations)
    /// * `GRADEKIT_LOCALE` (`en`, `de`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let merge_limit = match std::env::var("GRADEKIT_MERGE_LIMIT").ok().as_deref().map(str::trim)
        {
            Some("-1") => None,
            Some(value) => value.parse::<usize>().ok().or(defaults.merge_limit),
            None => defaults.merge_limit,
        };

        Self {
            max_feedback_length: read_env(
                "GRADEKIT_MAX_FEEDBACK_LENGTH",
                defaults.max_feedback_length,
            ),
            safety_margin: read_env("GRADEKIT_SAFETY_MARGIN", defaults.safety_margin),
            merge_limit,
            locale: read_env("GRADEKIT_LOCALE", defaults.locale),
        }
    }

    /// Returns a copy with a different item length limit.
    pub fn with_max_feedback_length(mut self, max_feedback_length: usize) -> Self {
        self.max_feedback_length = max_feedback_length;
        self
    }

    /// Returns a copy with a different safety margin.
    pub fn with_safety_margin(mut self, safety_margin: usize) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    /// Returns a copy with a different merge limit; `None` shows all
    /// annotations.
    pub fn with_merge_limit(mut self, merge_limit: Option<usize>) -> Self {
        self.merge_limit = merge_limit;
        self
    }

    /// Returns a copy rendering in `locale`.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Returns the maximum length of one feedback item's text.
    pub fn max_feedback_length(&self) -> usize {
        self.max_feedback_length
    }

    /// Returns the characters kept free below the maximum length.
    pub fn safety_margin(&self) -> usize {
        self.safety_margin
    }

    /// Returns the per-group display limit.
    pub fn merge_limit(&self) -> Option<usize> {
        self.merge_limit
    }

    /// Returns the locale.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Budget for the body of a feedback item with the given header.
    pub fn body_budget(&self, header: &str) -> usize {
        self.max_feedback_length
            .saturating_sub(self.safety_margin)
            .saturating_sub(header.chars().count())
    }
}

/// Reads and parses an environment variable, falling back to `default`.
fn read_env<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}
