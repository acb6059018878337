#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::points::format_points;

/// Languages the engine can render feedback in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English.
    #[default]
    En,
    /// German.
    De,
}

impl Locale {
    /// Returns the language tag used as key in localized config strings.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Renders an engine message in this language.
    pub fn render(self, message: &Message<'_>) -> String {
        match (self, message) {
            (Locale::En, Message::OtherProblemsIn { locations }) => {
                format!("Other problems in {locations}.")
            }
            (Locale::De, Message::OtherProblemsIn { locations }) => {
                format!("Weitere Probleme in {locations}.")
            }
            (Locale::En, Message::FeedbackPart { index, total }) => {
                format!(" (feedback {index}/{total})")
            }
            (Locale::De, Message::FeedbackPart { index, total }) => {
                format!(" (Feedback {index}/{total})")
            }
            (_, Message::GroupHeader { name, points, min, max }) => format!(
                "{name} [{}P (Range: {}P -- {}P)]",
                format_points(*points),
                format_points(*min),
                format_points(*max)
            ),
            (Locale::En, Message::MistakeTypeLine { name, points, capped }) => format!(
                "    * {name} [{}P]{}:",
                format_points(*points),
                if *capped { " (capped)" } else { "" }
            ),
            (Locale::De, Message::MistakeTypeLine { name, points, capped }) => format!(
                "    * {name} [{}P]{}:",
                format_points(*points),
                if *capped { " (gekappt)" } else { "" }
            ),
            (_, Message::PlainMistakeTypeLine { name }) => format!("    * {name}:"),
            (_, Message::AnnotationLine { location, message, points }) => {
                let mut line = format!("        * {location}");
                if let Some(message) = message {
                    line.push_str(": ");
                    line.push_str(message);
                }
                if let Some(points) = points {
                    line.push_str(&format!(" ({}P)", format_points(*points)));
                }
                line
            }
            (Locale::En, Message::InlineTitle { path, line }) => {
                format!("File {path} at line {line}")
            }
            (Locale::De, Message::InlineTitle { path, line }) => {
                format!("Datei {path} Zeile {line}")
            }
            (Locale::En, Message::NoFeedback) => "No feedback.".to_string(),
            (Locale::De, Message::NoFeedback) => "Kein Feedback.".to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        // Accept full tags like `de-DE` or `en_US` by their language part.
        match tag.split(['-', '_']).next().unwrap_or_default() {
            "en" => Ok(Locale::En),
            "de" => Ok(Locale::De),
            _ => Err(format!("Unsupported locale `{s}`")),
        }
    }
}

/// Every piece of text the engine itself produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Message<'a> {
    /// Suffix for a merged annotation listing further locations.
    OtherProblemsIn {
        /// Formatted locations of the folded annotations.
        locations: &'a str,
    },
    /// Header suffix distinguishing the parts of a split feedback.
    FeedbackPart {
        /// 1-based part number.
        index: usize,
        /// Number of parts.
        total: usize,
    },
    /// Header of a rating group's global feedback.
    GroupHeader {
        /// Display name of the rating group.
        name:   &'a str,
        /// Clamped points of the group.
        points: f64,
        /// Negative limit.
        min:    f64,
        /// Positive limit.
        max:    f64,
    },
    /// Bullet for a predefined mistake type.
    MistakeTypeLine {
        /// Button text of the mistake type.
        name:   &'a str,
        /// Points of the mistake type.
        points: f64,
        /// Whether the rule limited the points.
        capped: bool,
    },
    /// Bullet for a custom or report-only mistake type, without points.
    PlainMistakeTypeLine {
        /// Button text of the mistake type.
        name: &'a str,
    },
    /// Sub-bullet for one annotation.
    AnnotationLine {
        /// Formatted location.
        location: &'a str,
        /// Custom message, if any.
        message:  Option<&'a str>,
        /// Custom score, if any.
        points:   Option<f64>,
    },
    /// Title of an inline feedback item.
    InlineTitle {
        /// File path.
        path: &'a str,
        /// 1-based line number.
        line: u32,
    },
    /// Text of the placeholder item used when there is nothing else.
    NoFeedback,
}

/// A config-provided string with optional per-language translations.
///
/// Decodes from either a plain JSON string or an object mapping language
/// tags to texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    /// The same text for every language.
    Plain(String),
    /// Texts keyed by language tag.
    Translated(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Returns the text for `locale`.
    ///
    /// Falls back to English, then to the first available translation.
    pub fn translate(&self, locale: Locale) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Translated(map) => map
                .get(locale.tag())
                .or_else(|| map.get(Locale::En.tag()))
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}
