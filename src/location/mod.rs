#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Compact rendering of many file locations, e.g.
//! `src/(Main:(L3, L10-12), util/Io:L7)`.

/// The path tree the formatter renders.
mod segment;

use std::fmt;

use itertools::Itertools;

use self::segment::PathSegment;
use crate::annotation::Location;

/// Predicate deciding whether a shared path prefix may be left out.
type PrefixPredicate<'a> = Box<dyn Fn(&str) -> bool + 'a>;

/// Formats a set of locations as a nested path expression.
///
/// Options compose freely; the plain formatter renders full file names with
/// one entry per location.
#[derive(Default)]
pub struct LocationFormatter<'a> {
    /// Drop file extensions in the output.
    remove_extension: bool,
    /// Join overlapping and adjacent line ranges of a file.
    merge_lines:      bool,
    /// Approves the elision of a shared prefix, given the prefix path.
    shared_prefix:    Option<PrefixPredicate<'a>>,
}

impl<'a> LocationFormatter<'a> {
    /// Creates a formatter with all options disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops file extensions (`Main.java` becomes `Main`).
    pub fn remove_extension(mut self, enabled: bool) -> Self {
        self.remove_extension = enabled;
        self
    }

    /// Joins overlapping and adjacent line ranges within a file.
    pub fn merge_lines(mut self, enabled: bool) -> Self {
        self.merge_lines = enabled;
        self
    }

    /// Leaves out the path prefix shared by all locations, one component at
    /// a time, as long as `predicate` approves the prefix (e.g. `src`, then
    /// `src/edu`). If a single file remains and the predicate approves its
    /// full path, the file name is left out as well.
    pub fn remove_shared_prefix<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + 'a,
    {
        self.shared_prefix = Some(Box::new(predicate));
        self
    }

    /// Renders `locations`. Returns an empty string for no locations.
    pub fn format<'l>(&self, locations: impl IntoIterator<Item = &'l Location>) -> String {
        let mut forest = PathSegment::forest(locations);

        if let Some(predicate) = &self.shared_prefix {
            let mut prefix = String::new();
            loop {
                let [PathSegment::Folder { name, children }] = forest.as_mut_slice() else {
                    break;
                };
                let candidate = format!("{prefix}{name}");
                if !predicate(&candidate) {
                    break;
                }
                prefix = format!("{candidate}/");
                forest = std::mem::take(children);
            }

            if let [PathSegment::File { name, locations }] = forest.as_slice()
                && predicate(&format!("{prefix}{name}"))
            {
                return self.line_ranges(locations.iter()).join(", ");
            }
        }

        forest
            .iter()
            .map(|segment| self.render(segment))
            .join(", ")
    }

    /// Renders one segment and everything below it.
    fn render(&self, segment: &PathSegment) -> String {
        match segment {
            PathSegment::Folder { name, children } => match children.as_slice() {
                [child] => format!("{name}/{}", self.render(child)),
                children => format!(
                    "{name}/({})",
                    children.iter().map(|child| self.render(child)).join(", ")
                ),
            },
            PathSegment::File { name, locations } => {
                let name = if self.remove_extension {
                    strip_extension(name)
                } else {
                    name.as_str()
                };
                match self.line_ranges(locations.iter()).as_slice() {
                    [single] => format!("{name}:{single}"),
                    ranges => format!("{name}:({})", ranges.join(", ")),
                }
            }
        }
    }

    /// Renders the line ranges of one file, merged if enabled.
    fn line_ranges<'l>(&self, locations: impl Iterator<Item = &'l Location>) -> Vec<String> {
        let ranges = locations.map(|location| LineRange {
            start: location.start().line,
            end:   location.end().line,
        });

        if !self.merge_lines {
            return ranges.map(|range| range.to_string()).dedup().collect();
        }

        ranges
            .sorted()
            .coalesce(|current, next| {
                if next.start <= current.end.saturating_add(1) {
                    Ok(LineRange {
                        start: current.start,
                        end:   current.end.max(next.end),
                    })
                } else {
                    Err((current, next))
                }
            })
            .map(|range| range.to_string())
            .collect()
    }
}

/// Inclusive, 0-indexed line span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct LineRange {
    /// First line.
    start: u32,
    /// Last line.
    end:   u32,
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "L{}", self.start + 1)
        } else {
            write!(f, "L{}-{}", self.start + 1, self.end + 1)
        }
    }
}

/// Removes the last extension of a file name, keeping dot files intact.
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
