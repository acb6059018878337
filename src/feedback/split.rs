#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::locale::{Locale, Message};

/// Packs `lines` into as few texts as possible, each body at most `max_len`
/// characters.
///
/// Lines are never split; a line longer than `max_len` gets a body of its
/// own. With a single part the result is `header\nbody`. With several parts
/// every header gets a `(feedback i/n)` suffix so students can tell them
/// apart.
pub fn split_feedback<S: AsRef<str>>(
    lines: &[S],
    header: &str,
    max_len: usize,
    locale: Locale,
) -> Vec<String> {
    let mut chunks = pack_lines(lines, max_len);
    if chunks.is_empty() {
        chunks.push(Vec::new());
    }

    let total = chunks.len();
    if total > 1 {
        tracing::debug!("Split feedback `{header}` into {total} parts");
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut text = header.to_string();
            if total > 1 {
                text.push_str(&locale.render(&Message::FeedbackPart {
                    index: index + 1,
                    total,
                }));
            }
            if !chunk.is_empty() {
                text.push('\n');
                text.push_str(&chunk.join("\n"));
            }
            text
        })
        .collect()
}

/// Greedily groups `lines` so that each group, joined by newlines, is at
/// most `max_len` characters. A longer line forms a group of its own.
pub(crate) fn pack_lines<S: AsRef<str>>(lines: &[S], max_len: usize) -> Vec<Vec<&str>> {
    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for line in lines {
        let line = line.as_ref();
        let line_len = line.chars().count();
        if line_len > max_len {
            tracing::warn!(
                "Feedback line of {line_len} characters exceeds the limit of {max_len} and is \
                 emitted whole"
            );
        }

        let separator = usize::from(!current.is_empty());
        if !current.is_empty() && current_len + separator + line_len > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += usize::from(!current.is_empty()) + line_len;
        current.push(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
