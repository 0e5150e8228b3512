//! Title matching between noisy export labels and registry titles.
//!
//! Matching is a plain first-hit substring test over normalized strings, in
//! registry order. There is no scoring: a short label such as `It` matches the
//! first registry title that contains `it` anywhere.

use tracing::debug;

use crate::domain::MovieRecord;
use crate::io::registry::Registry;

/// Characters removed by [`normalize_title`].
const STRIPPED_CHARS: [char; 5] = [' ', ':', '(', ')', '*'];

/// Lower-case and strip spaces, colons, parentheses and asterisks.
pub fn normalize_title(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect()
}

/// The part of an export label before the first `:`, trimmed.
///
/// `"Barbie: (United States)"` -> `"Barbie"`; labels without `:` are used whole.
pub fn base_label(source_label: &str) -> &str {
    source_label
        .split_once(':')
        .map_or(source_label, |(head, _)| head)
        .trim()
}

/// Find the first registry record whose normalized title contains the
/// normalized base label.
pub fn match_title<'r>(source_label: &str, registry: &'r Registry) -> Option<&'r MovieRecord> {
    let base = base_label(source_label);
    let needle = normalize_title(base);
    let found = registry
        .iter()
        .find(|movie| normalize_title(&movie.title).contains(&needle));

    match found {
        Some(movie) => debug!(label = source_label, base, title = %movie.title, "matched export label"),
        None => debug!(label = source_label, base, "no registry title matched"),
    }
    found
}
