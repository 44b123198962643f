//! Title normalisation for matching external signals to candidates.
//!
//! Upstream aggregates key films and people by free-text titles that differ
//! from ours in case, punctuation and annotations ("Dune (2021)",
//! "Tár [Focus Features]"). Normalising both sides to the same key lets a
//! plain map lookup do the matching.
//!
//! # Rules
//!
//! 1. Lowercase
//! 2. Curly apostrophes (`‘` `’`) become `'`
//! 3. Drop bracketed `[...]` and parenthetical `(...)` annotations
//! 4. Collapse every run of characters that are neither alphanumeric nor an
//!    apostrophe into a single space
//! 5. Trim

use std::sync::LazyLock;

use regex::Regex;

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("static regex"));
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}']+").expect("static regex"));

/// Normalise a title into a lookup key.
///
/// `"The Dish [Spielberg Movie]"` → `"the dish"`,
/// `"Ma Rainey’s Black Bottom"` → `"ma rainey's black bottom"`.
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'");
    let bare = ANNOTATION_RE.replace_all(&lower, " ");
    let collapsed = SEPARATOR_RE.replace_all(&bare, " ");
    collapsed.trim().to_string()
}
