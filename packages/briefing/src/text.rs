//! Small text-matching helpers shared by the analyzer, the scope check and
//! the web result filter.

/// Case-insensitive term match that respects word boundaries.
///
/// `haystack` must already be lowercase. Multi-word terms match as phrases,
/// so `"war department"` matches `"the us war department said"` while `"rtx"`
/// does not match `"artx"`.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    if term.is_empty() {
        return false;
    }

    let mut start = 0;
    while let Some(pos) = haystack[start..].find(&term) {
        let begin = start + pos;
        let end = begin + term.len();

        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());

        if before_ok && after_ok {
            return true;
        }

        // Advance past the first char of this match
        start = begin
            + haystack[begin..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
    }

    false
}

/// Whether any of `terms` occurs in `haystack` (lowercase) as a whole term.
pub fn contains_any_term(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_term(haystack, t))
}

/// Extract the host of a URL-ish string, lowercased and without `www.`.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.trim_start_matches("www.").to_string())
}
