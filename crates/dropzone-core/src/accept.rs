//! Acceptance filter: matches files against an `accept` pattern.
//!
//! The pattern follows the HTML `<input accept>` syntax: a
//! comma-separated list of tokens, each either an extension (`.csv`),
//! a MIME category wildcard (`image/*`) or an exact MIME type
//! (`application/pdf`). A file is accepted if **any** token matches.

/// MIME type reported by legacy Firefox drag sources for every file.
///
/// Files carrying it are always admissible: the real type is unknown
/// until the drop completes, so rejecting them would reject everything.
pub const BOGUS_MIME_TYPE: &str = "application/x-moz-file";

/// Whether a file with the given name and MIME type matches `pattern`.
///
/// An empty pattern or `"*"` accepts everything. Extension tokens match
/// case-insensitively against the end of `name`; a missing or empty
/// name matches any extension token, because drag-originated items
/// report no name until dropped.
#[must_use]
pub fn accepts(name: Option<&str>, mime_type: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() || pattern == "*" {
        return true;
    }

    let category = top_level(mime_type);

    pattern
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .any(|token| {
            if token.starts_with('.') {
                match name {
                    None | Some("") => true,
                    Some(name) => ends_with_ignore_case(name, token),
                }
            } else if let Some(wanted) = token.strip_suffix("/*") {
                category == wanted
            } else {
                mime_type == token
            }
        })
}

/// [`accepts`] plus the [`BOGUS_MIME_TYPE`] carve-out.
#[must_use]
pub fn is_admissible(name: Option<&str>, mime_type: &str, pattern: &str) -> bool {
    mime_type == BOGUS_MIME_TYPE || accepts(name, mime_type, pattern)
}

/// Substring of a MIME type before the first `/`.
fn top_level(mime_type: &str) -> &str {
    mime_type
        .split_once('/')
        .map_or(mime_type, |(category, _)| category)
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name
            .get(name.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

/// Drag-over state of a drop area.
///
/// `reject` is set when any dragged item would be refused, so the drop
/// area can show a warning before the user releases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    /// A drag is hovering the drop area.
    pub active: bool,
    /// At least one hovering item is not admissible.
    pub reject: bool,
}

impl DragState {
    /// Build the state for items currently hovering the drop area.
    ///
    /// Each item is `(name, mime_type)`; names are usually unavailable
    /// during a drag.
    #[must_use]
    pub fn hovering<'a>(
        items: impl IntoIterator<Item = (Option<&'a str>, &'a str)>,
        pattern: &str,
    ) -> Self {
        let reject = items
            .into_iter()
            .any(|(name, mime_type)| !is_admissible(name, mime_type, pattern));
        Self {
            active: true,
            reject,
        }
    }

    /// State once the drag has left or dropped.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_star_accept_everything() {
        assert!(accepts(Some("a.exe"), "application/octet-stream", ""));
        assert!(accepts(Some("a.exe"), "application/octet-stream", "*"));
        assert!(accepts(None, "", "  "));
    }

    #[test]
    fn extension_token_is_case_insensitive() {
        assert!(accepts(Some("REPORT.CSV"), "text/csv", ".csv"));
        assert!(accepts(Some("report.csv"), "text/csv", ".CSV"));
        assert!(!accepts(Some("report.csv.txt"), "text/plain", ".csv"));
    }

    #[test]
    fn extension_token_matches_missing_name() {
        assert!(accepts(None, "text/csv", ".csv"));
        assert!(accepts(Some(""), "", ".pdf"));
    }

    #[test]
    fn extension_shorter_name_does_not_panic() {
        assert!(!accepts(Some("a"), "text/plain", ".json"));
    }

    #[test]
    fn wildcard_matches_top_level_category() {
        assert!(accepts(Some("p.png"), "image/png", "image/*"));
        assert!(accepts(Some("p.svg"), "image/svg+xml", "image/*"));
        assert!(!accepts(Some("t.txt"), "text/plain", "image/*"));
        assert!(!accepts(Some("x"), "", "image/*"));
    }

    #[test]
    fn exact_mime_match() {
        assert!(accepts(Some("d.pdf"), "application/pdf", "application/pdf"));
        assert!(!accepts(Some("d.pdf"), "application/pdfx", "application/pdf"));
    }

    #[test]
    fn any_token_matching_is_enough() {
        let pattern = "image/*, .pdf ,video/mp4";
        assert!(accepts(Some("a.jpg"), "image/jpeg", pattern));
        assert!(accepts(Some("a.PDF"), "application/pdf", pattern));
        assert!(accepts(Some("clip"), "video/mp4", pattern));
        assert!(!accepts(Some("clip.webm"), "video/webm", pattern));
    }

    #[test]
    fn empty_tokens_never_match() {
        assert!(!accepts(Some("a.txt"), "text/plain", ",,"));
    }

    #[test]
    fn bogus_mime_type_is_always_admissible() {
        assert!(!accepts(Some("a.txt"), BOGUS_MIME_TYPE, "image/*"));
        assert!(is_admissible(Some("a.txt"), BOGUS_MIME_TYPE, "image/*"));
        assert!(is_admissible(None, BOGUS_MIME_TYPE, ".png"));
    }

    #[test]
    fn drag_state_rejects_on_any_inadmissible_item() {
        let state = DragState::hovering(
            [(None, "image/png"), (None, "text/plain")],
            "image/*",
        );
        assert!(state.active);
        assert!(state.reject);

        let state = DragState::hovering([(None, "image/png"), (None, BOGUS_MIME_TYPE)], "image/*");
        assert!(!state.reject);

        assert_eq!(DragState::idle(), DragState::default());
    }
}
