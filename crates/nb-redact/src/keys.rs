//! The filtered-key table.
//!
//! Each entry names a log attribute whose value must never reach a log
//! stream. The table is fixed at startup and applied in declaration order.

/// How a filtered key matches attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    /// Literal substring of the attribute name.
    Literal(&'static str),
    /// Regex fragment matched inside the attribute name.
    Pattern(&'static str),
}

/// A log attribute to hide, plus the name shown in its placeholder.
#[derive(Debug, Clone, Copy)]
pub struct FilteredKey {
    /// Name used in the `<name - HIDDEN>` placeholder.
    pub name: &'static str,
    /// Fragment matched against attribute names.
    pub fragment: Fragment,
}

impl FilteredKey {
    /// The regex fragment matching this key inside an attribute name.
    pub fn fragment_pattern(&self) -> String {
        match self.fragment {
            Fragment::Literal(literal) => regex::escape(literal),
            Fragment::Pattern(pattern) => pattern.to_string(),
        }
    }
}

/// Keys whose values are hidden before any record leaves the process.
///
/// Client ids are ok to log; session ids, tokens, client secrets, and auth
/// URLs are not. Order matters: entries are applied in declaration order.
pub const FILTERED_KEYS: &[FilteredKey] = &[
    FilteredKey {
        name: "sid",
        fragment: Fragment::Literal("sid"),
    },
    // Any attribute containing the words "access" and "token".
    FilteredKey {
        name: "access_token",
        fragment: Fragment::Pattern("access[^'\"]*token"),
    },
    // Any attribute containing the words "refresh" and "token".
    FilteredKey {
        name: "refresh_token",
        fragment: Fragment::Pattern("refresh[^'\"]*token"),
    },
    FilteredKey {
        name: "clientsecret",
        fragment: Fragment::Literal("clientsecret"),
    },
    // Any attribute containing the words "nimbus", "auth", and "url".
    FilteredKey {
        name: "nimbusauthurl",
        fragment: Fragment::Pattern("nimbus[^'\"]*auth[^'\"]*url"),
    },
];
