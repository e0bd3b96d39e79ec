//! Method naming convention.
//!
//! # Responsibilities
//! - Normalize controller, verb and action names to Title-case
//! - Split a method name into an HTTP verb and an optional action
//!
//! # Design Decisions
//! - Matching is case-insensitive: names are lower-cased before Title-casing
//! - Verb prefixes are tested in a fixed priority order, first match wins

use std::fmt;

/// Verbs a controller method name may start with, in match priority order.
pub const VERB_PREFIXES: [Verb; 5] = [Verb::Index, Verb::Get, Verb::Put, Verb::Post, Verb::Delete];

/// The verb part of a controller method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Index,
    Get,
    Put,
    Post,
    Delete,
}

impl Verb {
    /// Title-cased name as it appears in method names and route keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Index => "Index",
            Verb::Get => "Get",
            Verb::Put => "Put",
            Verb::Post => "Post",
            Verb::Delete => "Delete",
        }
    }

    /// True for verbs whose handlers receive a decoded JSON payload.
    pub fn takes_payload(&self) -> bool {
        matches!(self, Verb::Put | Verb::Post)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case `s`, then upper-case the first letter of every word.
///
/// A word starts at the beginning of the string or after a separator:
/// whitespace, or any ASCII character other than letters, digits and `_`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars().flat_map(char::to_lowercase) {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_separator(c);
    }
    out
}

fn is_separator(c: char) -> bool {
    if c.is_ascii() {
        return !(c.is_ascii_alphanumeric() || c == '_');
    }
    c.is_whitespace()
}

/// Split a method name into `(verb, action)`.
///
/// Returns `None` when the name starts with none of [`VERB_PREFIXES`].
/// The action is the Title-cased remainder and may be empty.
pub fn parse_method_name(method_name: &str) -> Option<(Verb, String)> {
    let normalized = title_case(method_name);
    VERB_PREFIXES.iter().find_map(|verb| {
        normalized
            .strip_prefix(verb.as_str())
            .map(|rest| (*verb, title_case(rest)))
    })
}

/// Build the normalized registry key for a (controller, verb, action) triple.
pub fn route_key(controller: &str, verb: Verb, action: &str) -> String {
    format!("{}{}{}", title_case(controller), verb.as_str(), title_case(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("projects"), "Projects");
        assert_eq!(title_case("PROJECTS"), "Projects");
        assert_eq!(title_case("doSomething"), "Dosomething");
        assert_eq!(title_case("do-something"), "Do-Something");
        assert_eq!(title_case("snake_case"), "Snake_case");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_is_idempotent() {
        for s in ["Members", "getRawMethod", "a b-c", "x9y"] {
            let once = title_case(s);
            assert_eq!(title_case(&once), once);
        }
    }

    #[test]
    fn test_parse_method_name() {
        assert_eq!(parse_method_name("Index"), Some((Verb::Index, String::new())));
        assert_eq!(parse_method_name("Get"), Some((Verb::Get, String::new())));
        assert_eq!(
            parse_method_name("GetStatus"),
            Some((Verb::Get, "Status".to_string()))
        );
        assert_eq!(
            parse_method_name("GetRawMethod"),
            Some((Verb::Get, "Rawmethod".to_string()))
        );
        assert_eq!(
            parse_method_name("postWidgets"),
            Some((Verb::Post, "Widgets".to_string()))
        );
        assert_eq!(
            parse_method_name("DELETEall"),
            Some((Verb::Delete, "All".to_string()))
        );
    }

    #[test]
    fn test_parse_method_name_without_verb() {
        assert_eq!(parse_method_name("Bogus"), None);
        assert_eq!(parse_method_name("Patch"), None);
        assert_eq!(parse_method_name(""), None);
    }

    #[test]
    fn test_route_key() {
        assert_eq!(route_key("projects", Verb::Get, "widgets"), "ProjectsGetWidgets");
        assert_eq!(route_key("Projects", Verb::Index, ""), "ProjectsIndex");
    }
}
