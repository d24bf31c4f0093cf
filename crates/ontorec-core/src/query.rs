//! Search query tokenizing and follow-up query rewriting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::thesaurus::ThesaurusConcept;

/// Index field holding concept URIs of subject headings.
pub const URI_FILTER_FIELD: &str = "topic_uri_str_mv";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Returns the query clause that filters by `uri`.
pub fn uri_filter(uri: &str) -> String {
    format!("{}:{}", URI_FILTER_FIELD, uri)
}

/// True for a term the user already narrowed the search by.
pub fn is_uri_filter(term: &str) -> bool {
    term.starts_with(URI_FILTER_FIELD) && term[URI_FILTER_FIELD.len()..].starts_with(':')
}

/// Splits a free-text query on spaces, keeping double-quoted runs together.
///
/// Quoting follows CSV rules with a space delimiter: a field that starts with
/// `"` lasts until the closing quote, and `""` inside it is a literal quote.
/// A quote in the middle of an unquoted field is kept as-is. Empty fields
/// (repeated spaces) are dropped.
pub fn tokenize_query(lookfor: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut chars = lookfor.trim().chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            ' ' => {
                if !current.is_empty() {
                    terms.push(std::mem::take(&mut current));
                }
                at_field_start = true;
            }
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            _ => {
                current.push(c);
                at_field_start = false;
            }
        }
    }

    if !current.is_empty() {
        terms.push(current);
    }

    terms
}

/// Collapses whitespace runs into single spaces and trims the ends.
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value, " ").trim().to_string()
}

/// Builds the replacement clause `topic_uri_str_mv:<uri> <label>`.
///
/// Labels containing whitespace are double-quoted.
pub fn concept_clause(concept: &ThesaurusConcept) -> String {
    let label = if WHITESPACE.is_match(&concept.pref_label) {
        format!("\"{}\"", concept.pref_label)
    } else {
        concept.pref_label.clone()
    };
    format!("{} {}", uri_filter(&concept.uri), label)
}

/// Rewrites `lookfor` so that `term` is replaced by a filter on `concept`.
///
/// A quoted occurrence of the term (`"term"`) is replaced as a whole;
/// otherwise every bare occurrence is. When `broader_uri` is given (hyponym
/// recommendations), the now redundant filter on the broader concept is
/// removed and whitespace collapsed.
pub fn rewrite_query(
    lookfor: &str,
    term: &str,
    concept: &ThesaurusConcept,
    broader_uri: Option<&str>,
) -> String {
    let replacement = concept_clause(concept);
    let quoted = format!("\"{}\"", term);

    let mut rewritten = if lookfor.contains(&quoted) {
        lookfor.replace(&quoted, &replacement)
    } else {
        lookfor.replace(term, &replacement)
    };

    if let Some(broader_uri) = broader_uri {
        rewritten = strip_clause(&rewritten, &uri_filter(broader_uri));
        rewritten = collapse_whitespace(&rewritten);
    }

    rewritten
}

/// Removes whole-word occurrences of `clause`, so `...:p1` leaves `...:p12` alone.
fn strip_clause(value: &str, clause: &str) -> String {
    let pattern = format!(r"(^|\s){}(\s|$)", regex::escape(clause));
    match Regex::new(&pattern) {
        Ok(re) => {
            // Adjacent duplicates share a separator, so run until stable.
            let mut current = value.to_string();
            loop {
                let next = re.replace_all(&current, " ").into_owned();
                if next == current {
                    return current;
                }
                current = next;
            }
        }
        Err(_) => value.replace(clause, ""),
    }
}
