//! Template substitution over a fixed token grammar.
//!
//! A token is `{identifier}` where identifier is `[A-Za-z_][A-Za-z0-9_]*`.
//! Tokens found in the variable map are replaced; everything else, including
//! unknown tokens, passes through verbatim. The remote template service uses
//! `{{identifier}}` for the same grammar.

use std::collections::HashMap;

fn scan_identifier(text: &str) -> Option<(&str, usize)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }
    for (idx, c) in chars {
        if c.is_ascii_alphanumeric() || c == '_' {
            continue;
        }
        return Some((&text[..idx], idx));
    }
    None
}

/// Scan a `{identifier}` token starting at `text` (which begins with `{`).
/// Returns the identifier and the length of the full token.
fn scan_token(text: &str) -> Option<(&str, usize)> {
    let rest = text.strip_prefix('{')?;
    let (ident, len) = scan_identifier(rest)?;
    if rest[len..].starts_with('}') {
        Some((ident, len + 2))
    } else {
        None
    }
}

/// Substitute `{name}` placeholders; unknown names stay verbatim.
pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match scan_token(tail) {
            Some((ident, token_len)) if variables.contains_key(ident) => {
                out.push_str(&variables[ident]);
                rest = &tail[token_len..];
            }
            _ => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Substitute `{{name}}` placeholders; unknown names stay verbatim.
pub fn render_remote(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find("{{") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let inner = &tail[1..];
        match scan_token(inner) {
            Some((ident, token_len)) if inner[token_len..].starts_with('}') => {
                if let Some(value) = variables.get(ident) {
                    out.push_str(value);
                    rest = &inner[token_len + 1..];
                    continue;
                }
                out.push('{');
                rest = inner;
            }
            _ => {
                out.push('{');
                rest = inner;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Rewrite `{name}` tokens to the remote service's `{{name}}` form.
pub fn to_remote_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match scan_token(tail) {
            Some((ident, token_len)) => {
                out.push_str("{{");
                out.push_str(ident);
                out.push_str("}}");
                rest = &tail[token_len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_known_placeholder_is_replaced() {
        let out = render("go to {place}", &vars(&[("place", "the table")]));
        assert_eq!(out, "go to the table");
    }

    #[test]
    fn test_unknown_placeholder_stays_verbatim() {
        let out = render("go to {place}", &vars(&[]));
        assert_eq!(out, "go to {place}");
    }

    #[test]
    fn test_mixed_known_and_unknown() {
        let out = render("{a} and {b}", &vars(&[("a", "x")]));
        assert_eq!(out, "x and {b}");
    }

    #[test]
    fn test_non_identifier_braces_untouched() {
        let out = render("{1x} {a-b} { } {}", &vars(&[("a", "x")]));
        assert_eq!(out, "{1x} {a-b} { } {}");
    }

    #[test]
    fn test_to_remote_template() {
        assert_eq!(to_remote_template("go to {place}"), "go to {{place}}");
        assert_eq!(to_remote_template("json: {\"k\": 1}"), "json: {\"k\": 1}");
    }

    #[test]
    fn test_render_remote() {
        let out = render_remote("pick {{object}} up", &vars(&[("object", "the cup")]));
        assert_eq!(out, "pick the cup up");
        let kept = render_remote("pick {{object}} up", &vars(&[]));
        assert_eq!(kept, "pick {{object}} up");
    }

    proptest! {
        // Rendering with no matching variables is the identity.
        #[test]
        fn prop_render_without_matches_is_identity(text in "[a-zA-Z0-9 {}_.]*") {
            prop_assert_eq!(render(&text, &HashMap::new()), text);
        }
    }
}
