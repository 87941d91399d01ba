//! XSD regular expression handling.
//!
//! YANG patterns follow the W3C XML Schema regex dialect, which is implicitly
//! anchored at both ends of the expression. Before handing a pattern to the
//! [`regex`] crate it is rewritten into an explicitly anchored form.

use regex::Regex;

/// Rewrite an XSD pattern into an explicitly anchored regex.
///
/// The whole pattern is wrapped in `^( ... )$`. A `$` that is not escaped and
/// not the last character is escaped, and a `^` that is not escaped, not the
/// first character and not immediately preceded by `[` is escaped, since XSD
/// treats both as ordinary characters in those positions.
pub fn anchor_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let last = chars.len().wrapping_sub(1);
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut in_escape = false;
    let mut prev_char = None;
    let mut add_parens = false;

    for (i, &ch) in chars.iter().enumerate() {
        if i == 0 && ch != '^' {
            out.push('^');
            // Parenthesise the whole expression so alternations cannot
            // associate with the added anchors.
            out.push('(');
            add_parens = true;
        }

        match ch {
            '$' if !in_escape && i != last => out.push('\\'),
            '^' if !in_escape && prev_char != Some('[') && i != 0 => out.push('\\'),
            _ => {}
        }

        in_escape = !in_escape && ch == '\\';
        out.push(ch);

        if i == last {
            if add_parens {
                out.push(')');
            }
            if ch != '$' {
                out.push('$');
            }
        }

        prev_char = Some(ch);
    }

    out
}

/// Whether `value` matches the anchored form of `pattern`.
///
/// A pattern that fails to compile does not match.
pub fn pattern_matches(value: &str, pattern: &str) -> bool {
    match Regex::new(&anchor_pattern(pattern)) {
        Ok(re) => re.is_match(value),
        Err(error) => {
            tracing::warn!(%pattern, %error, "ignoring uncompilable XSD pattern");
            false
        }
    }
}

/// Whether `value` matches every pattern in `patterns`.
///
/// An empty pattern list matches any value.
pub fn all_patterns_match(value: &str, patterns: &[String]) -> bool {
    patterns.iter().all(|p| pattern_matches(value, p))
}
