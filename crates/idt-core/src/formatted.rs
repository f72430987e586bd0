//! Evaluator for the subset of installer "Formatted" strings used by shortcut targets
//!
//! A formatted string is plain text with bracketed tokens such as `[#FileKey]`.
//! `[~]` always expands to NUL; every other token is handed to a resolver.

use crate::error::Result;
use log::trace;

/// Expand every `[token]` in `input`.
///
/// The text returned by `resolve` is inserted verbatim. An empty `[]` or an
/// unclosed `[` is not a token and is copied through unchanged.
pub fn expand_formatted_string<F>(input: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('[') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        match after_open.find(']') {
            Some(close) if close > 0 => {
                let token = &after_open[..close];
                if token == "~" {
                    output.push('\0');
                } else {
                    let value = resolve(token)?;
                    trace!("formatted token [{}] -> {}", token, value);
                    output.push_str(&value);
                }
                rest = &after_open[close + 1..];
            }
            _ => {
                output.push('[');
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn unsupported(token: &str) -> Result<String> {
        Err(Error::UnsupportedFormattedToken(token.to_string()))
    }

    #[test]
    fn test_nul_token_never_reaches_resolver() {
        assert_eq!(expand_formatted_string("[~]", unsupported).unwrap(), "\u{0}");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(
            expand_formatted_string("no tokens here", unsupported).unwrap(),
            "no tokens here"
        );
    }

    #[test]
    fn test_tokens_are_substituted_in_order() {
        let mut seen = Vec::new();
        let result = expand_formatted_string("a[X]b[Y]c", |token| {
            seen.push(token.to_string());
            Ok(token.to_lowercase())
        })
        .unwrap();

        assert_eq!(result, "axbyc");
        assert_eq!(seen, vec!["X", "Y"]);
    }

    #[test]
    fn test_replacement_is_literal() {
        let result =
            expand_formatted_string("[P]", |_| Ok(r"C:\$1\[x]".to_string())).unwrap();
        assert_eq!(result, r"C:\$1\[x]");
    }

    #[test]
    fn test_empty_and_unclosed_brackets_pass_through() {
        assert_eq!(expand_formatted_string("[]", unsupported).unwrap(), "[]");
        assert_eq!(expand_formatted_string("a[b", unsupported).unwrap(), "a[b");
        assert_eq!(expand_formatted_string("a]b", unsupported).unwrap(), "a]b");
    }

    #[test]
    fn test_nested_open_bracket_is_part_of_token() {
        let result = expand_formatted_string("[[x]]", |token| {
            assert_eq!(token, "[x");
            Ok("T".to_string())
        })
        .unwrap();
        assert_eq!(result, "T]");
    }

    #[test]
    fn test_resolver_error_propagates() {
        let err = expand_formatted_string("x[Prop]", unsupported).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormattedToken(t) if t == "Prop"));
    }
}
