//! Plain-text substitution helpers shared by the family adapters.
//!
//! Replacement values are inserted verbatim; callers escape them first.

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces every `\name` control word (not followed by another letter).
pub fn replace_command(text: &str, name: &str, value: &str) -> String {
    let needle = format!("\\{name}");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(&needle) {
        let after = &rest[pos + needle.len()..];
        out.push_str(&rest[..pos]);
        if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push_str(&needle);
        } else {
            out.push_str(value);
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Replaces every bare `TOKEN` that stands as a whole word and is not a control word.
pub fn replace_token(text: &str, token: &str, value: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (pos, _) in text.match_indices(token) {
        if pos < last {
            continue;
        }
        let before = text[..pos].chars().next_back();
        let after = text[pos + token.len()..].chars().next();
        let standalone = !before.is_some_and(|c| is_word_char(c) || c == '\\')
            && !after.is_some_and(is_word_char);
        if standalone {
            out.push_str(&text[last..pos]);
            out.push_str(value);
            last = pos + token.len();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Whether `text` holds `\name` as a complete control word.
pub fn has_command(text: &str, name: &str) -> bool {
    let needle = format!("\\{name}");
    text.match_indices(&needle).any(|(pos, _)| {
        !text[pos + needle.len()..].starts_with(|c: char| c.is_ascii_alphabetic())
    })
}

/// Whether `text` holds `token` as a standalone word (see [`replace_token`]).
pub fn has_token(text: &str, token: &str) -> bool {
    text.match_indices(token).any(|(pos, _)| {
        let before = text[..pos].chars().next_back();
        let after = text[pos + token.len()..].chars().next();
        !before.is_some_and(|c| is_word_char(c) || c == '\\') && !after.is_some_and(is_word_char)
    })
}

/// Rewrites the single argument of every `\cmd{...}` occurrence.
pub fn set_command_arg(text: &str, cmd: &str, value: &str) -> String {
    let needle = format!("\\{cmd}{{");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(&needle) {
        let arg_start = pos + needle.len();
        match rest[arg_start..].find('}') {
            Some(close) => {
                out.push_str(&rest[..arg_start]);
                out.push_str(value);
                out.push('}');
                rest = &rest[arg_start + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Prefixes every line containing `needle` with `% `.
pub fn comment_out_lines(text: &str, needle: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.contains(needle) && !line.trim_start().starts_with('%') {
            out.push_str("% ");
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_command_respects_word_end() {
        let text = r"\PLACEHOLDERNAME \PLACEHOLDERNAMEX \PLACEHOLDERNAME{}";
        assert_eq!(
            replace_command(text, "PLACEHOLDERNAME", "Jane"),
            r"Jane \PLACEHOLDERNAMEX Jane{}"
        );
    }

    #[test]
    fn test_replace_token_whole_words_only() {
        let text = r"PHONE PHONE_NUMBER \PHONE xPHONE (PHONE)";
        assert_eq!(
            replace_token(text, "PHONE", "555"),
            r"555 PHONE_NUMBER \PHONE xPHONE (555)"
        );
    }

    #[test]
    fn test_presence_checks() {
        assert!(has_command(r"x \FULLNAME{}", "FULLNAME"));
        assert!(!has_command(r"x \FULLNAMES", "FULLNAME"));
        assert!(has_token("a FULL_NAME b", "FULL_NAME"));
        assert!(!has_token(r"\FULL_NAME FULL_NAMES", "FULL_NAME"));
    }

    #[test]
    fn test_set_command_arg() {
        let text = r"\name{Your Name} \namefont{x} \name{}";
        assert_eq!(
            set_command_arg(text, "name", "Jane"),
            r"\name{Jane} \namefont{x} \name{Jane}"
        );
    }

    #[test]
    fn test_comment_out_lines() {
        let text = "a\n\\addbibresource{x.bib}\n% \\addbibresource{y.bib}\n";
        assert_eq!(
            comment_out_lines(text, "\\addbibresource"),
            "a\n% \\addbibresource{x.bib}\n% \\addbibresource{y.bib}\n"
        );
    }
}
