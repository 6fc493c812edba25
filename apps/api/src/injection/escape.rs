/// Escapes free text for insertion into LaTeX source.
///
/// Each input character is mapped exactly once, so replacement text such as
/// `\textbackslash{}` is never itself re-escaped.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '$' | '%' | '&' | '#' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str(r"\textasciicircum{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a URL for `\href`/`\url` arguments: `%`, `#`, `\` are escaped and braces dropped.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.trim().chars() {
        match c {
            '%' | '#' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '{' | '}' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Escaped value, or empty when absent.
pub fn esc(value: Option<&str>) -> String {
    value.map(escape_latex).unwrap_or_default()
}
