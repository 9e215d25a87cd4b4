//! LaTeX escaping and small markup builders shared by the context builder.

use crate::models::document::DEFAULT_MAIN_FONT;

/// Escapes text for use in ordinary LaTeX body text.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '#' | '$' | '%' | '&' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a URL for the first argument of `\href`.
///
/// Underscores and backslashes pass through: hyperref reads the target
/// verbatim enough that `a_b` must stay `a_b` for the link to resolve.
pub fn escape_latex_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '#' | '$' | '%' | '&' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// `\href{url}{display}` where `display` is already escaped.
pub fn href(url: &str, display: &str) -> String {
    format!("\\href{{{}}}{{{}}}", escape_latex_url(url), display)
}

/// `text`, hyperlinked when a URL is present.
pub fn maybe_linked(text: &str, url: Option<&str>) -> String {
    match url.filter(|u| !u.is_empty()) {
        Some(url) => href(url, &escape_latex(text)),
        None => escape_latex(text),
    }
}

/// Builds nested `\IfFontExistsTF` checks that select the first installed
/// font of `fonts`, falling back to Latin Modern Roman which every TeX
/// distribution ships.
pub fn build_font_cascade<S: AsRef<str>>(fonts: &[S]) -> String {
    let fallback = format!("\\setmainfont{{{DEFAULT_MAIN_FONT}}}");
    fonts
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .fold(fallback, |inner, font| {
            format!("\\IfFontExistsTF{{{font}}}{{\\setmainfont{{{font}}}}}{{{inner}}}")
        })
}
