//! Flat `{{token}}` substitution for the LaTeX template.
//!
//! There is no control flow in templates: anything conditional is decided by
//! the context builder and arrives here as a finished string.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::render::context::Context;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

// A `\t` lost to string-literal handling shows up as whitespace before the
// remainder of the command name.
static LOST_TITLEFORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\n)\s*itleformat").expect("valid regex"));
static LOST_TITLESPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\n)\s*itlespacing").expect("valid regex"));

/// Replaces each `{{ name }}` with the context value, or nothing when unknown.
pub fn substitute(template: &str, context: &Context) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures| {
            context.get(caps[1].trim()).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Restores `\titleformat` / `\titlespacing` lines whose backslash went missing.
pub fn repair_formatting_commands(latex: &str) -> String {
    let fixed: Cow<'_, str> = LOST_TITLEFORMAT.replace_all(latex, "${1}\\titleformat");
    LOST_TITLESPACING
        .replace_all(&fixed, "${1}\\titlespacing")
        .into_owned()
}

/// Produces the final document source: substitution, repair, then trailing
/// whitespace removed.
pub fn render_document(template: &str, context: &Context) -> String {
    let substituted = substitute(template, context);
    let repaired = repair_formatting_commands(&substituted);
    repaired.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pairs: &[(&str, &str)]) -> Context {
        let mut c = Context::default();
        for (k, v) in pairs {
            c.insert(*k, *v);
        }
        c
    }

    #[test]
    fn test_known_tokens_are_replaced() {
        let c = ctx(&[("name", "Ada"), ("label", "Engineer")]);
        assert_eq!(substitute("{{name}} -- {{label}}", &c), "Ada -- Engineer");
    }

    #[test]
    fn test_token_names_are_trimmed() {
        let c = ctx(&[("name", "Ada")]);
        assert_eq!(substitute("Hi {{  name }}!", &c), "Hi Ada!");
    }

    #[test]
    fn test_unknown_token_becomes_empty() {
        let c = ctx(&[("name", "Ada")]);
        assert_eq!(substitute("[{{missing}}]{{name}}", &c), "[]Ada");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let c = ctx(&[("a", "{{b}}"), ("b", "nope")]);
        assert_eq!(substitute("{{a}}", &c), "{{b}}");
    }

    #[test]
    fn test_repair_restores_lost_backslash() {
        let broken = "\\usepackage{titlesec}\n\titleformat{\\section}{}\n  itlespacing*{\\section}{0pt}";
        let fixed = repair_formatting_commands(broken);
        assert_eq!(
            fixed,
            "\\usepackage{titlesec}\n\\titleformat{\\section}{}\n\\titlespacing*{\\section}{0pt}"
        );
    }

    #[test]
    fn test_repair_leaves_intact_commands_alone() {
        let good = "\\titleformat{\\section}{}\n\\titlespacing*{\\section}{0pt}";
        assert_eq!(repair_formatting_commands(good), good);
    }

    #[test]
    fn test_repair_at_start_of_document() {
        assert_eq!(repair_formatting_commands("\titleformat{x}"), "\\titleformat{x}");
    }

    #[test]
    fn test_render_document_trims_trailing_whitespace() {
        let c = ctx(&[("body", "text")]);
        assert_eq!(render_document("{{body}}\n\n  \n", &c), "text");
    }
}
