//! Document configuration: `pdf.config.yaml`.
//!
//! The raw file is deserialized into [`RawDocumentConfig`] (every key optional,
//! exactly as authored) and then resolved once into [`DocumentConfig`], where
//! every option carries a concrete value. Consumers never apply fallbacks of
//! their own.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::warn;

pub const DEFAULT_DATE_FORMAT: &str = "MMM YYYY";
pub const DEFAULT_MAIN_FONT: &str = "Latin Modern Roman";
pub const SECONDARY_FALLBACK_FONT: &str = "TeX Gyre Pagella";
pub const DEFAULT_MARGIN: &str = "0.75in";
pub const DEFAULT_TEX_NAME: &str = "resume.tex";
pub const DEFAULT_HTML_NAME: &str = "resume.html";

// ────────────────────────────────────────────────────────────────────────────
// Raw file shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDocumentConfig {
    pub mainfont: Option<String>,
    pub fonts: Option<RawFonts>,
    pub margin: Option<String>,
    pub topmargin: Option<String>,
    pub bottommargin: Option<String>,
    pub leftmargin: Option<String>,
    pub rightmargin: Option<String>,
    #[serde(rename = "section-order")]
    pub section_order: Option<Vec<String>>,
    /// Kept as a mapping so the declared key order survives deserialization.
    pub sections: Option<Mapping>,
    pub output: Option<OutputNames>,
    pub metadata: Option<Metadata>,
    #[serde(rename = "pdfEngine")]
    pub pdf_engine: Option<String>,
    #[serde(rename = "dateFormat")]
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFonts {
    pub main: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputNames {
    pub tex: Option<String>,
    pub html: Option<String>,
    pub pdf: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Per-section options. Limits only apply to the section they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SectionConfig {
    pub title: Option<String>,
    pub enabled: Option<bool>,
    /// work: keep entries that started or ended within this many years.
    pub work_history_years: Option<u32>,
    pub max_skills: Option<usize>,
    pub max_projects: Option<usize>,
    pub max_certifications: Option<usize>,
    /// education: show the coursework line. The misspelled key is the one
    /// existing config files use.
    #[serde(rename = "show-courework", alias = "show-coursework")]
    pub show_coursework: Option<bool>,
    /// Key of the section this one is nested under (certificates → education).
    pub parent: Option<String>,
}

impl SectionConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled == Some(true)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resolved configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Margins {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: DEFAULT_MARGIN.to_string(),
            bottom: DEFAULT_MARGIN.to_string(),
            left: DEFAULT_MARGIN.to_string(),
            right: DEFAULT_MARGIN.to_string(),
        }
    }
}

/// Fully-defaulted rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    pub date_format: String,
    pub main_font: String,
    /// Ordered candidates for the font cascade. May be empty.
    pub font_candidates: Vec<String>,
    pub margins: Margins,
    /// Section configs in declaration order; keys are not validated here.
    pub sections: Vec<(String, SectionConfig)>,
    /// Explicit `section-order`, used only when `sections` is empty.
    pub section_order: Vec<String>,
    pub tex_name: String,
    pub html_name: String,
    pub pdf_name: Option<String>,
    pub metadata: Metadata,
    pub pdf_engine: Option<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self::resolve(RawDocumentConfig::default())
    }
}

impl DocumentConfig {
    /// Resolves every option of the raw file to its effective value.
    pub fn resolve(raw: RawDocumentConfig) -> Self {
        let main_font = non_blank(raw.mainfont.clone());

        let listed: Vec<String> = raw
            .fonts
            .map(|f| f.main)
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        let font_candidates = if listed.is_empty() {
            main_font
                .iter()
                .cloned()
                .chain([
                    SECONDARY_FALLBACK_FONT.to_string(),
                    DEFAULT_MAIN_FONT.to_string(),
                ])
                .collect()
        } else {
            listed
        };

        let shorthand = non_blank(raw.margin);
        let side = |value: Option<String>| {
            non_blank(value)
                .or_else(|| shorthand.clone())
                .unwrap_or_else(|| DEFAULT_MARGIN.to_string())
        };
        let margins = Margins {
            top: side(raw.topmargin),
            bottom: side(raw.bottommargin),
            left: side(raw.leftmargin),
            right: side(raw.rightmargin),
        };

        let output = raw.output.unwrap_or_default();

        Self {
            date_format: non_blank(raw.date_format)
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            main_font: main_font.unwrap_or_else(|| DEFAULT_MAIN_FONT.to_string()),
            font_candidates,
            margins,
            sections: resolve_sections(raw.sections.unwrap_or_default()),
            section_order: raw.section_order.unwrap_or_default(),
            tex_name: non_blank(output.tex).unwrap_or_else(|| DEFAULT_TEX_NAME.to_string()),
            html_name: non_blank(output.html).unwrap_or_else(|| DEFAULT_HTML_NAME.to_string()),
            pdf_name: non_blank(output.pdf),
            metadata: raw.metadata.unwrap_or_default(),
            pdf_engine: non_blank(raw.pdf_engine),
        }
    }

    /// Looks up the config of a section by key.
    pub fn section(&self, key: &str) -> Option<&SectionConfig> {
        self.sections
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cfg)| cfg)
    }

    /// True once any section config has been declared.
    pub fn has_section_config(&self) -> bool {
        !self.sections.is_empty()
    }

    /// File name of the published PDF: configured name, else the subject's
    /// name with whitespace runs turned into underscores, else `Resume.pdf`.
    pub fn pdf_file_name(&self, subject_name: Option<&str>) -> String {
        if let Some(name) = &self.pdf_name {
            return name.clone();
        }
        let stem = subject_name
            .map(|n| n.split_whitespace().collect::<Vec<_>>().join("_"))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Resume".to_string());
        format!("{stem}.pdf")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Converts the `sections` mapping into ordered `(key, config)` pairs.
///
/// A `null` entry counts as an empty config. Entries that are not mappings
/// are skipped with a warning.
fn resolve_sections(mapping: Mapping) -> Vec<(String, SectionConfig)> {
    let mut sections: Vec<(String, SectionConfig)> = Vec::new();
    for (key, value) in mapping {
        let Some(key) = key.as_str().map(str::to_string) else {
            warn!("Ignoring non-string section key in document config: {key:?}");
            continue;
        };
        if sections.iter().any(|(k, _)| *k == key) {
            continue;
        }
        let config = match value {
            Value::Null => SectionConfig::default(),
            Value::Mapping(options) => resolve_section_options(&key, options),
            other => {
                warn!("Ignoring config for section '{key}': expected a mapping, got {other:?}");
                continue;
            }
        };
        sections.push((key, config));
    }
    sections
}

/// Deserializes one section's options. An option with the wrong type falls
/// back to its default on its own; the rest of the section is kept.
fn resolve_section_options(key: &str, options: Mapping) -> SectionConfig {
    let mut accepted = Mapping::new();
    for (name, value) in options {
        let mut single = Mapping::new();
        single.insert(name.clone(), value.clone());
        match serde_yaml::from_value::<SectionConfig>(Value::Mapping(single)) {
            Ok(_) => {
                accepted.insert(name, value);
            }
            Err(e) => warn!(
                "Ignoring option {} of section '{key}': {e}",
                name.as_str().unwrap_or("?")
            ),
        }
    }
    serde_yaml::from_value(Value::Mapping(accepted)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> DocumentConfig {
        DocumentConfig::resolve(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_empty_config_resolves_to_defaults() {
        let cfg = DocumentConfig::default();
        assert_eq!(cfg.date_format, "MMM YYYY");
        assert_eq!(cfg.main_font, "Latin Modern Roman");
        assert_eq!(
            cfg.font_candidates,
            vec!["TeX Gyre Pagella".to_string(), "Latin Modern Roman".to_string()]
        );
        assert_eq!(cfg.margins, Margins::default());
        assert!(!cfg.has_section_config());
        assert_eq!(cfg.tex_name, "resume.tex");
        assert_eq!(cfg.html_name, "resume.html");
        assert!(cfg.pdf_engine.is_none());
    }

    #[test]
    fn test_section_declaration_order_is_preserved() {
        let cfg = parse(
            r#"
sections:
  skills: { enabled: true }
  work: { enabled: true, title: Career }
  education: { enabled: false }
"#,
        );
        let keys: Vec<&str> = cfg.sections.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["skills", "work", "education"]);
        assert_eq!(cfg.section("work").unwrap().title.as_deref(), Some("Career"));
        assert!(!cfg.section("education").unwrap().is_enabled());
    }

    #[test]
    fn test_section_limits_use_kebab_case_keys() {
        let cfg = parse(
            r#"
sections:
  work: { work-history-years: 5 }
  skills: { max-skills: 2 }
  education: { show-courework: true }
  certificates: { max-certifications: 1, parent: education }
"#,
        );
        assert_eq!(cfg.section("work").unwrap().work_history_years, Some(5));
        assert_eq!(cfg.section("skills").unwrap().max_skills, Some(2));
        assert_eq!(cfg.section("education").unwrap().show_coursework, Some(true));
        let certs = cfg.section("certificates").unwrap();
        assert_eq!(certs.max_certifications, Some(1));
        assert_eq!(certs.parent.as_deref(), Some("education"));
    }

    #[test]
    fn test_coursework_key_accepts_corrected_spelling() {
        let cfg = parse("sections:\n  education: { show-coursework: true }\n");
        assert_eq!(cfg.section("education").unwrap().show_coursework, Some(true));
    }

    #[test]
    fn test_bad_option_defaults_only_that_option() {
        let cfg = parse(
            r#"
sections:
  skills: { enabled: true, max-skills: -1, title: Toolbox }
  work: { enabled: true, work-history-years: 2.5 }
"#,
        );
        assert!(cfg.has_section_config());
        let skills = cfg.section("skills").unwrap();
        assert!(skills.is_enabled());
        assert_eq!(skills.max_skills, None);
        assert_eq!(skills.title.as_deref(), Some("Toolbox"));
        let work = cfg.section("work").unwrap();
        assert!(work.is_enabled());
        assert_eq!(work.work_history_years, None);
    }

    #[test]
    fn test_non_mapping_section_entry_is_skipped() {
        let cfg = parse("sections:
  work: yes
  skills: { enabled: true }
");
        assert!(cfg.section("work").is_none());
        assert!(cfg.section("skills").unwrap().is_enabled());
    }

    #[test]
    fn test_null_section_entry_counts_as_declared() {
        let cfg = parse("sections:\n  work:\n");
        assert!(cfg.has_section_config());
        assert!(!cfg.section("work").unwrap().is_enabled());
    }

    #[test]
    fn test_margin_shorthand_fills_unset_sides() {
        let cfg = parse("margin: 1in\ntopmargin: 0.5in\n");
        assert_eq!(cfg.margins.top, "0.5in");
        assert_eq!(cfg.margins.bottom, "1in");
        assert_eq!(cfg.margins.left, "1in");
        assert_eq!(cfg.margins.right, "1in");
    }

    #[test]
    fn test_font_list_wins_over_mainfont() {
        let cfg = parse("mainfont: Inter\nfonts:\n  main: [' EB Garamond ', '', Lato]\n");
        assert_eq!(cfg.main_font, "Inter");
        assert_eq!(
            cfg.font_candidates,
            vec!["EB Garamond".to_string(), "Lato".to_string()]
        );
    }

    #[test]
    fn test_mainfont_heads_default_candidates() {
        let cfg = parse("mainfont: Inter\n");
        assert_eq!(
            cfg.font_candidates,
            vec![
                "Inter".to_string(),
                "TeX Gyre Pagella".to_string(),
                "Latin Modern Roman".to_string()
            ]
        );
    }

    #[test]
    fn test_pdf_file_name_resolution() {
        let cfg = DocumentConfig::default();
        assert_eq!(cfg.pdf_file_name(Some("Ada  King Lovelace")), "Ada_King_Lovelace.pdf");
        assert_eq!(cfg.pdf_file_name(None), "Resume.pdf");

        let named = parse("output:\n  pdf: cv.pdf\n");
        assert_eq!(named.pdf_file_name(Some("Ada")), "cv.pdf");
    }

    #[test]
    fn test_output_and_engine_overrides() {
        let cfg = parse("output:\n  tex: cv.tex\n  html: cv.html\npdfEngine: lualatex\ndateFormat: MMMM YYYY\n");
        assert_eq!(cfg.tex_name, "cv.tex");
        assert_eq!(cfg.html_name, "cv.html");
        assert_eq!(cfg.pdf_engine.as_deref(), Some("lualatex"));
        assert_eq!(cfg.date_format, "MMMM YYYY");
    }
}
