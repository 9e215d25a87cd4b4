//! Site configuration: `site.config.yaml`, shared with the portfolio site.
//!
//! The generator reads only the schema strictness flag and the content date
//! format; every other key belongs to the site and is ignored here.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub content: ContentSettings,
    pub build: BuildSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContentSettings {
    /// date-fns style, e.g. `MMM yyyy`.
    pub date_format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Escalate schema issues to a hard error.
    pub strict_schema: bool,
}

impl SiteConfig {
    pub fn strict_schema(&self) -> bool {
        self.build.strict_schema
    }

    /// The site's date format translated to document pattern tokens
    /// (`yyyy` → `YYYY`, `yy` → `YY`).
    pub fn document_date_format(&self) -> Option<String> {
        self.content
            .date_format
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(|f| f.replace("yyyy", "YYYY").replace("yy", "YY"))
    }
}
