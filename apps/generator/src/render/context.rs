//! Context Builder: turns the resume tree and document config into the flat
//! token map consumed by the template.
//!
//! Flow: contact line → per-section blocks (filtered/truncated before
//! rendering) → certificate nesting → section enablement + ordering →
//! `dynamicSections` → titles, flags, metadata, fonts.
//!
//! Everything user-authored is escaped here; the template layer inserts
//! values verbatim.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::document::{DocumentConfig, SectionConfig};
use crate::models::resume::{
    Basics, Certificate, EducationEntry, Project, ResumeRoot, Skill, WorkEntry,
};
use crate::render::dates::{format_date_at, format_date_range_at, YearMonth};
use crate::render::latex::{build_font_cascade, escape_latex, href, maybe_linked};

const BULLET: &str = " \\textbullet{} ";
const PARENT_EDUCATION: &str = "education";

// ────────────────────────────────────────────────────────────────────────────
// Context
// ────────────────────────────────────────────────────────────────────────────

/// Flat token → value map. Lookups of unknown tokens yield `None`; the
/// template layer renders those as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// The logical resume sections the document can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Education,
    Work,
    Projects,
    Skills,
    Certificates,
}

impl SectionKind {
    pub const DEFAULT_ORDER: [SectionKind; 5] = [
        SectionKind::Education,
        SectionKind::Work,
        SectionKind::Projects,
        SectionKind::Skills,
        SectionKind::Certificates,
    ];

    /// Key used in `pdf.config.yaml`.
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::Education => "education",
            SectionKind::Work => "work",
            SectionKind::Projects => "projects",
            SectionKind::Skills => "skills",
            SectionKind::Certificates => "certificates",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::DEFAULT_ORDER.into_iter().find(|k| k.key() == key)
    }

    pub fn default_title(self) -> &'static str {
        match self {
            SectionKind::Education => "Education",
            SectionKind::Work => "Experience",
            SectionKind::Projects => "Projects",
            SectionKind::Skills => "Skills",
            SectionKind::Certificates => "Certifications",
        }
    }

    fn title_token(self) -> &'static str {
        match self {
            SectionKind::Education => "educationTitle",
            SectionKind::Work => "experienceTitle",
            SectionKind::Projects => "projectsTitle",
            SectionKind::Skills => "skillsTitle",
            SectionKind::Certificates => "certsTitle",
        }
    }

    fn show_token(self) -> &'static str {
        match self {
            SectionKind::Education => "showEducation",
            SectionKind::Work => "showExperience",
            SectionKind::Projects => "showProjects",
            SectionKind::Skills => "showSkills",
            SectionKind::Certificates => "showCerts",
        }
    }

    fn has_data(self, resume: &ResumeRoot) -> bool {
        match self {
            // Certificates may be shown under education, so they count too.
            SectionKind::Education => {
                !resume.education.is_empty() || !resume.certificates.is_empty()
            }
            SectionKind::Work => !resume.work.is_empty(),
            SectionKind::Projects => !resume.projects.is_empty(),
            SectionKind::Skills => !resume.skills.is_empty(),
            SectionKind::Certificates => !resume.certificates.is_empty(),
        }
    }
}

/// A section that made it into the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Escaped title.
    pub title: String,
    /// Rendered LaTeX body, never empty.
    pub block: String,
}

impl Section {
    fn to_latex(&self) -> String {
        let body = match self.kind {
            SectionKind::Skills => format!("{{\\small {}}}", self.block),
            _ => self.block.clone(),
        };
        format!("\\section*{{{}}}\n{}", self.title, body)
    }
}

/// Rendered bodies of every section, before enablement is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionBlocks {
    pub education: String,
    pub experience: String,
    pub projects: String,
    pub skills: String,
    pub certificates: String,
    /// True when certificates were appended to the education block.
    pub certificates_nested: bool,
}

impl SectionBlocks {
    fn get(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Education => &self.education,
            SectionKind::Work => &self.experience,
            SectionKind::Projects => &self.projects,
            SectionKind::Skills => &self.skills,
            SectionKind::Certificates => &self.certificates,
        }
    }
}

/// Whether `kind` is switched on.
///
/// Once any section config exists every section must opt in explicitly;
/// without one, sections with data switch themselves on.
pub fn section_enabled(kind: SectionKind, resume: &ResumeRoot, config: &DocumentConfig) -> bool {
    if config.has_section_config() {
        config
            .section(kind.key())
            .is_some_and(SectionConfig::is_enabled)
    } else {
        kind.has_data(resume)
    }
}

/// Escaped title of `kind`: configured title, else the built-in default.
pub fn section_title(kind: SectionKind, config: &DocumentConfig) -> String {
    let title = config
        .section(kind.key())
        .and_then(|s| s.title.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(kind.default_title());
    escape_latex(title)
}

/// Section order: declared config keys, else `section-order`, else the
/// default order. Unknown keys are dropped and duplicates keep their first
/// position.
pub fn section_order(config: &DocumentConfig) -> Vec<SectionKind> {
    let keys: Vec<&str> = if config.has_section_config() {
        config.sections.iter().map(|(k, _)| k.as_str()).collect()
    } else if !config.section_order.is_empty() {
        config.section_order.iter().map(String::as_str).collect()
    } else {
        SectionKind::DEFAULT_ORDER.iter().map(|k| k.key()).collect()
    };

    let mut order: Vec<SectionKind> = Vec::with_capacity(keys.len());
    for key in keys {
        match SectionKind::from_key(key) {
            Some(kind) if !order.contains(&kind) => order.push(kind),
            Some(_) => {}
            None => debug!("Section '{key}' has no document rendering; skipping"),
        }
    }
    order
}

// ────────────────────────────────────────────────────────────────────────────
// Entry rendering
// ────────────────────────────────────────────────────────────────────────────

fn text(value: Option<&String>) -> String {
    value.map(|v| escape_latex(v)).unwrap_or_default()
}

fn limit<T>(items: &[T], max: Option<usize>) -> &[T] {
    match max {
        Some(n) if n > 0 && n < items.len() => &items[..n],
        _ => items,
    }
}

fn entry_header(a: &str, b: &str, c: &str) -> String {
    format!("\\entry{{{a}}}{{{b}}}{{{c}}}{{")
}

fn itemize<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let lines: Vec<String> = items
        .into_iter()
        .map(|item| format!("\\item {}", escape_latex(item)))
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!(
        "\\begin{{itemize}}[leftmargin=*]\n{}\n\\end{{itemize}}",
        lines.join("\n")
    )
}

fn join_non_empty(parts: &[String], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(separator)
}

fn leading_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

/// Keeps work entries that started or ended within the last `years` years.
/// Ongoing entries end in `current_year`. Order is preserved.
pub fn filter_work_history(work: &[WorkEntry], years: Option<u32>, current_year: i32) -> Vec<&WorkEntry> {
    let Some(years) = years.filter(|y| *y > 0) else {
        return work.iter().collect();
    };
    let years = i64::from(years);
    work.iter()
        .filter(|w| {
            let end_year = leading_year(w.end_date.as_deref()).unwrap_or(current_year);
            let start_year = leading_year(w.start_date.as_deref()).unwrap_or(end_year);
            let age = |year: i32| i64::from(current_year) - i64::from(year);
            age(end_year) < years || age(start_year) < years
        })
        .collect()
}

/// Contact line: email, site, LinkedIn and location joined by bullets.
pub fn contact_line(basics: Option<&Basics>) -> String {
    let Some(b) = basics else {
        return String::new();
    };

    let email = b
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .map(|e| href(&format!("mailto:{e}"), &escape_latex(e)))
        .unwrap_or_default();

    let site = b
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(|u| href(u, &escape_latex(strip_protocol(u))))
        .unwrap_or_default();

    let linkedin = b
        .profiles
        .iter()
        .find(|p| {
            p.network
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case("linkedin"))
        })
        .and_then(|p| p.url.as_deref())
        .filter(|u| !u.is_empty())
        .map(|u| {
            let display = strip_protocol(u);
            let display = display.strip_prefix("www.").unwrap_or(display);
            let display = display.strip_suffix('/').unwrap_or(display);
            href(u, &escape_latex(display))
        })
        .unwrap_or_default();

    let location = b
        .location
        .as_ref()
        .map(|l| {
            let parts = [l.city.clone(), l.region.clone()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            escape_latex(&join_non_empty(&parts, ", "))
        })
        .unwrap_or_default();

    join_non_empty(&[email, site, linkedin, location], BULLET)
}

fn strip_protocol(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

fn render_education(
    entries: &[EducationEntry],
    config: &DocumentConfig,
    today: YearMonth,
) -> String {
    let show_coursework = config
        .section(SectionKind::Education.key())
        .and_then(|s| s.show_coursework)
        .unwrap_or(false);

    entries
        .iter()
        .map(|e| {
            let degree_parts = [e.study_type.clone(), e.area.clone()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            let degree = join_non_empty(&degree_parts, " in ");
            let date = format_date_at(e.end_date.as_deref(), &config.date_format, true, today);

            let mut inline: Vec<String> = e.achievements.iter().map(|a| escape_latex(a)).collect();
            if show_coursework && !e.courses.is_empty() {
                inline.push(format!(
                    "\\textit{{Coursework:}} {}",
                    escape_latex(&e.courses.join(", "))
                ));
            }
            let inline = join_non_empty(&inline, BULLET);
            let inline_line = if inline.is_empty() {
                String::new()
            } else {
                format!("{{\\small {inline}}}")
            };

            join_non_empty(
                &[
                    entry_header(
                        &text(e.institution.as_ref()),
                        &escape_latex(&degree),
                        &escape_latex(&date),
                    ),
                    inline_line,
                    "}".to_string(),
                ],
                "\n",
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_work(entries: &[&WorkEntry], config: &DocumentConfig, today: YearMonth) -> String {
    entries
        .iter()
        .map(|w| {
            let range = format_date_range_at(
                w.start_date.as_deref(),
                w.end_date.as_deref(),
                &config.date_format,
                today,
            );
            join_non_empty(
                &[
                    entry_header(
                        &text(w.name.as_ref()),
                        &text(w.position.as_ref()),
                        &escape_latex(&range),
                    ),
                    itemize(w.highlights.iter().chain(w.responsibilities.iter())),
                    "}".to_string(),
                ],
                "\n",
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_projects(entries: &[Project]) -> String {
    entries
        .iter()
        .map(|p| {
            let name = maybe_linked(p.name.as_deref().unwrap_or_default(), p.url.as_deref());
            join_non_empty(
                &[
                    entry_header(&name, "", ""),
                    text(p.description.as_ref()),
                    itemize(&p.highlights),
                    "}".to_string(),
                ],
                "\n",
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_skills(entries: &[Skill]) -> String {
    let names: Vec<String> = entries.iter().map(|s| text(s.name.as_ref())).collect();
    join_non_empty(&names, BULLET)
}

fn render_certificates(entries: &[Certificate], config: &DocumentConfig, today: YearMonth) -> String {
    entries
        .iter()
        .map(|c| {
            let date = format_date_at(c.date.as_deref(), &config.date_format, true, today);
            let name = maybe_linked(c.name.as_deref().unwrap_or_default(), c.url.as_deref());
            format!("{}}}", entry_header(&text(c.issuer.as_ref()), &name, &escape_latex(&date)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

/// Renders every section body, applying filters and limits first and nesting
/// certificates under education when both sections opt in.
pub fn render_blocks(resume: &ResumeRoot, config: &DocumentConfig, today: YearMonth) -> SectionBlocks {
    let cfg = |kind: SectionKind| config.section(kind.key());

    let work = filter_work_history(
        &resume.work,
        cfg(SectionKind::Work).and_then(|s| s.work_history_years),
        today.year,
    );
    let projects = limit(
        &resume.projects,
        cfg(SectionKind::Projects).and_then(|s| s.max_projects),
    );
    let skills = limit(
        &resume.skills,
        cfg(SectionKind::Skills).and_then(|s| s.max_skills),
    );
    let certificates = limit(
        &resume.certificates,
        cfg(SectionKind::Certificates).and_then(|s| s.max_certifications),
    );
    debug!(
        "Rendering {} work, {} education, {} project, {} skill, {} certificate entries",
        work.len(),
        resume.education.len(),
        projects.len(),
        skills.len(),
        certificates.len()
    );

    let mut blocks = SectionBlocks {
        education: render_education(&resume.education, config, today),
        experience: render_work(&work, config, today),
        projects: render_projects(projects),
        skills: render_skills(skills),
        certificates: render_certificates(certificates, config, today),
        certificates_nested: false,
    };

    let certs_cfg = cfg(SectionKind::Certificates);
    let nest = certs_cfg.and_then(|c| c.parent.as_deref()) == Some(PARENT_EDUCATION)
        && cfg(SectionKind::Education).is_some_and(SectionConfig::is_enabled)
        && certs_cfg.is_some_and(SectionConfig::is_enabled);
    if nest {
        blocks.education = join_non_empty(
            &[blocks.education.clone(), blocks.certificates.clone()],
            "\n\n",
        );
        blocks.certificates_nested = true;
    }
    blocks
}

/// The sections that appear in the document, in order.
pub fn build_sections(
    resume: &ResumeRoot,
    config: &DocumentConfig,
    blocks: &SectionBlocks,
) -> Vec<Section> {
    section_order(config)
        .into_iter()
        .filter(|kind| section_enabled(*kind, resume, config))
        .filter(|kind| !(*kind == SectionKind::Certificates && blocks.certificates_nested))
        .filter_map(|kind| {
            let block = blocks.get(kind);
            (!block.is_empty()).then(|| Section {
                kind,
                title: section_title(kind, config),
                block: block.to_string(),
            })
        })
        .collect()
}

/// Builds the template context relative to the current month.
pub fn build_context(resume: &ResumeRoot, config: &DocumentConfig) -> Context {
    build_context_at(resume, config, YearMonth::now())
}

/// Builds the template context with `today` as the reference month.
pub fn build_context_at(resume: &ResumeRoot, config: &DocumentConfig, today: YearMonth) -> Context {
    let basics = resume.basics.as_ref();
    let blocks = render_blocks(resume, config, today);
    let sections = build_sections(resume, config, &blocks);

    let mut ctx = Context::default();
    ctx.insert("name", text(basics.and_then(|b| b.name.as_ref())));
    ctx.insert("label", text(basics.and_then(|b| b.label.as_ref())));
    ctx.insert("contactLine", contact_line(basics));

    ctx.insert("educationBlock", blocks.education.as_str());
    ctx.insert("experienceBlock", blocks.experience.as_str());
    ctx.insert("projectsBlock", blocks.projects.as_str());
    ctx.insert("skillsBlock", blocks.skills.as_str());
    ctx.insert("certsBlock", blocks.certificates.as_str());
    ctx.insert(
        "dynamicSections",
        sections
            .iter()
            .map(Section::to_latex)
            .collect::<Vec<_>>()
            .join("\n\n"),
    );

    for kind in SectionKind::DEFAULT_ORDER {
        ctx.insert(kind.title_token(), section_title(kind, config));
        let flag = if section_enabled(kind, resume, config) { "1" } else { "" };
        ctx.insert(kind.show_token(), flag);
    }

    let subject = resume.subject_name();
    let meta_title = config
        .metadata
        .title
        .clone()
        .or_else(|| subject.map(|n| format!("{n} – Resume")))
        .unwrap_or_else(|| "Resume".to_string());
    let meta_author = config
        .metadata
        .author
        .clone()
        .or_else(|| subject.map(str::to_string))
        .unwrap_or_else(|| "Anonymous".to_string());
    ctx.insert("metaTitle", escape_latex(&meta_title));
    ctx.insert("metaAuthor", escape_latex(&meta_author));

    ctx.insert("topmargin", config.margins.top.as_str());
    ctx.insert("bottommargin", config.margins.bottom.as_str());
    ctx.insert("leftmargin", config.margins.left.as_str());
    ctx.insert("rightmargin", config.margins.right.as_str());
    ctx.insert("mainfont", config.main_font.as_str());
    ctx.insert("fontCascadeCode", build_font_cascade(&config.font_candidates));

    debug!(
        "Built context with {} tokens and {} visible sections",
        ctx.len(),
        sections.len()
    );
    ctx
}
