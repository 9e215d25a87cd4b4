//! Structural validation of the resume tree against the JSON Resume subset the
//! site and the document generator rely on.
//!
//! Validation never mutates or rejects data by itself: it reports issues and
//! the loader decides (strict mode) whether they are fatal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::resume::{Location, ResumeRoot};

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12]\d|3[01]))?)?$").expect("valid regex")
});
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));
static HTTP_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid regex"));

/// One problem found in the content tree, addressed by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn date(&mut self, path: &str, value: Option<&String>) {
        if let Some(v) = value {
            if !ISO_DATE.is_match(v) {
                self.issues.push(ValidationIssue::new(
                    path,
                    format!("'{v}' must be an ISO date (YYYY, YYYY-MM or YYYY-MM-DD)"),
                ));
            }
        }
    }

    fn url(&mut self, path: &str, value: Option<&String>) {
        if let Some(v) = value {
            if !HTTP_URL.is_match(v) {
                self.issues.push(ValidationIssue::new(
                    path,
                    format!("'{v}' must be an http(s) URL"),
                ));
            }
        }
    }

    fn email(&mut self, path: &str, value: Option<&String>) {
        if let Some(v) = value {
            if !EMAIL.is_match(v) {
                self.issues.push(ValidationIssue::new(
                    path,
                    format!("'{v}' must be an email address"),
                ));
            }
        }
    }

    fn required(&mut self, path: &str, value: Option<&String>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.issues
                .push(ValidationIssue::new(path, "is required and must not be empty"));
        }
    }

    fn location(&mut self, path: &str, location: Option<&Location>) {
        if let Some(loc) = location {
            if let Some(code) = &loc.country_code {
                if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    self.issues.push(ValidationIssue::new(
                        format!("{path}/countryCode"),
                        format!("'{code}' must be a two-letter country code"),
                    ));
                }
            }
        }
    }
}

/// Checks the resume tree and returns every issue found, in document order.
pub fn validate_resume(resume: &ResumeRoot) -> Vec<ValidationIssue> {
    let mut v = Validator::default();

    if let Some(b) = &resume.basics {
        v.email("/basics/email", b.email.as_ref());
        v.url("/basics/url", b.url.as_ref());
        v.location("/basics/location", b.location.as_ref());
        for (i, p) in b.profiles.iter().enumerate() {
            v.required(&format!("/basics/profiles/{i}/network"), p.network.as_ref());
            v.url(&format!("/basics/profiles/{i}/url"), p.url.as_ref());
        }
    }

    for (i, w) in resume.work.iter().enumerate() {
        v.url(&format!("/work/{i}/url"), w.url.as_ref());
        v.date(&format!("/work/{i}/startDate"), w.start_date.as_ref());
        v.date(&format!("/work/{i}/endDate"), w.end_date.as_ref());
    }

    for (i, e) in resume.education.iter().enumerate() {
        v.url(&format!("/education/{i}/url"), e.url.as_ref());
        v.date(&format!("/education/{i}/startDate"), e.start_date.as_ref());
        v.date(&format!("/education/{i}/endDate"), e.end_date.as_ref());
        v.location(&format!("/education/{i}/location"), e.location.as_ref());
    }

    for (i, c) in resume.certificates.iter().enumerate() {
        v.date(&format!("/certificates/{i}/date"), c.date.as_ref());
        v.url(&format!("/certificates/{i}/url"), c.url.as_ref());
    }

    for (i, p) in resume.projects.iter().enumerate() {
        v.url(&format!("/projects/{i}/url"), p.url.as_ref());
        v.url(&format!("/projects/{i}/codeUrl"), p.code_url.as_ref());
    }

    for (i, s) in resume.skills.iter().enumerate() {
        v.required(&format!("/skills/{i}/name"), s.name.as_ref());
    }

    v.issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Basics, Certificate, Profile, Skill, WorkEntry};

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_empty_resume_is_valid() {
        assert!(validate_resume(&ResumeRoot::default()).is_empty());
    }

    #[test]
    fn test_partial_iso_dates_pass() {
        let resume = ResumeRoot {
            work: vec![WorkEntry {
                start_date: s("2020"),
                end_date: s("2024-07-31"),
                ..Default::default()
            }],
            certificates: vec![Certificate {
                date: s("2023-01"),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(validate_resume(&resume).is_empty());
    }

    #[test]
    fn test_bad_dates_are_reported_with_paths() {
        let resume = ResumeRoot {
            work: vec![
                WorkEntry::default(),
                WorkEntry {
                    start_date: s("July 2020"),
                    end_date: s("2024-13"),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let issues = validate_resume(&resume);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["/work/1/startDate", "/work/1/endDate"]);
    }

    #[test]
    fn test_basics_email_url_and_profiles() {
        let resume = ResumeRoot {
            basics: Some(Basics {
                email: s("not-an-email"),
                url: s("ada.dev"),
                location: Some(Location {
                    country_code: s("GBR"),
                    ..Default::default()
                }),
                profiles: vec![Profile {
                    network: s(" "),
                    url: s("https://linkedin.com/in/ada"),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };
        let paths: Vec<String> = validate_resume(&resume).into_iter().map(|i| i.path).collect();
        assert_eq!(
            paths,
            vec![
                "/basics/email",
                "/basics/url",
                "/basics/location/countryCode",
                "/basics/profiles/0/network",
            ]
        );
    }

    #[test]
    fn test_skill_names_required() {
        let resume = ResumeRoot {
            skills: vec![
                Skill {
                    name: s("Rust"),
                    ..Default::default()
                },
                Skill::default(),
            ],
            ..Default::default()
        };
        let issues = validate_resume(&resume);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "/skills/1/name");
    }
}
