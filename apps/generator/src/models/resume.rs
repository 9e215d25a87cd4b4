//! Resume content tree: a JSON Resume v1 subset as authored in `resume.yaml`.
//!
//! Every field is optional. Consumers treat absence as "render nothing" rather
//! than as an error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeRoot {
    pub basics: Option<Basics>,
    pub work: Vec<WorkEntry>,
    pub education: Vec<EducationEntry>,
    pub certificates: Vec<Certificate>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Basics {
    pub name: Option<String>,
    pub label: Option<String>,
    pub image: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    /// May contain HTML on the site; not used by the LaTeX output.
    pub summary: Option<String>,
    pub location: Option<Location>,
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub network: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkEntry {
    /// Company name.
    pub name: Option<String>,
    pub position: Option<String>,
    pub url: Option<String>,
    /// `YYYY-MM` or `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Absent for ongoing positions.
    pub end_date: Option<String>,
    pub summary: Option<String>,
    pub highlights: Vec<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationEntry {
    pub institution: Option<String>,
    pub study_type: Option<String>,
    pub area: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// GPA or similar.
    pub score: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub location: Option<Location>,
    pub achievements: Vec<String>,
    pub courses: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certificate {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Source repository link, shown as a "Code" button on the site.
    pub code_url: Option<String>,
    pub highlights: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    pub name: Option<String>,
    pub level: Option<String>,
    pub keywords: Vec<String>,
}

impl ResumeRoot {
    /// The subject's name, if present and non-blank.
    pub fn subject_name(&self) -> Option<&str> {
        self.basics
            .as_ref()
            .and_then(|b| b.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_document_deserializes_to_defaults() {
        let resume: ResumeRoot = serde_yaml::from_str("{}").unwrap();
        assert_eq!(resume, ResumeRoot::default());
        assert!(resume.subject_name().is_none());
    }

    #[test]
    fn test_camel_case_keys_are_recognised() {
        let yaml = r#"
basics:
  name: Ada Lovelace
  location:
    city: London
    postalCode: NW1
work:
  - name: Analytical Engines Ltd
    startDate: 1842-01
    responsibilities: [Notes]
education:
  - institution: Home
    studyType: Tutoring
projects:
  - name: Note G
    codeUrl: https://example.com/g
"#;
        let resume: ResumeRoot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(resume.subject_name(), Some("Ada Lovelace"));
        let basics = resume.basics.as_ref().unwrap();
        assert_eq!(
            basics.location.as_ref().unwrap().postal_code.as_deref(),
            Some("NW1")
        );
        assert_eq!(resume.work[0].start_date.as_deref(), Some("1842-01"));
        assert!(resume.work[0].end_date.is_none());
        assert_eq!(resume.work[0].responsibilities, vec!["Notes".to_string()]);
        assert_eq!(resume.education[0].study_type.as_deref(), Some("Tutoring"));
        assert_eq!(
            resume.projects[0].code_url.as_deref(),
            Some("https://example.com/g")
        );
    }

    #[test]
    fn test_blank_name_is_treated_as_absent() {
        let resume = ResumeRoot {
            basics: Some(Basics {
                name: Some("   ".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(resume.subject_name().is_none());
    }
}
