// src/linkedin/types.rs
use serde::{Deserialize, Serialize};

/// One scraped profile. Field order is the on-disk key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub linkedin_url: String,
    pub name: String,
    pub about: Option<String>,
    pub location: String,
    #[serde(default)]
    pub open_to_work: bool,
    pub experiences: Vec<ExperienceEntry>,
    pub educations: Vec<EducationEntry>,
    pub interests: Vec<InterestEntry>,
    pub accomplishments: Vec<AccomplishmentEntry>,
    pub contacts: Vec<ContactEntry>,
}

impl ProfileRecord {
    pub fn new(linkedin_url: &str) -> Self {
        Self {
            linkedin_url: linkedin_url.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub institution_name: String,
    pub linkedin_url: Option<String>,
    pub from_date: String,
    pub to_date: String,
    pub description: String,
    pub position_title: String,
    pub duration: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution_name: String,
    pub linkedin_url: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub description: String,
    pub degree: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestEntry {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccomplishmentEntry {
    pub category: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub name: String,
    pub occupation: String,
    pub url: Option<String>,
}

/// Outcome of one profile section extractor.
///
/// `NotFound` means the section's container never appeared; `Failed` carries a
/// diagnostic for anything else that went wrong. Both leave the field at its
/// default value.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Found(T),
    NotFound,
    Failed(String),
}

impl<T: Default> Section<T> {
    pub fn into_value(self) -> T {
        match self {
            Section::Found(value) => value,
            Section::NotFound | Section::Failed(_) => T::default(),
        }
    }
}

impl<T> Section<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Section::Found(_))
    }
}

/// A section that degraded during a scrape, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionNotice {
    pub section: &'static str,
    pub detail: String,
}

impl SectionNotice {
    pub fn message(&self) -> String {
        format!("Section '{}' not found, continuing ({})", self.section, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_into_value_defaults() {
        let found: Section<Vec<u8>> = Section::Found(vec![1, 2]);
        assert_eq!(found.into_value(), vec![1, 2]);

        let missing: Section<Vec<u8>> = Section::NotFound;
        assert!(missing.into_value().is_empty());

        let failed: Section<Option<String>> = Section::Failed("boom".to_string());
        assert_eq!(failed.into_value(), None);
    }

    #[test]
    fn test_profile_key_order() {
        let record = ProfileRecord::new("https://www.linkedin.com/in/jane/");
        let json = serde_json::to_string(&record).unwrap();
        let keys = [
            "linkedin_url",
            "name",
            "about",
            "location",
            "open_to_work",
            "experiences",
            "educations",
            "interests",
            "accomplishments",
            "contacts",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{}\"", k)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
