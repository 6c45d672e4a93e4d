//! Derived listing projections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::content::ContentLine;
use crate::utils::date::DeadlineInfo;

/// Upstream system a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobSource {
    #[serde(rename = "RNDJOB")]
    RndJob,
    #[serde(rename = "병역일터")]
    Military,
}

impl JobSource {
    /// Classify a raw `source_type` tag. Unrecognized tags fall back to `RndJob`.
    pub fn classify(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "military" | "병역일터" => Self::Military,
            _ => Self::RndJob,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RndJob => "RNDJOB",
            Self::Military => "병역일터",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for JobSource {
    type Err = String;

    /// Strict parse of a filter value: accepts labels and raw tags only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rndjob" => Ok(Self::RndJob),
            "military" | "병역일터" => Ok(Self::Military),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

/// Body content of a posting, kept as it was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Lines(Vec<String>),
}

impl Content {
    /// Collapse into a single newline-joined string.
    pub fn joined(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Summary shape used by list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    /// 1-based position in the source file
    pub id: usize,
    pub title: String,
    pub company: String,
    /// First token of the region, or the nationwide label
    pub location: String,
    pub thumbnail: String,
    /// At most three keywords
    pub keywords: Vec<String>,
    /// Relative time since the last update
    pub updated_at: String,
    pub days_left: i64,
    pub is_urgent: bool,
    pub source: JobSource,
    pub url: String,
    /// Raw registration date, kept for sorting
    pub registration_date: String,
}

/// Detail shape used by single-listing views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub id: usize,
    pub post_name: String,
    pub company_name: String,
    pub deadline: String,
    /// Countdown, absent for always-open or unparseable deadlines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_info: Option<DeadlineInfo>,
    pub registration_date: String,
    pub region: String,
    pub field: String,
    pub qualification_agent: String,
    pub qualification_education: String,
    pub qualification_career: String,
    /// Original body content
    pub keywords_list: Content,
    /// Body split into normalized lines
    pub body: Vec<ContentLine>,
    pub source_info: String,
    /// Source label, e.g. `병역일터`
    pub source_type: String,
    pub thumbnail: String,
    /// At most five keywords
    pub keywords: Vec<String>,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(JobSource::classify("military"), JobSource::Military);
        assert_eq!(JobSource::classify("MILITARY"), JobSource::Military);
        assert_eq!(JobSource::classify("rndjob"), JobSource::RndJob);
        assert_eq!(JobSource::classify("saramin"), JobSource::RndJob);
        assert_eq!(JobSource::classify(""), JobSource::RndJob);
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("RNDJOB".parse::<JobSource>(), Ok(JobSource::RndJob));
        assert_eq!("병역일터".parse::<JobSource>(), Ok(JobSource::Military));
        assert!("saramin".parse::<JobSource>().is_err());
    }

    #[test]
    fn test_source_serializes_as_label() {
        let json = serde_json::to_string(&JobSource::Military).unwrap();
        assert_eq!(json, "\"병역일터\"");
    }

    #[test]
    fn test_content_untagged() {
        let text: Content = serde_json::from_str("\"a\\nb\"").unwrap();
        let lines: Content = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(text.joined(), lines.joined());
    }
}
