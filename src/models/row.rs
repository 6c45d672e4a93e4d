//! Raw tabular row as read from the source file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Header names of the source file, in canonical order.
pub const COLUMNS: [&str; 14] = [
    "company_name",
    "post_name",
    "registration_date",
    "deadline",
    "qualification_agent",
    "qualification_education",
    "qualification_career",
    "region",
    "Field",
    "keywords_list",
    "source_info",
    "source_type",
    "update_date",
    "status",
];

/// One job posting row. Every field is text; missing columns are empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawRow {
    pub company_name: String,
    pub post_name: String,
    pub registration_date: String,
    /// A calendar date or an always-open sentinel
    pub deadline: String,
    pub qualification_agent: String,
    pub qualification_education: String,
    pub qualification_career: String,
    pub region: String,
    #[serde(rename = "Field")]
    pub field: String,
    /// Body text, possibly a serialized list of lines
    pub keywords_list: String,
    pub source_info: String,
    pub source_type: String,
    pub update_date: String,
    pub status: String,
}

impl RawRow {
    /// Build a row from a header-to-position map and the record's fields.
    ///
    /// Unknown headers are ignored; absent columns become `""`.
    pub fn from_fields<'a>(
        header_index: &HashMap<String, usize>,
        fields: impl Fn(usize) -> Option<&'a str>,
    ) -> Self {
        let get = |name: &str| -> String {
            header_index
                .get(name)
                .and_then(|&i| fields(i))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        Self {
            company_name: get("company_name"),
            post_name: get("post_name"),
            registration_date: get("registration_date"),
            deadline: get("deadline"),
            qualification_agent: get("qualification_agent"),
            qualification_education: get("qualification_education"),
            qualification_career: get("qualification_career"),
            region: get("region"),
            field: get("Field"),
            keywords_list: get("keywords_list"),
            source_info: get("source_info"),
            source_type: get("source_type"),
            update_date: get("update_date"),
            status: get("status"),
        }
    }

    /// True when every field is empty.
    pub fn is_blank(&self) -> bool {
        [
            &self.company_name,
            &self.post_name,
            &self.registration_date,
            &self.deadline,
            &self.qualification_agent,
            &self.qualification_education,
            &self.qualification_career,
            &self.region,
            &self.field,
            &self.keywords_list,
            &self.source_info,
            &self.source_type,
            &self.update_date,
            &self.status,
        ]
        .iter()
        .all(|v| v.is_empty())
    }
}

/// Map trimmed header names to their column positions.
pub fn header_index<'a>(headers: impl IntoIterator<Item = &'a str>) -> HashMap<String, usize> {
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_are_empty() {
        let index = header_index(["company_name", "post_name", "Field"]);
        let values = ["  삼성전자 ", "AI 연구원", " 인공지능/머신러닝"];
        let row = RawRow::from_fields(&index, |i| values.get(i).copied());

        assert_eq!(row.company_name, "삼성전자");
        assert_eq!(row.post_name, "AI 연구원");
        assert_eq!(row.field, "인공지능/머신러닝");
        assert_eq!(row.deadline, "");
        assert_eq!(row.status, "");
        assert!(!row.is_blank());
    }

    #[test]
    fn test_short_record_yields_empty_tail() {
        let index = header_index(COLUMNS);
        let values = ["회사"];
        let row = RawRow::from_fields(&index, |i| values.get(i).copied());

        assert_eq!(row.company_name, "회사");
        assert_eq!(row.update_date, "");
    }

    #[test]
    fn test_header_bom_is_stripped() {
        let index = header_index(["\u{feff}company_name", " post_name "]);
        assert_eq!(index.get("company_name"), Some(&0));
        assert_eq!(index.get("post_name"), Some(&1));
    }

    #[test]
    fn test_blank_row() {
        assert!(RawRow::default().is_blank());
    }
}
