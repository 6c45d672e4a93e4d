// src/pipeline/map.rs

//! Raw row → listing projections.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::models::{
    Config, JobSource, ListingConfig, ListingDetail, ListingSummary, LocaleConfig, RawRow,
};
use crate::pipeline::keywords::{detail_keywords, summary_keywords};
use crate::utils::content::{normalize_lines, parse_body};
use crate::utils::date::{days_until, deadline_info, relative_time};

/// Clock and rules shared by every row mapped in one request.
#[derive(Debug, Clone)]
pub struct MapContext<'a> {
    pub now: DateTime<Utc>,
    pub listing: &'a ListingConfig,
    pub locale: &'a LocaleConfig,
}

impl<'a> MapContext<'a> {
    /// Context evaluated at the current time.
    pub fn new(config: &'a Config) -> Self {
        Self::at(config, Utc::now())
    }

    /// Context evaluated at a fixed instant.
    pub fn at(config: &'a Config, now: DateTime<Utc>) -> Self {
        Self {
            now,
            listing: &config.listing,
            locale: &config.locale,
        }
    }

    fn offset(&self) -> FixedOffset {
        self.listing
            .utc_offset()
            .unwrap_or_else(|| Utc.fix())
    }
}

/// First whitespace token of a region, or the nationwide label.
pub fn short_location(region: &str, locale: &LocaleConfig) -> String {
    region
        .split_whitespace()
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| locale.nationwide.clone())
}

/// Map a row to its list summary. `index` is the 0-based row position.
pub fn to_summary(row: &RawRow, index: usize, ctx: &MapContext<'_>) -> ListingSummary {
    let days_left = days_until(&row.deadline, ctx.now, ctx.listing);

    ListingSummary {
        id: index + 1,
        title: row.post_name.clone(),
        company: row.company_name.clone(),
        location: short_location(&row.region, ctx.locale),
        thumbnail: ctx.listing.summary_thumbnail.clone(),
        keywords: summary_keywords(&row.field, &row.keywords_list),
        updated_at: relative_time(&row.update_date, ctx.now, ctx.offset(), ctx.locale),
        days_left,
        is_urgent: days_left > 0 && days_left <= ctx.listing.urgent_threshold_days,
        source: JobSource::classify(&row.source_type),
        url: row.source_info.clone(),
        registration_date: row.registration_date.clone(),
    }
}

/// Map a row to its detail view under the given id.
pub fn to_detail(row: &RawRow, id: usize, ctx: &MapContext<'_>) -> ListingDetail {
    let content = parse_body(&row.keywords_list);
    let body = normalize_lines(&content);

    ListingDetail {
        id,
        post_name: row.post_name.clone(),
        company_name: row.company_name.clone(),
        deadline: row.deadline.clone(),
        deadline_info: deadline_info(&row.deadline, ctx.now, ctx.listing, ctx.locale),
        registration_date: row.registration_date.clone(),
        region: row.region.clone(),
        field: row.field.clone(),
        qualification_agent: row.qualification_agent.clone(),
        qualification_education: row.qualification_education.clone(),
        qualification_career: row.qualification_career.clone(),
        keywords: detail_keywords(&content.joined(), &row.field),
        keywords_list: content,
        body,
        source_info: row.source_info.clone(),
        source_type: JobSource::classify(&row.source_type).label().to_string(),
        thumbnail: ctx.listing.detail_thumbnail.clone(),
        status: row.status.clone(),
    }
}

/// Map every row, numbering from 1 in source order.
pub fn to_summaries(rows: &[RawRow], ctx: &MapContext<'_>) -> Vec<ListingSummary> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| to_summary(row, i, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::models::Content;
    use crate::utils::content::LineKind;

    fn now() -> DateTime<Utc> {
        // 2025-06-20 10:00 KST
        Utc.with_ymd_and_hms(2025, 6, 20, 1, 0, 0).unwrap()
    }

    fn sample_row() -> RawRow {
        RawRow {
            company_name: "삼성전자".into(),
            post_name: "[삼성전자] AI 연구원 전문연구요원 채용".into(),
            registration_date: "2025-06-15".into(),
            deadline: "2025-06-25".into(),
            qualification_agent: "신규, 편입".into(),
            qualification_education: "석사 이상".into(),
            qualification_career: "신입".into(),
            region: "서울특별시 강남구 테헤란로".into(),
            field: "인공지능 AI".into(),
            keywords_list: "['1. 담당업무', '- Python, PyTorch 기반 모델 개발']".into(),
            source_info: "https://example.com/1".into(),
            source_type: "rndjob".into(),
            update_date: "2025-06-19 04:00:00".into(),
            status: "open".into(),
        }
    }

    #[test]
    fn test_summary_fields() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let summary = to_summary(&sample_row(), 0, &ctx);

        assert_eq!(summary.id, 1);
        assert_eq!(summary.location, "서울특별시");
        assert_eq!(summary.days_left, 5);
        assert!(summary.is_urgent);
        assert_eq!(summary.source, JobSource::RndJob);
        assert_eq!(summary.keywords, vec!["AI", "PyTorch"]);
        assert_eq!(summary.updated_at, "1 days ago");
        assert_eq!(summary.registration_date, "2025-06-15");
    }

    #[test]
    fn test_always_open_is_not_urgent() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let row = RawRow {
            deadline: "상시채용".into(),
            ..sample_row()
        };
        let summary = to_summary(&row, 4, &ctx);

        assert_eq!(summary.id, 5);
        assert_eq!(summary.days_left, 999);
        assert!(!summary.is_urgent);
    }

    #[test]
    fn test_expired_deadline_is_not_urgent() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let row = RawRow {
            deadline: "2025-06-01".into(),
            ..sample_row()
        };
        let summary = to_summary(&row, 0, &ctx);
        assert_eq!(summary.days_left, 0);
        assert!(!summary.is_urgent);
    }

    #[test]
    fn test_update_thirty_hours_ago() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let updated = (now() - Duration::hours(30)).to_rfc3339();
        let row = RawRow {
            update_date: updated,
            ..sample_row()
        };
        assert_eq!(to_summary(&row, 0, &ctx).updated_at, "1 days ago");
    }

    #[test]
    fn test_empty_region_is_nationwide() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let row = RawRow {
            region: "".into(),
            source_type: "MILITARY".into(),
            ..sample_row()
        };
        let summary = to_summary(&row, 0, &ctx);
        assert_eq!(summary.location, "nationwide");
        assert_eq!(summary.source, JobSource::Military);
    }

    #[test]
    fn test_detail_fields() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let detail = to_detail(&sample_row(), 7, &ctx);

        assert_eq!(detail.id, 7);
        assert_eq!(detail.source_type, "RNDJOB");
        assert_eq!(detail.region, "서울특별시 강남구 테헤란로");
        assert_eq!(
            detail.keywords_list,
            Content::Lines(vec![
                "1. 담당업무".into(),
                "- Python, PyTorch 기반 모델 개발".into()
            ])
        );
        assert_eq!(detail.body.len(), 2);
        assert_eq!(detail.body[1].kind, LineKind::ListItem);
        assert_eq!(detail.keywords, vec!["Python", "PyTorch", "AI"]);
        assert_eq!(detail.thumbnail, config.listing.detail_thumbnail);

        let info = detail.deadline_info.expect("dated deadline has a countdown");
        assert_eq!(info.d_day, 5);
        assert_eq!(info.display, "D-5");
    }

    #[test]
    fn test_to_summaries_numbers_from_one() {
        let config = Config::default();
        let ctx = MapContext::at(&config, now());
        let rows = vec![sample_row(), sample_row(), sample_row()];
        let ids: Vec<usize> = to_summaries(&rows, &ctx).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
