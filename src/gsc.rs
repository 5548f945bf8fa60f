use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::FetchError;
use crate::record::QueryRecord;

static API_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://www.googleapis.com/webmasters/v3/").unwrap());
/// Search analytics caps a single response at this many rows.
const MAX_ROWS_PER_REQUEST: usize = 25_000;

pub const DEFAULT_DAYS: i64 = 90;
pub const DEFAULT_ROW_LIMIT: usize = 5000;

/// Date range and row cap for one search-analytics pull.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub row_limit: usize,
}

impl FetchRequest {
    /// `days` back from `end_date`, inclusive of both ends.
    pub fn last_days(end_date: NaiveDate, days: i64, row_limit: usize) -> Self {
        FetchRequest {
            start_date: end_date - Duration::days(days),
            end_date,
            row_limit,
        }
    }
}

#[derive(Deserialize)]
struct SiteList {
    #[serde(default, rename = "siteEntry")]
    site_entry: Vec<SiteEntry>,
}

#[derive(Deserialize)]
struct SiteEntry {
    #[serde(rename = "siteUrl")]
    site_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsQuery {
    start_date: String,
    end_date: String,
    dimensions: [&'static str; 2],
    row_limit: usize,
    start_row: usize,
}

#[derive(Deserialize)]
struct AnalyticsResponse {
    #[serde(default)]
    rows: Vec<AnalyticsRow>,
}

#[derive(Deserialize)]
struct AnalyticsRow {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    impressions: f64,
    #[serde(default)]
    ctr: f64,
    #[serde(default)]
    position: Option<f64>,
}

/// Search Console client authenticated with an already-issued access token.
pub struct GscClient {
    http: reqwest::Client,
    token: String,
}

impl GscClient {
    pub fn new(token: impl Into<String>) -> Self {
        GscClient {
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    /// Properties the token can read.
    pub async fn list_sites(&self) -> Result<Vec<String>, FetchError> {
        let url = endpoint(&["sites"]);
        let resp = self.http.get(url).bearer_auth(&self.token).send().await?;
        let list: SiteList = check(resp).await?.json().await?;
        Ok(site_urls(list))
    }

    /// Query x page rows for `site`, paged until the row cap or a short page.
    pub async fn fetch_queries(
        &self,
        site: &str,
        req: &FetchRequest,
    ) -> Result<Vec<QueryRecord>, FetchError> {
        let url = endpoint(&["sites", site, "searchAnalytics", "query"]);
        info!(
            "Fetching search analytics for {} ({} to {}, up to {} rows)",
            site, req.start_date, req.end_date, req.row_limit
        );

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        let mut records = Vec::new();
        while records.len() < req.row_limit {
            let page_size = (req.row_limit - records.len()).min(MAX_ROWS_PER_REQUEST);
            let body = AnalyticsQuery {
                start_date: req.start_date.to_string(),
                end_date: req.end_date.to_string(),
                dimensions: ["query", "page"],
                row_limit: page_size,
                start_row: records.len(),
            };
            let resp = self
                .http
                .post(url.clone())
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await?;
            let page: AnalyticsResponse = check(resp).await?.json().await?;
            let returned = page.rows.len();
            records.extend(to_records(page.rows));
            pb.set_message(format!("{} rows", records.len()));

            if returned < page_size {
                break;
            }
        }

        pb.finish_and_clear();
        info!("Fetched {} rows from Search Console", records.len());
        Ok(records)
    }

}

/// API base plus `segments`, each percent-encoded as a single path segment.
fn endpoint(segments: &[&str]) -> Url {
    let mut url = API_BASE.clone();
    // An https base always has path segments.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(FetchError::Api { status, body })
}

fn site_urls(list: SiteList) -> Vec<String> {
    list.site_entry
        .into_iter()
        .filter_map(|e| e.site_url)
        .collect()
}

fn to_records(rows: Vec<AnalyticsRow>) -> Vec<QueryRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let mut keys = row.keys.into_iter();
            let (Some(query), Some(url)) = (keys.next(), keys.next()) else {
                warn!("Skipping search analytics row without query/page keys");
                return None;
            };
            Some(QueryRecord {
                query,
                url,
                clicks: row.clicks.max(0.0).round() as u64,
                impressions: row.impressions.max(0.0).round() as u64,
                ctr: row.ctr,
                position: row.position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_decode_with_default_metrics() {
        let json = r#"{
            "rows": [
                {"keys": ["best trail shoes for women", "https://example.com/trail"],
                 "clicks": 12, "impressions": 480, "ctr": 0.025, "position": 6.4},
                {"keys": ["waterproof boots", "https://example.com/boots"]},
                {"keys": ["orphan"]}
            ],
            "responseAggregationType": "byPage"
        }"#;
        let resp: AnalyticsResponse = serde_json::from_str(json).unwrap();
        let records = to_records(resp.rows);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].query, "best trail shoes for women");
        assert_eq!(records[0].url, "https://example.com/trail");
        assert_eq!(records[0].clicks, 12);
        assert_eq!(records[0].impressions, 480);
        assert_eq!(records[1].clicks, 0);
        assert_eq!(records[1].position, None);
    }

    #[test]
    fn empty_response_has_no_rows() {
        let resp: AnalyticsResponse = serde_json::from_str("{}").unwrap();
        assert!(to_records(resp.rows).is_empty());
    }

    #[test]
    fn site_entries_without_url_skipped() {
        let json = r#"{"siteEntry": [
            {"siteUrl": "sc-domain:example.com", "permissionLevel": "siteOwner"},
            {"permissionLevel": "siteUnverifiedUser"},
            {"siteUrl": "https://shop.example.com/", "permissionLevel": "siteFullUser"}
        ]}"#;
        let list: SiteList = serde_json::from_str(json).unwrap();
        assert_eq!(
            site_urls(list),
            vec!["sc-domain:example.com", "https://shop.example.com/"]
        );
    }

    #[test]
    fn site_url_is_escaped_as_one_segment() {
        let url = endpoint(&["sites", "https://shop.example.com/", "searchAnalytics", "query"]);
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/webmasters/v3/sites/https:%2F%2Fshop.example.com%2F/searchAnalytics/query"
        );
    }

    #[test]
    fn request_body_uses_api_field_names() {
        let body = AnalyticsQuery {
            start_date: "2026-07-21".into(),
            end_date: "2026-10-19".into(),
            dimensions: ["query", "page"],
            row_limit: 5000,
            start_row: 0,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["startDate"], "2026-07-21");
        assert_eq!(v["rowLimit"], 5000);
        assert_eq!(v["startRow"], 0);
        assert_eq!(v["dimensions"][1], "page");
    }

    #[test]
    fn ninety_day_window() {
        let end = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let req = FetchRequest::last_days(end, DEFAULT_DAYS, DEFAULT_ROW_LIMIT);
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2026, 7, 21).unwrap());
        assert_eq!(req.row_limit, 5000);
    }
}
