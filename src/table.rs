use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::InputError;
use crate::pipeline::Report;
use crate::record::{PageList, QueryRecord};

const QUERIES: &str = "query";
const PAGES: &str = "page";

const QUERY_COLUMNS: [&str; 6] = ["query", "url", "clicks", "impressions", "ctr", "position"];
const REPORT_COLUMNS: [&str; 9] = [
    "query",
    "url",
    "clicks",
    "impressions",
    "ctr",
    "position",
    "word_count",
    "suggested_page",
    "cluster_id",
];

/// Position of each required column in the header row.
fn locate<const N: usize>(
    table: &'static str,
    headers: &StringRecord,
    required: [&'static str; N],
) -> Result<[usize; N], InputError> {
    let mut idx = [0usize; N];
    for (slot, column) in idx.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or(InputError::MissingColumn { table, column })?;
    }
    Ok(idx)
}

fn csv_err(table: &'static str) -> impl Fn(csv::Error) -> InputError {
    move |source| InputError::Csv { table, source }
}

pub fn read_queries_path(path: impl AsRef<Path>) -> Result<Vec<QueryRecord>, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Csv {
        table: QUERIES,
        source: e.into(),
    })?;
    read_queries(file)
}

/// Parse a query table. Column check happens before any row is read.
pub fn read_queries<R: io::Read>(reader: R) -> Result<Vec<QueryRecord>, InputError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err(QUERIES))?.clone();
    let [query, url, clicks, impressions, ctr, position] = locate(QUERIES, &headers, QUERY_COLUMNS)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(csv_err(QUERIES))?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cell = |i: usize| row.get(i).unwrap_or("");

        out.push(QueryRecord {
            query: cell(query).to_string(),
            url: cell(url).to_string(),
            clicks: parse_count(cell(clicks), line, "clicks")?,
            impressions: parse_count(cell(impressions), line, "impressions")?,
            ctr: parse_ratio(cell(ctr), line)?,
            position: parse_rank(cell(position), line)?,
        });
    }
    Ok(out)
}

pub fn read_pages_path(path: impl AsRef<Path>) -> Result<PageList, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::Csv {
        table: PAGES,
        source: e.into(),
    })?;
    read_pages(file)
}

/// Parse a page table; only the `url` column is used, blank cells skipped.
pub fn read_pages<R: io::Read>(reader: R) -> Result<PageList, InputError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err(PAGES))?.clone();
    let [url] = locate(PAGES, &headers, ["url"])?;

    let mut urls = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(csv_err(PAGES))?;
        if let Some(u) = row.get(url) {
            urls.push(u.to_string());
        }
    }
    Ok(PageList::new(urls))
}

/// GSC exports write counts as integers, sometimes with thousands separators.
fn parse_count(raw: &str, line: u64, column: &'static str) -> Result<u64, InputError> {
    if raw.is_empty() {
        return Ok(0);
    }
    let cleaned = raw.replace(',', "");
    cleaned
        .parse::<u64>()
        .or_else(|_| {
            // "12.0" from spreadsheet round-trips
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && f.is_finite())
                .map(|f| f as u64)
                .ok_or(())
        })
        .map_err(|_| invalid(line, column, raw))
}

fn parse_float(raw: &str, line: u64, column: &'static str) -> Result<f64, InputError> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| invalid(line, column, raw))
}

/// A blank rank stays unknown so the position filter can drop it.
fn parse_rank(raw: &str, line: u64) -> Result<Option<f64>, InputError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_float(raw, line, "position").map(Some)
}

/// `0.025` and `2.5%` are the same ratio.
fn parse_ratio(raw: &str, line: u64) -> Result<f64, InputError> {
    match raw.strip_suffix('%') {
        Some(pct) => parse_float(pct.trim(), line, "ctr")
            .map(|p| p / 100.0)
            .map_err(|_| invalid(line, "ctr", raw)),
        None => parse_float(raw, line, "ctr"),
    }
}

fn invalid(line: u64, column: &'static str, value: &str) -> InputError {
    InputError::InvalidValue {
        table: QUERIES,
        line,
        column,
        value: value.to_string(),
    }
}

/// Same shape as an uploaded query table, so `fetch` output feeds `analyze`.
pub fn write_queries<W: io::Write>(writer: W, rows: &[QueryRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(QUERY_COLUMNS)?;
    for r in rows {
        wtr.write_record(&[
            r.query.clone(),
            r.url.clone(),
            r.clicks.to_string(),
            r.impressions.to_string(),
            r.ctr.to_string(),
            r.position.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Opportunity report. `suggested_h2s` is only present when headings were generated.
pub fn write_report<W: io::Write>(writer: W, report: &Report) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = REPORT_COLUMNS.to_vec();
    if report.with_headings {
        header.push("suggested_h2s");
    }
    wtr.write_record(&header)?;

    for o in &report.opportunities {
        let r = &o.record;
        let mut row = vec![
            r.query.clone(),
            r.url.clone(),
            r.clicks.to_string(),
            r.impressions.to_string(),
            r.ctr.to_string(),
            r.position.map(|p| p.to_string()).unwrap_or_default(),
            o.word_count.to_string(),
            o.suggested_page.clone(),
            o.cluster_id.to_string(),
        ];
        if report.with_headings {
            row.push(o.suggested_h2s.clone().unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
