/// One row of search-performance data, as uploaded or fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub query: String,
    pub url: String,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    /// Blank in the source table means unknown rank.
    pub position: Option<f64>,
}

/// Known destination pages, lowercased once at load.
#[derive(Debug, Clone, Default)]
pub struct PageList {
    urls: Vec<String>,
}

impl PageList {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PageList {
            urls: urls
                .into_iter()
                .map(|u| u.as_ref().trim().to_lowercase())
                .filter(|u| !u.is_empty())
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A query that passed the long-tail filter.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTail {
    pub record: QueryRecord,
    pub word_count: usize,
}

/// A long-tail query with no existing page.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub record: QueryRecord,
    pub word_count: usize,
    pub page_exists: bool,
    pub suggested_page: String,
    pub cluster_id: u32,
    pub suggested_h2s: Option<String>,
}
