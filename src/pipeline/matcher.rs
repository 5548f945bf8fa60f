use crate::record::{LongTail, Opportunity, PageList};

pub const BUY_PATH_PREFIX: &str = "/buy/";

/// True when the lowercased query appears inside any known page URL.
/// A blank query never matches.
pub fn page_exists(query: &str, pages: &PageList) -> bool {
    if query.trim().is_empty() {
        return false;
    }
    let needle = query.to_lowercase();
    pages.iter().any(|url| url.contains(&needle))
}

/// `/buy/` + lowercased query with whitespace turned into hyphens.
pub fn suggest_page(query: &str) -> String {
    let slug: String = query
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("{}{}", BUY_PATH_PREFIX, slug)
}

/// Drop queries that already have a page; the rest become opportunities.
pub fn match_queries_to_pages(rows: Vec<LongTail>, pages: &PageList) -> Vec<Opportunity> {
    rows.into_iter()
        .filter(|r| !page_exists(&r.record.query, pages))
        .map(|r| {
            let suggested_page = suggest_page(&r.record.query);
            Opportunity {
                record: r.record,
                word_count: r.word_count,
                page_exists: false,
                suggested_page,
                cluster_id: 0,
                suggested_h2s: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::long_tail::word_count;
    use crate::record::QueryRecord;

    fn long_tail(query: &str) -> LongTail {
        LongTail {
            record: QueryRecord {
                query: query.into(),
                url: "https://example.com/".into(),
                clicks: 0,
                impressions: 0,
                ctr: 0.0,
                position: Some(1.0),
            },
            word_count: word_count(query),
        }
    }

    #[test]
    fn substring_match_ignores_case() {
        let pages = PageList::new(["https://Example.com/buy/Trail-Running-Shoes"]);
        assert!(page_exists("TRAIL-running-shoes", &pages));
        assert!(!page_exists("trail running shoes", &pages));
    }

    #[test]
    fn blank_query_never_matches() {
        let pages = PageList::new(["https://example.com/anything"]);
        assert!(!page_exists("", &pages));
        assert!(!page_exists("  ", &pages));
    }

    #[test]
    fn empty_page_list_matches_nothing() {
        assert!(!page_exists("running shoes", &PageList::default()));
    }

    #[test]
    fn suggested_page_shape() {
        let page = suggest_page("Best Running\tShoes for Flat Feet");
        assert_eq!(page, "/buy/best-running-shoes-for-flat-feet");
        assert!(page.starts_with(BUY_PATH_PREFIX));
        assert!(!page.chars().any(char::is_whitespace));
        assert_eq!(page, page.to_lowercase());
    }

    #[test]
    fn only_unmatched_rows_survive() {
        let pages = PageList::new([
            "example.com/buy/waterproof hiking boots",
            "example.com/shoes-for-flat-feet",
        ]);
        let rows = vec![
            long_tail("waterproof hiking boots"),
            long_tail("best running shoes for flat feet"),
            long_tail("shoes-for-flat-feet"),
        ];
        let out = match_queries_to_pages(rows.clone(), &pages);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.query, "best running shoes for flat feet");
        assert!(out.iter().all(|o| !o.page_exists));
        assert!(out
            .iter()
            .all(|o| rows.iter().any(|r| r.record == o.record)));
    }
}
