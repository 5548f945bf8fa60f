use crate::record::{LongTail, QueryRecord};

/// Number of whitespace-separated tokens in a query.
pub fn word_count(query: &str) -> usize {
    query.split_whitespace().count()
}

/// Keep records with at least `min_words` tokens. Blank queries count as zero.
pub fn detect_long_tail(records: &[QueryRecord], min_words: usize) -> Vec<LongTail> {
    records
        .iter()
        .filter_map(|r| {
            let word_count = word_count(&r.query);
            (word_count >= min_words && word_count > 0).then(|| LongTail {
                record: r.clone(),
                word_count,
            })
        })
        .collect()
}

/// Keep rows whose average position is at most `max_position`.
/// Rows with an unknown position are dropped.
pub fn within_position(rows: Vec<LongTail>, max_position: f64) -> Vec<LongTail> {
    rows.into_iter()
        .filter(|r| r.record.position.is_some_and(|p| p <= max_position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(query: &str, position: f64) -> QueryRecord {
        QueryRecord {
            query: query.into(),
            url: "https://example.com/".into(),
            clicks: 1,
            impressions: 10,
            ctr: 0.1,
            position: Some(position),
        }
    }

    #[test]
    fn counts_whitespace_tokens() {
        assert_eq!(word_count("best running shoes for flat feet"), 6);
        assert_eq!(word_count("  trail\tshoes \n women "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn keeps_queries_at_threshold() {
        let rows = vec![
            rec("shoes", 3.0),
            rec("running shoes", 3.0),
            rec("red running shoes", 3.0),
            rec("cheap red running shoes", 3.0),
        ];
        let kept = detect_long_tail(&rows, 3);
        let queries: Vec<&str> = kept.iter().map(|r| r.record.query.as_str()).collect();
        assert_eq!(queries, vec!["red running shoes", "cheap red running shoes"]);
        assert_eq!(kept[1].word_count, 4);
    }

    #[test]
    fn blank_query_is_excluded() {
        let rows = vec![rec("", 1.0), rec("   ", 1.0)];
        assert!(detect_long_tail(&rows, 1).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let rows = vec![
            rec("a b", 1.0),
            rec("a b c", 1.0),
            rec("a b c d", 1.0),
        ];
        let once = detect_long_tail(&rows, 3);
        let again: Vec<QueryRecord> = once.iter().map(|r| r.record.clone()).collect();
        assert_eq!(detect_long_tail(&again, 3), once);
    }

    #[test]
    fn position_threshold_is_inclusive() {
        let rows = detect_long_tail(
            &[rec("a b c", 20.0), rec("d e f", 20.5), rec("g h i", 1.2)],
            3,
        );
        let kept = within_position(rows, 20.0);
        let queries: Vec<&str> = kept.iter().map(|r| r.record.query.as_str()).collect();
        assert_eq!(queries, vec!["a b c", "g h i"]);
    }

    #[test]
    fn unknown_position_is_dropped() {
        let mut unranked = rec("best cheap trail shoes", 0.0);
        unranked.position = None;
        let rows = detect_long_tail(&[unranked, rec("x y z", 4.0)], 3);
        assert_eq!(rows.len(), 2);
        let kept = within_position(rows, 20.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].record.query, "x y z");
    }
}
