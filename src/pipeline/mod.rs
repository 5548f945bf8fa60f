pub mod cluster;
pub mod headings;
pub mod long_tail;
pub mod matcher;

use tracing::info;

use crate::record::{Opportunity, PageList, QueryRecord};
use crate::settings::Settings;

/// Everything one run needs, loaded and validated up front.
pub struct Session {
    pub settings: Settings,
    pub queries: Vec<QueryRecord>,
    pub pages: PageList,
}

pub struct Report {
    pub opportunities: Vec<Opportunity>,
    pub loaded: usize,
    pub long_tail: usize,
    pub within_position: usize,
    pub clustered: bool,
    pub with_headings: bool,
}

impl Report {
    pub fn print(&self) {
        println!(
            "{} queries loaded, {} long-tail, {} within position, {} opportunities.",
            self.loaded,
            self.long_tail,
            self.within_position,
            self.opportunities.len(),
        );
        println!(
            "Clustering: {} | H2 suggestions: {}",
            if self.clustered { "on" } else { "off" },
            if self.with_headings { "on" } else { "off (no API key)" },
        );
    }
}

/// Long-tail filter → position filter → page match → cluster → headings.
pub fn run(session: &Session) -> Report {
    let settings = &session.settings;

    let candidates = long_tail::detect_long_tail(&session.queries, settings.min_word_count);
    let long_tail_count = candidates.len();
    let filtered = long_tail::within_position(candidates, settings.position_threshold);
    info!(
        "{} of {} queries passed filters (min words {}, position <= {})",
        filtered.len(),
        session.queries.len(),
        settings.min_word_count,
        settings.position_threshold
    );
    let within_position = filtered.len();

    let unmatched = matcher::match_queries_to_pages(filtered, &session.pages);
    info!(
        "{} opportunities with no page among {} known pages",
        unmatched.len(),
        session.pages.len()
    );

    let mut opportunities = if settings.use_clustering {
        info!("Clustering {} queries", unmatched.len());
        cluster::cluster_queries(unmatched)
    } else {
        unmatched
            .into_iter()
            .map(|mut o| {
                o.cluster_id = cluster::DEFAULT_CLUSTER;
                o
            })
            .collect()
    };

    let keys = settings.api_keys();
    let with_headings = keys.any();
    if with_headings {
        info!("Generating H2 suggestions for {} queries", opportunities.len());
        for o in &mut opportunities {
            o.suggested_h2s = Some(headings::generate_h2s(&o.record.query, &keys));
        }
    }

    Report {
        opportunities,
        loaded: session.queries.len(),
        long_tail: long_tail_count,
        within_position,
        clustered: settings.use_clustering,
        with_headings,
    }
}
