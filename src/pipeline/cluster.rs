use crate::record::Opportunity;

/// The only cluster there is until a real grouping exists.
pub const DEFAULT_CLUSTER: u32 = 0;

/// Placeholder grouping: every query lands in [`DEFAULT_CLUSTER`].
pub fn cluster_queries(rows: Vec<Opportunity>) -> Vec<Opportunity> {
    rows.into_iter()
        .map(|mut r| {
            r.cluster_id = DEFAULT_CLUSTER;
            r
        })
        .collect()
}
