use thiserror::Error;

/// Problems with an input table. Raised before any pipeline stage runs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("{table} table, line {line}: invalid {column} value '{value}'")]
    InvalidValue {
        table: &'static str,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("failed to read {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// Search Console fetch failures. Never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to Search Console failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search Console returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("min_word_count must be at least 1")]
    ZeroMinWords,

    #[error("position_threshold must be a positive number, got {0}")]
    BadPositionThreshold(f64),
}
