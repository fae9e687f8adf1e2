use thiserror::Error;

/// Error taxonomy for the analysis and API layers.
///
/// Legitimately-empty data is NOT an error anywhere in this service: an
/// empty store degrades to empty-shaped responses, and degenerate
/// computations surface as explicit null sentinels in the payload. Only the
/// conditions below abort a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller sent a request the service cannot act on (e.g. fewer than
    /// two series for correlation, or over the per-request series limit).
    #[error("invalid request: {reason}")]
    Input { reason: String },

    /// One or more requested series identifiers do not exist in the catalog.
    #[error("unknown series: {}", ids.join(", "))]
    UnknownSeries { ids: Vec<String> },

    /// An upstream data provider (FRED, quote feed) failed or returned an
    /// unusable payload.
    #[error("upstream provider error: {reason}")]
    Upstream { reason: String },

    /// The repository itself failed (I/O, pool exhaustion, corrupt row).
    /// Distinct from legitimately-empty-but-reachable data: a fetch failure
    /// fails the whole request rather than silently dropping a series.
    #[error("repository failure: {source}")]
    Repository {
        #[source]
        source: anyhow::Error,
    },

    /// A programming-contract violation inside the engine, e.g. a column
    /// whose length disagrees with the date axis. Fails fast instead of
    /// silently truncating.
    #[error("internal invariant violated: {reason}")]
    Internal { reason: String },
}

impl ApiError {
    pub fn input(reason: impl Into<String>) -> Self {
        Self::Input {
            reason: reason.into(),
        }
    }

    pub fn unknown_series(ids: Vec<String>) -> Self {
        Self::UnknownSeries { ids }
    }

    pub fn upstream(reason: impl Into<String>) -> Self {
        Self::Upstream {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(source: anyhow::Error) -> Self {
        Self::Repository { source }
    }
}
