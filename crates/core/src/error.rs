#[derive(Debug, thiserror::Error)]
pub enum SisregError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),
    #[error("upstream request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("upstream request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },
    #[error("upstream {url} answered {status}: {body}")]
    UpstreamStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode upstream response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Dados cadastrais incompletos no sistema.")]
    IncompleteRecord,
    #[error("Nome da mãe incorreto")]
    VerificationMismatch,
}

impl SisregError {
    /// True for the two failures the disclosure gate surfaces to the caller.
    pub fn is_gate_rejection(&self) -> bool {
        matches!(
            self,
            SisregError::IncompleteRecord | SisregError::VerificationMismatch
        )
    }
}

pub type SisregResult<T> = std::result::Result<T, SisregError>;
