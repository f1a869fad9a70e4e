use thiserror::Error;

#[derive(Error, Debug)]
pub enum MboumError {
    #[error("http error: {0}")]
    Http(reqwest::Error),

    #[error("mboum returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid json from mboum: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for MboumError {
    /// Query auth puts the api key in the URL.
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}
