use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("leaflet block on {shop} has no {field}")]
    MissingField { field: &'static str, shop: String },
}

/// Everything that can go wrong while processing a single shop page.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}
