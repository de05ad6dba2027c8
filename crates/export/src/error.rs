use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Unknown export style '{0}'")]
    UnknownStyle(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
