use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storage::models::{RecordKind, StoredAthlete};
use tracing::{info, warn};

use crate::document::PdfDocument;
use crate::error::{ExportError, Result};
use crate::header::LOGO_RESOURCE;
use crate::logo::{DEFAULT_LOGO_URL, LogoImage, fetch_image_as_data_url, resolve_url};
use crate::{slip, tabular};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStyle {
    /// The whole roster as one table.
    Tabular,
    /// One consent slip per record.
    Slip,
}

impl ExportStyle {
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Tabular => "atletas.pdf",
            Self::Slip => "bilhetes.pdf",
        }
    }

    /// The style matching the record variant a form collects.
    pub fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::SelfRegistration => Self::Tabular,
            RecordKind::GuardianConsent => Self::Slip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Slip => "slip",
        }
    }
}

impl fmt::Display for ExportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportStyle {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tabular" => Ok(Self::Tabular),
            "slip" => Ok(Self::Slip),
            other => Err(ExportError::UnknownStyle(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Logo location, absolute or relative to `base_url`.
    pub logo_url: String,
    pub base_url: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            logo_url: DEFAULT_LOGO_URL.to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: &'static str,
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub logo_embedded: bool,
}

impl ExportedFile {
    /// Writes the document into `dir` under its download filename.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

pub struct PdfExporter {
    client: reqwest::Client,
    settings: ExportSettings,
}

impl PdfExporter {
    pub fn new(settings: ExportSettings) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: reqwest::Client, settings: ExportSettings) -> Self {
        Self { client, settings }
    }

    /// Fetches and decodes the logo. Any failure means "no logo".
    pub async fn load_logo(&self) -> Option<LogoImage> {
        let url = resolve_url(self.settings.base_url.as_deref(), &self.settings.logo_url);
        let data_url = fetch_image_as_data_url(&self.client, &url).await?;

        match LogoImage::from_data_url(&data_url) {
            Ok(logo) => Some(logo),
            Err(e) => {
                warn!("Logo at {} could not be decoded: {}", url, e);
                None
            }
        }
    }

    pub async fn export(&self, style: ExportStyle, records: &[StoredAthlete]) -> Result<ExportedFile> {
        let logo = self.load_logo().await;
        render(style, records, logo.as_ref())
    }
}

/// Draws `records` in the given style. Nothing is returned unless the whole
/// document serializes.
pub fn render(
    style: ExportStyle,
    records: &[StoredAthlete],
    logo: Option<&LogoImage>,
) -> Result<ExportedFile> {
    let mut document = PdfDocument::new();
    if let Some(logo) = logo {
        document.add_image(LOGO_RESOURCE, logo)?;
    }

    let has_logo = logo.is_some();
    match style {
        ExportStyle::Tabular => tabular::render(&mut document, records, has_logo)?,
        ExportStyle::Slip => slip::render(&mut document, records, has_logo)?,
    }

    let pages = document.page_count();
    let bytes = document.finish()?;
    info!(
        "Rendered {} with {} records on {} pages",
        style.filename(),
        records.len(),
        pages
    );

    Ok(ExportedFile {
        filename: style.filename(),
        bytes,
        pages,
        logo_embedded: has_logo,
    })
}
