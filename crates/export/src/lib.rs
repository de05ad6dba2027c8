//! PDF export of athlete records, either as a paginated roster table or as
//! one consent slip per record.

pub mod canvas;
pub mod document;
pub mod error;
pub mod exporter;
pub mod format;
pub mod header;
pub mod logo;
pub mod metrics;
pub mod slip;
pub mod tabular;

pub use error::{ExportError, Result};
pub use exporter::{ExportSettings, ExportStyle, ExportedFile, PdfExporter, render};
pub use logo::{LogoImage, fetch_image_as_data_url};
