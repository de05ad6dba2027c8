use std::sync::Arc;

use export::PdfExporter;
use registration::{Clock, SystemClock};
use storage::RecordStore;

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub exporter: Arc<PdfExporter>,
    /// Source of "today" for deriving ages on incoming records
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, exporter: PdfExporter) -> Self {
        Self {
            store,
            exporter: Arc::new(exporter),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
