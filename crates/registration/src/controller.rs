//! State machine behind the registration page: the draft being edited, the
//! live list of stored athletes and the export button.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use export::{ExportStyle, ExportedFile, PdfExporter};
use storage::dto::athlete::AthletePatch;
use storage::models::{AthleteRecord, RecordKind};
use storage::{RecordStore, Snapshot, Subscription};
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::age::{Clock, SystemClock};
use crate::draft::{self, Field};
use crate::error::{FormError, Result};

pub const DELETE_PROMPT: &str = "Deseja realmente excluir este atleta?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Creating,
    Editing(Uuid),
}

/// Side effects the view should perform after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    ScrollToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// Shared "export in progress" flag backing the export button.
#[derive(Debug, Clone, Default)]
pub struct ExportStatus(Arc<AtomicBool>);

impl ExportStatus {
    pub fn is_exporting(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> &'static str {
        if self.is_exporting() {
            "Gerando..."
        } else {
            "Exportar PDF"
        }
    }

    /// Marks an export as running until the guard is dropped.
    pub fn begin(&self) -> ExportGuard {
        self.0.store(true, Ordering::SeqCst);
        ExportGuard(self.clone())
    }
}

#[must_use]
pub struct ExportGuard(ExportStatus);

impl Drop for ExportGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

pub struct RegistrationController<S: RecordStore + ?Sized> {
    store: Arc<S>,
    exporter: Arc<PdfExporter>,
    clock: Arc<dyn Clock>,
    kind: RecordKind,
    mode: FormMode,
    draft: AthleteRecord,
    list: Arc<RwLock<Snapshot>>,
    subscription: Option<Subscription>,
    export_status: ExportStatus,
}

impl<S: RecordStore + ?Sized> RegistrationController<S> {
    /// A controller for the form collecting `kind` records.
    pub fn new(store: Arc<S>, exporter: Arc<PdfExporter>, kind: RecordKind) -> Self {
        Self {
            store,
            exporter,
            clock: Arc::new(SystemClock),
            kind,
            mode: FormMode::Creating,
            draft: AthleteRecord::blank(kind),
            list: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            subscription: None,
            export_status: ExportStatus::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts the live list subscription. Must run inside a tokio runtime.
    pub fn mount(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        let list = Arc::clone(&self.list);
        let subscription = self.store.subscribe(Box::new(move |snapshot: Snapshot| {
            *list.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        }));
        self.subscription = Some(subscription);
        info!("Mounted {} form", self.kind);
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("Unmounted {} form", self.kind);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// The latest list pushed by the store, newest first.
    pub fn list(&self) -> Snapshot {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &AthleteRecord {
        &self.draft
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export_status
    }

    pub fn set_field(&mut self, field: Field, raw: &str) -> Result<()> {
        draft::set_field(&mut self.draft, field, raw, self.clock.today())
    }

    pub fn display_value(&self, field: Field) -> Option<String> {
        draft::display_value(&self.draft, field)
    }

    pub fn reset(&mut self) {
        self.draft = AthleteRecord::blank(self.kind);
    }

    /// Leaves edit mode without saving.
    pub fn cancel_edit(&mut self) {
        self.mode = FormMode::Creating;
        self.reset();
    }

    fn check_draft(&self) -> Result<()> {
        if let AthleteRecord::GuardianConsent(g) = &self.draft {
            if !g.minor_tax_id.is_empty() && g.minor_tax_id == g.guardian_tax_id {
                return Err(FormError::SameTaxIds);
            }
        }
        self.draft.validate()?;
        Ok(())
    }

    /// Creates or updates the record behind the draft. On failure the mode
    /// and draft are left as they were.
    pub async fn submit(&mut self) -> Result<Uuid> {
        self.check_draft()?;

        let id = match self.mode {
            FormMode::Creating => self.store.create(&self.draft).await.map_err(|e| {
                error!("Failed to create athlete: {}", e);
                FormError::Save(e)
            })?,
            FormMode::Editing(id) => {
                let patch = AthletePatch::from(self.draft.clone());
                self.store.update(id, &patch).await.map_err(|e| {
                    error!("Failed to update athlete {}: {}", id, e);
                    FormError::Save(e)
                })?;
                id
            }
        };

        info!("Saved athlete {}", id);
        self.mode = FormMode::Creating;
        self.reset();
        Ok(id)
    }

    /// Loads a listed record into the draft for editing.
    pub fn edit(&mut self, id: Uuid) -> Result<ViewEffect> {
        let record = self
            .list()
            .iter()
            .find(|athlete| athlete.id == id)
            .map(|athlete| athlete.record.clone())
            .ok_or(FormError::NotInList(id))?;

        self.draft = record;
        self.mode = FormMode::Editing(id);
        Ok(ViewEffect::ScrollToTop)
    }

    /// Deletes `id` once `confirm` accepts [`DELETE_PROMPT`].
    pub async fn delete<F>(&self, id: Uuid, confirm: F) -> Result<DeleteOutcome>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Declined);
        }

        self.store.delete(id).await.map_err(|e| {
            error!("Failed to delete athlete {}: {}", id, e);
            FormError::Delete(e)
        })?;
        info!("Deleted athlete {}", id);
        Ok(DeleteOutcome::Deleted)
    }

    /// Exports the current list in the style matching this form.
    pub async fn export(&self) -> Result<ExportedFile> {
        self.export_with(ExportStyle::for_kind(self.kind)).await
    }

    pub async fn export_with(&self, style: ExportStyle) -> Result<ExportedFile> {
        let _running = self.export_status.begin();
        let records = self.list();

        self.exporter.export(style, &records).await.map_err(|e| {
            error!("Failed to export {}: {}", style.filename(), e);
            FormError::Export(e)
        })
    }
}
