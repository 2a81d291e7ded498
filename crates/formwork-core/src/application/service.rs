//! Form application service
//!
//! Thin host-side orchestration: the schema handle, the collaborators and
//! the user-facing notifications for each flow.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::handle::SchemaHandle;
use crate::codec::{
    build_share_url, decode_document, decode_share, encode_for_export, encode_share,
    export_file_name, extract_shared_form, strip_shared_form,
};
use crate::config::FormsConfig;
use crate::domain::aggregates::{ConditionPatch, FieldPatch, FormSchema, OptionPatch};
use crate::domain::events::SchemaEvent;
use crate::domain::value_objects::{ConditionId, FieldId, OptionId};
use crate::error::{FormsError, Result};
use crate::infrastructure::{DirectoryExporter, FileFormRepository, TracingNotifier};
use crate::ports::outbound::{FormExporter, FormRepository, Notifier, Severity};

pub const MSG_SAVED: &str = "Form saved successfully!";
pub const MSG_SAVE_FAILED: &str = "Failed to save form";
pub const MSG_LOADED: &str = "Form loaded successfully!";
pub const MSG_NOTHING_SAVED: &str = "No saved form found";
pub const MSG_RESET: &str = "Form reset successfully!";
pub const MSG_EXPORTED: &str = "Form exported successfully!";
pub const MSG_EXPORT_FAILED: &str = "Failed to export form";
pub const MSG_SHARED_LOADED: &str = "Form loaded from shared URL!";
pub const MSG_IMPORTED: &str = "Form imported successfully!";
pub const MSG_IMPORT_FAILED: &str = "Invalid form file";

/// Form application service
pub struct FormService {
    handle: Arc<SchemaHandle>,
    repository: Arc<dyn FormRepository>,
    exporter: Arc<dyn FormExporter>,
    notifier: Arc<dyn Notifier>,
    share_base_url: String,
    default_title: String,
    autosave_interval: Option<Duration>,
}

impl FormService {
    pub fn new(
        repository: Arc<dyn FormRepository>,
        exporter: Arc<dyn FormExporter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let defaults = FormsConfig::default();
        let autosave_interval = defaults.autosave_interval();
        Self {
            handle: Arc::new(SchemaHandle::default()),
            repository,
            exporter,
            notifier,
            share_base_url: defaults.share_base_url,
            default_title: defaults.default_title,
            autosave_interval,
        }
    }

    /// File repository, directory exporter and tracing notifier from config
    ///
    /// Hosts with their own notification surface swap it in with
    /// `with_notifier`.
    pub fn from_config(config: &FormsConfig) -> Self {
        Self::new(
            Arc::new(FileFormRepository::new(&config.storage_path)),
            Arc::new(DirectoryExporter::new(&config.export_dir)),
            Arc::new(TracingNotifier),
        )
        .with_share_base_url(config.share_base_url.clone())
        .with_default_title(config.default_title.clone())
        .with_autosave_interval(config.autosave_interval())
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_share_base_url(mut self, base: impl Into<String>) -> Self {
        self.share_base_url = base.into();
        self
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// `None` turns the autosave task off
    pub fn with_autosave_interval(mut self, interval: Option<Duration>) -> Self {
        self.autosave_interval = interval;
        self
    }

    pub fn handle(&self) -> &Arc<SchemaHandle> {
        &self.handle
    }

    pub fn snapshot(&self) -> Arc<FormSchema> {
        self.handle.snapshot()
    }

    pub fn is_dirty(&self) -> bool {
        self.handle.is_dirty()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Apply a store operation to the current schema
    pub fn edit<R>(&self, f: impl FnOnce(&mut FormSchema) -> R) -> R {
        self.edit_with_events(f).0
    }

    pub fn edit_with_events<R>(&self, f: impl FnOnce(&mut FormSchema) -> R) -> (R, Vec<SchemaEvent>) {
        let (result, events) = self.handle.apply(f);
        for event in &events {
            debug!(?event, "schema event");
        }
        (result, events)
    }

    /// Start over with an empty form carrying the configured title
    pub fn new_form(&self, title: Option<&str>) {
        let title = title.unwrap_or(&self.default_title);
        self.handle.replace(FormSchema::with_title(title), true);
        info!(title, "new form");
    }

    pub fn update_field_strict(&self, id: &FieldId, patch: FieldPatch) -> Result<()> {
        self.edit(|schema| {
            require_field(schema, id)?;
            schema.update_field(id, patch);
            Ok(())
        })
    }

    pub fn remove_field_strict(&self, id: &FieldId) -> Result<()> {
        self.edit(|schema| {
            require_field(schema, id)?;
            schema.remove_field(id);
            Ok(())
        })
    }

    pub fn duplicate_field_strict(&self, id: &FieldId) -> Result<FieldId> {
        self.edit(|schema| schema.duplicate_field(id).ok_or_else(|| field_not_found(id)))
    }

    /// Reorder; moving a field onto itself is a no-op, not an error
    pub fn reorder_fields_strict(&self, moved_id: &FieldId, target_id: &FieldId) -> Result<()> {
        self.edit(|schema| {
            require_field(schema, moved_id)?;
            require_field(schema, target_id)?;
            schema.reorder_fields(moved_id, target_id);
            Ok(())
        })
    }

    /// `Ok(None)` when the field carries no options
    pub fn add_option_strict(&self, field_id: &FieldId) -> Result<Option<OptionId>> {
        self.edit(|schema| {
            require_field(schema, field_id)?;
            Ok(schema.add_option(field_id))
        })
    }

    pub fn update_option_strict(&self, field_id: &FieldId, option_id: &OptionId, patch: OptionPatch) -> Result<()> {
        self.edit(|schema| {
            require_option(schema, field_id, option_id)?;
            schema.update_option(field_id, option_id, patch);
            Ok(())
        })
    }

    /// `Ok(false)` when the option is the last one and was kept
    pub fn remove_option_strict(&self, field_id: &FieldId, option_id: &OptionId) -> Result<bool> {
        self.edit(|schema| {
            require_option(schema, field_id, option_id)?;
            Ok(schema.remove_option(field_id, option_id))
        })
    }

    /// `Ok(None)` when there is no other field to target
    pub fn add_condition_strict(&self, field_id: &FieldId) -> Result<Option<ConditionId>> {
        self.edit(|schema| {
            require_field(schema, field_id)?;
            Ok(schema.add_condition(field_id))
        })
    }

    /// `Ok(false)` when the patch would target the field itself
    pub fn update_condition_strict(
        &self,
        field_id: &FieldId,
        condition_id: &ConditionId,
        patch: ConditionPatch,
    ) -> Result<bool> {
        self.edit(|schema| {
            require_condition(schema, field_id, condition_id)?;
            if let Some(target) = &patch.field_id {
                require_field(schema, target)?;
            }
            Ok(schema.update_condition(field_id, condition_id, patch))
        })
    }

    pub fn remove_condition_strict(&self, field_id: &FieldId, condition_id: &ConditionId) -> Result<()> {
        self.edit(|schema| {
            require_condition(schema, field_id, condition_id)?;
            schema.remove_condition(field_id, condition_id);
            Ok(())
        })
    }

    // =========================================================================
    // Persistence flows
    // =========================================================================

    pub async fn save(&self) -> Result<()> {
        // Read before the snapshot so an edit racing the save keeps the form dirty
        let version = self.handle.version();
        let payload = self.snapshot().to_payload();
        match self.repository.save(&payload).await {
            Ok(()) => {
                self.handle.mark_clean_if(version);
                info!(fields = payload.fields.len(), "form saved");
                self.notifier.notify(Severity::Success, MSG_SAVED);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "save failed");
                self.notifier.notify(Severity::Error, MSG_SAVE_FAILED);
                Err(e)
            }
        }
    }

    /// Load the saved form; `Ok(false)` when nothing was saved
    pub async fn load(&self) -> Result<bool> {
        let loaded = self
            .repository
            .load()
            .await
            .and_then(|stored| stored.map(|s| FormSchema::from_payload(s.payload)).transpose());

        match loaded {
            Ok(Some(schema)) => {
                info!(fields = schema.len(), "form loaded");
                self.handle.replace(schema, false);
                self.notifier.notify(Severity::Success, MSG_LOADED);
                Ok(true)
            }
            Ok(None) => {
                self.notifier.notify(Severity::Error, MSG_NOTHING_SAVED);
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "load failed");
                self.notifier.notify(Severity::Error, &e.to_string());
                Err(e)
            }
        }
    }

    /// Restore the saved form without notifying; `Ok(false)` when nothing was saved
    pub async fn restore(&self) -> Result<bool> {
        let Some(stored) = self.repository.load().await? else {
            return Ok(false);
        };
        let schema = FormSchema::from_payload(stored.payload)?;
        debug!(fields = schema.len(), saved_at = ?stored.saved_at, "form restored");
        self.handle.replace(schema, false);
        Ok(true)
    }

    /// Empty the schema and the saved slot
    pub async fn reset(&self) -> Result<()> {
        self.handle.replace(FormSchema::new(), false);
        if let Err(e) = self.repository.clear().await {
            warn!(error = %e, "could not clear saved form");
        }
        self.notifier.notify(Severity::Success, MSG_RESET);
        Ok(())
    }

    /// Write the current schema through the exporter; returns its location
    pub async fn export(&self) -> Result<String> {
        let snapshot = self.snapshot();
        let now = Utc::now();
        let result = match encode_for_export(&snapshot.to_payload(), now) {
            Ok(contents) => {
                self.exporter
                    .export(&export_file_name(snapshot.title(), now), &contents)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(location) => {
                self.notifier.notify(Severity::Success, MSG_EXPORTED);
                Ok(location)
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.notifier.notify(Severity::Error, MSG_EXPORT_FAILED);
                Err(e)
            }
        }
    }

    /// Replace the schema with an exported or stored document
    pub fn import(&self, text: &str) -> Result<()> {
        match decode_document(text).and_then(|doc| FormSchema::from_payload(doc.payload)) {
            Ok(schema) => {
                info!(fields = schema.len(), "form imported");
                self.handle.replace(schema, false);
                self.notifier.notify(Severity::Success, MSG_IMPORTED);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "import rejected");
                self.notifier.notify(Severity::Error, MSG_IMPORT_FAILED);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Share flows
    // =========================================================================

    /// Share link for the current schema
    pub fn share_url(&self) -> Result<String> {
        let encoded = encode_share(&self.snapshot().to_payload())?;
        build_share_url(&self.share_base_url, &encoded)
    }

    /// Load a form carried by `location`
    ///
    /// Returns the location with the form parameter removed, or `None` when
    /// the URL carries no form.
    pub fn open_shared(&self, location: &str) -> Result<Option<String>> {
        let Some(encoded) = extract_shared_form(location) else {
            return Ok(None);
        };
        let schema = decode_share(&encoded)
            .and_then(FormSchema::from_payload)
            .map_err(|e| {
                warn!(error = %e, "shared form rejected");
                self.notifier.notify(Severity::Error, &e.to_string());
                e
            })?;

        info!(fields = schema.len(), "form loaded from shared URL");
        self.handle.replace(schema, false);
        self.notifier.notify(Severity::Info, MSG_SHARED_LOADED);
        strip_shared_form(location).map(Some)
    }

    // =========================================================================
    // Autosave
    // =========================================================================

    /// Save quietly if there are unsaved changes; `Ok(true)` when it saved
    pub async fn autosave_once(&self) -> Result<bool> {
        if !self.handle.is_dirty() {
            return Ok(false);
        }
        let version = self.handle.version();
        self.repository.save(&self.snapshot().to_payload()).await?;
        // Edits made while saving keep the form dirty
        let clean = self.handle.mark_clean_if(version);
        debug!(version, clean, "autosaved");
        Ok(true)
    }

    /// Run `autosave_once` on the configured interval until the handle is
    /// aborted; `None` when autosave is off
    pub fn spawn_autosave(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let interval = self.autosave_interval?;
        let service = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = service.autosave_once().await {
                    error!(error = %e, "autosave failed");
                }
            }
        }))
    }
}

fn field_not_found(id: &FieldId) -> FormsError {
    FormsError::FieldNotFound(id.to_string())
}

fn require_field(schema: &FormSchema, id: &FieldId) -> Result<()> {
    if schema.contains(id) {
        Ok(())
    } else {
        Err(field_not_found(id))
    }
}

fn require_option(schema: &FormSchema, field_id: &FieldId, option_id: &OptionId) -> Result<()> {
    let field = schema.field(field_id).ok_or_else(|| field_not_found(field_id))?;
    if field.options.iter().any(|o| &o.id == option_id) {
        Ok(())
    } else {
        Err(FormsError::OptionNotFound(option_id.to_string()))
    }
}

fn require_condition(schema: &FormSchema, field_id: &FieldId, condition_id: &ConditionId) -> Result<()> {
    let field = schema.field(field_id).ok_or_else(|| field_not_found(field_id))?;
    if field.conditional_logic.conditions.iter().any(|c| &c.id == condition_id) {
        Ok(())
    } else {
        Err(FormsError::ConditionNotFound(condition_id.to_string()))
    }
}
