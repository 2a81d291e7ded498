//! CLI Commands

pub mod config;
pub mod fields;
pub mod logic;
pub mod share;

use anyhow::{bail, Context};
use formwork_core::{FieldId, FormSchema, FormService, FormValues, FormsConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::output::{ConsoleNotifier, OutputFormat};
use crate::{Cli, Commands};

/// The working form plus everything a command needs to act on it
pub struct Workspace {
    pub service: FormService,
    pub format: OutputFormat,
}

impl Workspace {
    /// Build the service and restore the working form, if one was saved
    pub async fn open(config: &FormsConfig, format: OutputFormat) -> anyhow::Result<Self> {
        let service = FormService::from_config(config).with_notifier(Arc::new(ConsoleNotifier));
        // Restored quietly; `load` would announce it
        service
            .restore()
            .await
            .with_context(|| format!("reading {}", config.storage_path.display()))?;
        debug!(fields = service.snapshot().len(), "workspace opened");
        Ok(Self { service, format })
    }

    /// Persist pending changes without a notification
    pub async fn persist(&self) -> anyhow::Result<()> {
        self.service.autosave_once().await?;
        Ok(())
    }

    /// Field id from either an id or a 1-based position
    pub fn resolve(&self, reference: &str) -> anyhow::Result<FieldId> {
        resolve_field(&self.service.snapshot(), reference)
    }
}

pub fn resolve_field(schema: &FormSchema, reference: &str) -> anyhow::Result<FieldId> {
    let id = FieldId::from(reference);
    if schema.contains(&id) {
        return Ok(id);
    }
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(field) = position.checked_sub(1).and_then(|i| schema.fields().get(i)) {
            return Ok(field.id.clone());
        }
    }
    bail!("no field {:?} in the working form", reference)
}

/// Answers file: a JSON object of field id to value
pub fn read_values(path: &Path) -> anyhow::Result<FormValues> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a JSON object of answers", path.display()))
}

pub async fn run(cli: Cli, config: FormsConfig) -> anyhow::Result<()> {
    if let Commands::Config { action } = cli.command {
        return config::handle(action, &config, cli.profile.as_deref());
    }

    let workspace = Workspace::open(&config, cli.format).await?;
    match cli.command {
        Commands::Types => fields::types(&workspace),
        Commands::New { title, description } => fields::new_form(&workspace, title, description),
        Commands::Show => fields::show(&workspace),
        Commands::Meta { title, description } => fields::meta(&workspace, title, description),
        Commands::Add { field_type } => fields::add(&workspace, field_type),
        Commands::SetLabel { id, label } => fields::set_label(&workspace, &id, label),
        Commands::SetPlaceholder { id, placeholder } => fields::set_placeholder(&workspace, &id, placeholder),
        Commands::Require { id, off } => fields::require(&workspace, &id, !off),
        Commands::Rule { id, min, max, pattern, message, clear } => {
            fields::rule(&workspace, &id, fields::RuleArgs { min, max, pattern, message, clear })
        }
        Commands::Retype { id, field_type } => fields::retype(&workspace, &id, field_type),
        Commands::Remove { id } => fields::remove(&workspace, &id),
        Commands::Duplicate { id } => fields::duplicate(&workspace, &id),
        Commands::Move { id, target } => fields::move_field(&workspace, &id, &target),
        Commands::Options { action } => logic::options(&workspace, action),
        Commands::Condition { action } => logic::conditions(&workspace, action),
        Commands::Logic { id, enabled, action, logic_type } => {
            logic::set_logic(&workspace, &id, enabled, action, logic_type)
        }
        Commands::Preview { values } => logic::preview(&workspace, values.as_deref()),
        Commands::Validate { values } => logic::validate(&workspace, &values),
        Commands::Save => share::save(&workspace).await,
        Commands::Share => share::share(&workspace),
        Commands::Open { url } => share::open(&workspace, &url).await,
        Commands::Export => share::export(&workspace).await,
        Commands::Import { file } => share::import(&workspace, &file).await,
        Commands::Clear => share::clear(&workspace).await,
        Commands::Config { .. } => unreachable!("handled above"),
    }?;

    workspace.persist().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::FieldType;

    #[test]
    fn test_resolve_by_id_or_position() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        let b = schema.add_field(FieldType::Email);

        assert_eq!(resolve_field(&schema, a.as_str()).unwrap(), a);
        assert_eq!(resolve_field(&schema, "2").unwrap(), b);
        assert!(resolve_field(&schema, "0").is_err());
        assert!(resolve_field(&schema, "3").is_err());
        assert!(resolve_field(&schema, "ghost").is_err());
    }

    #[test]
    fn test_read_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{"a": "x", "b": true}"#).unwrap();
        let values = read_values(&path).unwrap();
        assert_eq!(values.len(), 2);

        std::fs::write(&path, "[1]").unwrap();
        assert!(read_values(&path).is_err());
    }
}
