//! Field commands

use anyhow::bail;
use colored::Colorize;
use formwork_core::domain::catalog;
use formwork_core::domain::services::describe_condition;
use formwork_core::{Field, FieldPatch, FieldType, FormMetaPatch, FormSchema, LogicType, ValidationRule};
use serde::Serialize;
use tabled::Tabled;

use super::Workspace;

#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub id: String,
    #[tabled(rename = "type")]
    pub field_type: String,
    pub label: String,
    pub required: bool,
    pub options: String,
    pub logic: String,
}

impl FieldRow {
    fn new(position: usize, field: &Field, schema: &FormSchema) -> Self {
        let options = field
            .options
            .iter()
            .map(|o| o.label.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let logic = &field.conditional_logic;
        let logic = if logic.conditions.is_empty() {
            String::new()
        } else {
            let joined = logic
                .conditions
                .iter()
                .map(|c| describe_condition(c, schema.fields()))
                .collect::<Vec<_>>()
                .join(match logic.logic_type {
                    LogicType::All => " and ",
                    LogicType::Any => " or ",
                });
            let state = if logic.enabled { "" } else { " (off)" };
            format!("{} when {}{}", logic.action.label(), joined, state)
        };
        Self {
            position,
            id: field.id.to_string(),
            field_type: field.field_type.to_string(),
            label: field.label.clone(),
            required: field.required,
            options,
            logic,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct TypeRow {
    #[tabled(rename = "type")]
    pub field_type: String,
    pub label: String,
    pub has_options: bool,
    pub operators: String,
}

pub struct RuleArgs {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
    pub message: Option<String>,
    pub clear: bool,
}

pub fn rows(schema: &FormSchema) -> Vec<FieldRow> {
    schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| FieldRow::new(i + 1, field, schema))
        .collect()
}

pub fn types(ws: &Workspace) -> anyhow::Result<()> {
    let rows: Vec<TypeRow> = catalog::all()
        .map(|info| TypeRow {
            field_type: info.field_type.to_string(),
            label: info.label.to_string(),
            has_options: info.has_options,
            operators: catalog::operators_for(info.field_type)
                .iter()
                .map(|op| op.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    ws.format.print_rows(&rows);
    Ok(())
}

pub fn new_form(ws: &Workspace, title: Option<String>, description: Option<String>) -> anyhow::Result<()> {
    ws.service.new_form(title.as_deref());
    if description.is_some() {
        ws.service.edit(|s| s.update_form_meta(FormMetaPatch { title: None, description }));
    }
    println!("Started {}", ws.service.snapshot().title().bold());
    Ok(())
}

pub fn show(ws: &Workspace) -> anyhow::Result<()> {
    let schema = ws.service.snapshot();
    match ws.format {
        crate::output::OutputFormat::Table => {
            println!("{}", schema.title().bold());
            if !schema.description().is_empty() {
                println!("{}", schema.description());
            }
            ws.format.print_rows(&rows(&schema));
        }
        _ => ws.format.print(&schema.to_payload()),
    }
    Ok(())
}

pub fn meta(ws: &Workspace, title: Option<String>, description: Option<String>) -> anyhow::Result<()> {
    if title.is_none() && description.is_none() {
        bail!("nothing to change; pass --title and/or --description");
    }
    ws.service.edit(|s| s.update_form_meta(FormMetaPatch { title, description }));
    Ok(())
}

pub fn add(ws: &Workspace, field_type: FieldType) -> anyhow::Result<()> {
    let id = ws.service.edit(|s| s.add_field(field_type));
    println!("Added {} field {}", field_type, id.to_string().cyan());
    Ok(())
}

pub fn set_label(ws: &Workspace, reference: &str, label: String) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    ws.service.update_field_strict(&id, FieldPatch { label: Some(label), ..Default::default() })?;
    Ok(())
}

pub fn set_placeholder(ws: &Workspace, reference: &str, placeholder: String) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    ws.service
        .update_field_strict(&id, FieldPatch { placeholder: Some(placeholder), ..Default::default() })?;
    Ok(())
}

pub fn require(ws: &Workspace, reference: &str, required: bool) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    ws.service.update_field_strict(&id, FieldPatch { required: Some(required), ..Default::default() })?;
    Ok(())
}

pub fn rule(ws: &Workspace, reference: &str, args: RuleArgs) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    let snapshot = ws.service.snapshot();
    let current = snapshot.field(&id).map(|f| f.validation.clone()).unwrap_or_default();
    let mut validation = if args.clear { ValidationRule::default() } else { current };
    if args.min.is_some() {
        validation.min = args.min;
    }
    if args.max.is_some() {
        validation.max = args.max;
    }
    if let Some(pattern) = args.pattern {
        validation.pattern = Some(pattern).filter(|p| !p.is_empty());
    }
    if let Some(message) = args.message {
        validation.custom_error = message;
    }
    ws.service
        .update_field_strict(&id, FieldPatch { validation: Some(validation), ..Default::default() })?;
    Ok(())
}

pub fn retype(ws: &Workspace, reference: &str, field_type: FieldType) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    ws.service
        .update_field_strict(&id, FieldPatch { field_type: Some(field_type), ..Default::default() })?;
    Ok(())
}

pub fn remove(ws: &Workspace, reference: &str) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    let referencing = ws.service.snapshot().referencing_fields(&id).len();
    ws.service.remove_field_strict(&id)?;
    if referencing > 0 {
        println!("Removed conditions on {} other field(s)", referencing);
    }
    Ok(())
}

pub fn duplicate(ws: &Workspace, reference: &str) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    let copy = ws.service.duplicate_field_strict(&id)?;
    println!("Duplicated as {}", copy.to_string().cyan());
    Ok(())
}

pub fn move_field(ws: &Workspace, reference: &str, target: &str) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    let target = ws.resolve(target)?;
    ws.service.reorder_fields_strict(&id, &target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_core::{Condition, ConditionOperator};

    #[test]
    fn test_rows_describe_logic() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        let b = schema.add_field(FieldType::Radio);
        schema.update_field(&a, FieldPatch { label: Some("Name".into()), ..Default::default() });
        let mut logic = schema.field(&b).unwrap().conditional_logic.clone();
        logic.enabled = true;
        logic.conditions.push(Condition::new(a.clone(), ConditionOperator::IsNotEmpty, ""));
        schema.update_field(&b, FieldPatch { conditional_logic: Some(logic), ..Default::default() });

        let rows = rows(&schema);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].logic, "");
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].options, "Option 1, Option 2");
        assert!(rows[1].logic.contains("\"Name\" is not empty"), "{}", rows[1].logic);
    }
}
