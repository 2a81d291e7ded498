//! Option, condition and answer commands

use anyhow::{anyhow, bail};
use colored::Colorize;
use formwork_core::domain::catalog;
use formwork_core::domain::services::{field_states, validate_submission};
use formwork_core::{
    ConditionId, ConditionOperator, ConditionPatch, ConditionalAction, FieldPatch, FormValues,
    LogicType, OptionId, OptionPatch,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::{read_values, Workspace};
use crate::{ConditionCommands, OptionCommands};

#[derive(Debug, Serialize, Tabled)]
pub struct StateRow {
    pub id: String,
    pub label: String,
    pub visible: bool,
    pub disabled: bool,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ResultRow {
    pub id: String,
    pub label: String,
    pub valid: bool,
    pub errors: String,
}

pub fn options(ws: &Workspace, action: OptionCommands) -> anyhow::Result<()> {
    match action {
        OptionCommands::Add { field } => {
            let id = ws.resolve(&field)?;
            let option = ws
                .service
                .add_option_strict(&id)?
                .ok_or_else(|| anyhow!("field {} does not take options", id))?;
            println!("Added option {}", option.to_string().cyan());
        }
        OptionCommands::Set { field, option, label, value } => {
            let id = ws.resolve(&field)?;
            ws.service
                .update_option_strict(&id, &OptionId::from(option.as_str()), OptionPatch { label, value })?;
        }
        OptionCommands::Remove { field, option } => {
            let id = ws.resolve(&field)?;
            if !ws.service.remove_option_strict(&id, &OptionId::from(option.as_str()))? {
                bail!("a field keeps at least one option");
            }
        }
    }
    Ok(())
}

pub fn conditions(ws: &Workspace, action: ConditionCommands) -> anyhow::Result<()> {
    match action {
        ConditionCommands::Add { field } => {
            let id = ws.resolve(&field)?;
            let condition = ws
                .service
                .add_condition_strict(&id)?
                .ok_or_else(|| anyhow!("add another field first; a condition cannot target its own field"))?;
            println!("Added condition {}", condition.to_string().cyan());
        }
        ConditionCommands::Set { field, condition, target, operator, value } => {
            let id = ws.resolve(&field)?;
            let target = target.map(|t| ws.resolve(&t)).transpose()?;
            let patch = ConditionPatch { field_id: target, operator, value };
            if !ws
                .service
                .update_condition_strict(&id, &ConditionId::from(condition.as_str()), patch)?
            {
                bail!("a condition cannot target its own field");
            }
        }
        ConditionCommands::Remove { field, condition } => {
            let id = ws.resolve(&field)?;
            ws.service
                .remove_condition_strict(&id, &ConditionId::from(condition.as_str()))?;
        }
        ConditionCommands::Operators { target } => {
            let id = ws.resolve(&target)?;
            let schema = ws.service.snapshot();
            let field_type = schema
                .field(&id)
                .map(|f| f.field_type)
                .ok_or_else(|| anyhow!("no field {}", id))?;
            let operators: Vec<&str> = catalog::operators_for(field_type)
                .iter()
                .map(ConditionOperator::as_str)
                .collect();
            ws.format.print(&operators);
        }
    }
    Ok(())
}

pub fn set_logic(
    ws: &Workspace,
    reference: &str,
    enabled: Option<bool>,
    action: Option<ConditionalAction>,
    logic_type: Option<LogicType>,
) -> anyhow::Result<()> {
    let id = ws.resolve(reference)?;
    let mut logic = ws
        .service
        .snapshot()
        .field(&id)
        .map(|f| f.conditional_logic.clone())
        .unwrap_or_default();
    if let Some(enabled) = enabled {
        logic.enabled = enabled;
    }
    if let Some(action) = action {
        logic.action = action;
    }
    if let Some(logic_type) = logic_type {
        logic.logic_type = logic_type;
    }
    ws.service
        .update_field_strict(&id, FieldPatch { conditional_logic: Some(logic), ..Default::default() })?;
    Ok(())
}

pub fn preview(ws: &Workspace, values: Option<&Path>) -> anyhow::Result<()> {
    let values = match values {
        Some(path) => read_values(path)?,
        None => FormValues::new(),
    };
    let schema = ws.service.snapshot();
    let rows: Vec<StateRow> = field_states(&schema, &values)
        .into_iter()
        .map(|state| StateRow {
            label: schema.field(&state.id).map(|f| f.label.clone()).unwrap_or_default(),
            id: state.id.to_string(),
            visible: state.visible,
            disabled: state.disabled,
        })
        .collect();
    ws.format.print_rows(&rows);
    Ok(())
}

pub fn validate(ws: &Workspace, values: &Path) -> anyhow::Result<()> {
    let values = read_values(values)?;
    let schema = ws.service.snapshot();
    let outcome = validate_submission(&schema, &values);

    match ws.format {
        crate::output::OutputFormat::Table => {
            let rows: Vec<ResultRow> = outcome
                .field_results
                .iter()
                .map(|(id, result)| ResultRow {
                    id: id.to_string(),
                    label: schema.field(id).map(|f| f.label.clone()).unwrap_or_default(),
                    valid: result.valid,
                    errors: result.errors.join("; "),
                })
                .collect();
            ws.format.print_rows(&rows);
        }
        _ => ws.format.print(&outcome),
    }

    if outcome.is_valid {
        println!("{}", "All answers are valid".green());
        Ok(())
    } else {
        bail!("{} field(s) failed validation", outcome.failures().count())
    }
}
