//! Form schema aggregate
//!
//! Owns the ordered field list and keeps condition references consistent:
//! after any operation returns, every condition targets a field that exists
//! and is not its own field.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::field::{default_options, ConditionPatch, Field, FieldPatch, OptionPatch};
use crate::domain::events::SchemaEvent;
use crate::domain::value_objects::{
    Condition, ConditionId, ConditionOperator, ConditionalLogic, FieldId, FieldOption, FieldType,
    OptionId,
};
use crate::error::{FormsError, Result};

/// Title of a fresh schema
pub const DEFAULT_TITLE: &str = "Untitled Form";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// Transport shape of a schema, shared by every encoding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaPayload {
    #[serde(rename = "formTitle", alias = "title", default = "default_title")]
    pub title: String,
    #[serde(rename = "formDescription", alias = "description", default)]
    pub description: String,
    pub fields: Vec<Field>,
}

impl Default for SchemaPayload {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            fields: Vec::new(),
        }
    }
}

/// Partial update for the title/description
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormMetaPatch {
    #[serde(rename = "formTitle", alias = "title")]
    pub title: Option<String>,
    #[serde(rename = "formDescription", alias = "description")]
    pub description: Option<String>,
}

/// Form schema aggregate root
#[derive(Clone, Debug)]
pub struct FormSchema {
    title: String,
    description: String,
    fields: Vec<Field>,
    // Events accumulated since the last drain
    events: Vec<SchemaEvent>,
}

impl FormSchema {
    /// Empty schema titled "Untitled Form"
    pub fn new() -> Self {
        Self::with_title(DEFAULT_TITLE)
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            fields: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Validate and hydrate a decoded payload
    pub fn from_payload(payload: SchemaPayload) -> Result<Self> {
        let mut schema = Self::new();
        schema.replace_schema(payload)?;
        schema.events.clear();
        Ok(schema)
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> &str { &self.description }
    pub fn fields(&self) -> &[Field] { &self.fields }
    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.position(id).is_some()
    }

    /// Owned copy of the transport shape
    pub fn to_payload(&self) -> SchemaPayload {
        SchemaPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Fields whose conditions point at `id`
    pub fn referencing_fields(&self, id: &FieldId) -> Vec<&FieldId> {
        self.fields
            .iter()
            .filter(|f| f.references(id))
            .map(|f| &f.id)
            .collect()
    }

    /// Fields a condition on `id` may target (every other field)
    pub fn available_condition_targets(&self, id: &FieldId) -> Vec<&Field> {
        self.fields.iter().filter(|f| &f.id != id).collect()
    }

    // =========================================================================
    // Field operations
    // =========================================================================

    /// Append a field with the defaults for `field_type`
    pub fn add_field(&mut self, field_type: FieldType) -> FieldId {
        let field = Field::new(field_type);
        let id = field.id.clone();
        debug!(field_id = %id, %field_type, "field added");
        self.fields.push(field);
        self.raise_event(SchemaEvent::FieldAdded { field_id: id.clone(), field_type });
        id
    }

    /// Merge a partial update into a field; `false` if the id is absent
    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let logic = patch.conditional_logic.map(|mut logic| {
            let dropped = self.repair_conditions(id, &mut logic);
            if dropped > 0 {
                warn!(field_id = %id, dropped, "dropped conditions with invalid targets");
            }
            logic
        });

        let reshaped = patch.field_type.is_some() || patch.options.is_some();
        let field = &mut self.fields[index];
        if let Some(field_type) = patch.field_type {
            field.field_type = field_type;
        }
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(validation) = patch.validation {
            field.validation = validation;
        }
        if let Some(options) = patch.options {
            field.options = options;
            dedupe_option_ids(&mut field.options);
        }
        if let Some(logic) = logic {
            field.conditional_logic = logic;
        }
        if reshaped && field.has_options() && field.options.is_empty() {
            field.options = default_options(field.field_type);
        }

        debug!(field_id = %id, "field updated");
        self.raise_event(SchemaEvent::FieldUpdated { field_id: id.clone() });
        true
    }

    /// Delete a field and every condition that targets it
    pub fn remove_field(&mut self, id: &FieldId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.fields.remove(index);

        let mut cascaded = 0;
        for field in &mut self.fields {
            let conditions = &mut field.conditional_logic.conditions;
            let before = conditions.len();
            conditions.retain(|c| &c.field_id != id);
            cascaded += before - conditions.len();
        }

        debug!(field_id = %id, cascaded, "field removed");
        self.raise_event(SchemaEvent::FieldRemoved {
            field_id: id.clone(),
            cascaded_conditions: cascaded,
        });
        true
    }

    /// Clone a field right after itself; returns the clone's id
    pub fn duplicate_field(&mut self, id: &FieldId) -> Option<FieldId> {
        let index = self.position(id)?;
        let copy = self.fields[index].duplicate();
        let copy_id = copy.id.clone();
        self.fields.insert(index + 1, copy);

        debug!(source_id = %id, field_id = %copy_id, "field duplicated");
        self.raise_event(SchemaEvent::FieldDuplicated {
            source_id: id.clone(),
            field_id: copy_id.clone(),
        });
        Some(copy_id)
    }

    /// Move `moved_id` into the slot currently held by `target_id`
    pub fn reorder_fields(&mut self, moved_id: &FieldId, target_id: &FieldId) -> bool {
        if moved_id == target_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(moved_id), self.position(target_id)) else {
            return false;
        };

        let field = self.fields.remove(from);
        self.fields.insert(to, field);

        debug!(%moved_id, %target_id, from, to, "fields reordered");
        self.raise_event(SchemaEvent::FieldsReordered {
            moved_id: moved_id.clone(),
            target_id: target_id.clone(),
        });
        true
    }

    /// Merge title/description changes
    pub fn update_form_meta(&mut self, patch: FormMetaPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.raise_event(SchemaEvent::MetaUpdated);
    }

    /// Replace the whole schema with a decoded payload
    ///
    /// Structural problems (blank or duplicate ids) reject the payload and
    /// leave `self` untouched. Conditions with dangling or self targets are
    /// dropped, and option-bearing fields without options get the defaults.
    pub fn replace_schema(&mut self, payload: SchemaPayload) -> Result<()> {
        check_structure(&payload.fields)?;

        let SchemaPayload { title, description, mut fields } = payload;
        let known: HashSet<FieldId> = fields.iter().map(|f| f.id.clone()).collect();
        for field in &mut fields {
            let dropped = retain_valid_targets(&field.id, &mut field.conditional_logic, &known);
            if dropped > 0 {
                warn!(field_id = %field.id, dropped, "dropped conditions with invalid targets");
            }
            if field.has_options() && field.options.is_empty() {
                debug!(field_id = %field.id, "seeded missing options");
                field.options = default_options(field.field_type);
            }
        }

        self.title = if title.is_empty() { default_title() } else { title };
        self.description = description;
        self.fields = fields;

        debug!(field_count = self.fields.len(), "schema replaced");
        self.raise_event(SchemaEvent::SchemaReplaced { field_count: self.fields.len() });
        Ok(())
    }

    /// Back to an empty, untitled schema
    pub fn reset(&mut self) {
        self.title = default_title();
        self.description.clear();
        self.fields.clear();
        self.raise_event(SchemaEvent::SchemaReset);
    }

    // =========================================================================
    // Option operations
    // =========================================================================

    /// Append "Option N" to an option-bearing field
    pub fn add_option(&mut self, field_id: &FieldId) -> Option<OptionId> {
        let field = self.field_mut(field_id)?;
        if !field.has_options() {
            return None;
        }
        let option = FieldOption::numbered(field.options.len() + 1);
        let option_id = option.id.clone();
        field.options.push(option);
        self.raise_event(SchemaEvent::OptionsChanged { field_id: field_id.clone() });
        Some(option_id)
    }

    pub fn update_option(&mut self, field_id: &FieldId, option_id: &OptionId, patch: OptionPatch) -> bool {
        let Some(option) = self
            .field_mut(field_id)
            .and_then(|f| f.options.iter_mut().find(|o| &o.id == option_id))
        else {
            return false;
        };
        if let Some(label) = patch.label {
            option.label = label;
        }
        if let Some(value) = patch.value {
            option.value = value;
        }
        self.raise_event(SchemaEvent::OptionsChanged { field_id: field_id.clone() });
        true
    }

    /// Remove an option; the last remaining option is never removed
    pub fn remove_option(&mut self, field_id: &FieldId, option_id: &OptionId) -> bool {
        let Some(field) = self.field_mut(field_id) else {
            return false;
        };
        if field.options.len() <= 1 {
            return false;
        }
        let before = field.options.len();
        field.options.retain(|o| &o.id != option_id);
        if field.options.len() == before {
            return false;
        }
        self.raise_event(SchemaEvent::OptionsChanged { field_id: field_id.clone() });
        true
    }

    // =========================================================================
    // Condition operations
    // =========================================================================

    /// Append `<first other field> equals ""` to a field's conditions
    pub fn add_condition(&mut self, field_id: &FieldId) -> Option<ConditionId> {
        if !self.contains(field_id) {
            return None;
        }
        let target = self.fields.iter().find(|f| &f.id != field_id)?.id.clone();
        let condition = Condition::new(target, ConditionOperator::Equals, "");
        let condition_id = condition.id.clone();
        self.field_mut(field_id)?
            .conditional_logic
            .conditions
            .push(condition);
        self.raise_event(SchemaEvent::ConditionsChanged { field_id: field_id.clone() });
        Some(condition_id)
    }

    /// Patch a condition; retargeting to self or to an absent field is refused
    pub fn update_condition(
        &mut self,
        field_id: &FieldId,
        condition_id: &ConditionId,
        patch: ConditionPatch,
    ) -> bool {
        if let Some(target) = &patch.field_id {
            if target == field_id || !self.contains(target) {
                warn!(%field_id, %target, "refused condition retarget");
                return false;
            }
        }
        let Some(condition) = self.field_mut(field_id).and_then(|f| {
            f.conditional_logic
                .conditions
                .iter_mut()
                .find(|c| &c.id == condition_id)
        }) else {
            return false;
        };
        patch.apply(condition);
        self.raise_event(SchemaEvent::ConditionsChanged { field_id: field_id.clone() });
        true
    }

    pub fn remove_condition(&mut self, field_id: &FieldId, condition_id: &ConditionId) -> bool {
        let Some(field) = self.field_mut(field_id) else {
            return false;
        };
        let conditions = &mut field.conditional_logic.conditions;
        let before = conditions.len();
        conditions.retain(|c| &c.id != condition_id);
        if conditions.len() == before {
            return false;
        }
        self.raise_event(SchemaEvent::ConditionsChanged { field_id: field_id.clone() });
        true
    }

    // =========================================================================
    // Domain events
    // =========================================================================

    /// Get and clear accumulated events
    pub fn take_events(&mut self) -> Vec<SchemaEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise_event(&mut self, event: SchemaEvent) {
        self.events.push(event);
    }

    fn field_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    fn repair_conditions(&self, owner: &FieldId, logic: &mut ConditionalLogic) -> usize {
        let known: HashSet<FieldId> = self.fields.iter().map(|f| f.id.clone()).collect();
        retain_valid_targets(owner, logic, &known)
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FormSchema {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.fields == other.fields
    }
}

impl TryFrom<SchemaPayload> for FormSchema {
    type Error = FormsError;

    fn try_from(payload: SchemaPayload) -> Result<Self> {
        Self::from_payload(payload)
    }
}

/// Drop conditions targeting the owner or unknown fields, refresh repeated
/// condition ids. Returns the number dropped.
fn retain_valid_targets(owner: &FieldId, logic: &mut ConditionalLogic, known: &HashSet<FieldId>) -> usize {
    let before = logic.conditions.len();
    logic
        .conditions
        .retain(|c| &c.field_id != owner && known.contains(&c.field_id));

    let mut seen = HashSet::new();
    for condition in &mut logic.conditions {
        if !seen.insert(condition.id.clone()) {
            condition.id = ConditionId::generate();
        }
    }
    before - logic.conditions.len()
}

fn dedupe_option_ids(options: &mut [FieldOption]) {
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.id.clone()) {
            option.id = OptionId::generate();
        }
    }
}

fn check_structure(fields: &[Field]) -> Result<()> {
    let mut field_ids = HashSet::new();
    for field in fields {
        if field.id.as_str().is_empty() {
            return Err(FormsError::MalformedSchema("field with empty id".into()));
        }
        if !field_ids.insert(&field.id) {
            return Err(FormsError::MalformedSchema(format!("duplicate field id: {}", field.id)));
        }

        let mut option_ids = HashSet::new();
        for option in &field.options {
            if option.id.as_str().is_empty() || !option_ids.insert(&option.id) {
                return Err(FormsError::MalformedSchema(format!(
                    "field {}: blank or duplicate option id {:?}",
                    field.id,
                    option.id.as_str()
                )));
            }
        }

        let mut condition_ids = HashSet::new();
        for condition in &field.conditional_logic.conditions {
            if condition.id.as_str().is_empty() || !condition_ids.insert(&condition.id) {
                return Err(FormsError::MalformedSchema(format!(
                    "field {}: blank or duplicate condition id {:?}",
                    field.id,
                    condition.id.as_str()
                )));
            }
        }
    }
    Ok(())
}
