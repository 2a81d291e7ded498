//! Schema events
//!
//! Recorded by every successful mutation and drained by the host with
//! `FormSchema::take_events`. Never serialized.

use crate::domain::value_objects::{FieldId, FieldType};

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaEvent {
    FieldAdded { field_id: FieldId, field_type: FieldType },
    FieldUpdated { field_id: FieldId },
    FieldRemoved { field_id: FieldId, cascaded_conditions: usize },
    FieldDuplicated { source_id: FieldId, field_id: FieldId },
    FieldsReordered { moved_id: FieldId, target_id: FieldId },
    OptionsChanged { field_id: FieldId },
    ConditionsChanged { field_id: FieldId },
    MetaUpdated,
    SchemaReplaced { field_count: usize },
    SchemaReset,
}
