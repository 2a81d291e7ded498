//! Serialization codec
//!
//! Two encodings of the same transport shape (`SchemaPayload`):
//! - **share**: compact text that fits in a URL query parameter
//! - **durable**: JSON with a timestamp and version tag for storage and export
//!
//! Decoders only produce payloads. Callers hydrate them through
//! `FormSchema::from_payload` or `FormSchema::replace_schema`.

pub mod durable;
pub mod share;

pub use durable::{
    decode_document, encode_for_export, encode_for_storage, export_file_name, DurableDocument,
    SCHEMA_VERSION,
};
pub use share::{
    build_share_url, decode_share, encode_share, extract_shared_form, strip_shared_form,
    SHARE_PARAM,
};
