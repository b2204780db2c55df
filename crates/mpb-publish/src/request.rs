use mpb_content::{FormFields, from_flat_form, from_structured_properties};
use mpb_core::Entry;
use serde_json::Value;

/// A create request, as decoded by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateRequest {
    /// `application/json`: `{"type": [...], "properties": {...}}`
    Structured(Value),
    /// Form-encoded or multipart fields.
    Form(FormFields),
}

impl CreateRequest {
    /// Normalize to an entry. `None` without a type (`type` / `h`).
    pub fn to_entry(&self) -> Option<Entry> {
        match self {
            Self::Structured(doc) => from_structured_properties(doc),
            Self::Form(fields) => from_flat_form(fields),
        }
    }
}

impl From<Value> for CreateRequest {
    fn from(doc: Value) -> Self {
        Self::Structured(doc)
    }
}

impl From<FormFields> for CreateRequest {
    fn from(fields: FormFields) -> Self {
        Self::Form(fields)
    }
}
