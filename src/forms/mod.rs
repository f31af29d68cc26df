//! Schema-driven CRF entry engine: field type registry, field definition
//! checks, runtime form builder, normalizer and the save workflow tying
//! them to the stores.

pub mod builder;
pub mod capture;
pub mod definition;
pub mod field_type;
pub mod normalize;

pub use builder::{
    ChoiceOption, CleanedValues, EntryForm, FieldErrors, FormOutcome, FormSlot, Prefill,
    RawSubmission, build_entry_form,
};
pub use capture::{CaptureOutcome, load_entry_form, save_visit_crf};
pub use definition::{
    FieldDefinition, NewCrfField, SchemaError, parse_choices, validate_crf_definition,
    validate_field_definition,
};
pub use field_type::{FieldType, FieldValue, InputKind, REQUIRED_MESSAGE};
pub use normalize::{NormalizedEntry, normalize_submission};
