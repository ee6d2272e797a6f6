//! Helpers for reading schemas and responses independent of the document's
//! OpenAPI version.

pub mod collection;
pub mod oas;
pub mod walker;

pub use collection::{Confidence, is_collection, response_is_collection};
pub use oas::{
    EnvelopeBody, nested_key_if_exists, operation_parameters, properties_oas_agnostic,
    response_body_schema, response_headers,
};
pub use walker::{FieldVisit, SchemaStep, schema_type, walk};
