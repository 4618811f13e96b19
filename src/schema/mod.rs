//! Schema system - the application record and its validation rules

pub mod field;
pub mod record;
pub mod registry;
pub mod rules;
pub mod template;
pub mod validator;

pub use field::{Field, FieldKind};
pub use record::ValidatedRecord;
pub use registry::SchemaRegistry;
pub use template::{ReceiptContext, ReceiptRenderer};
pub use validator::{validate, Choices, FieldError, FormSchema, ValidationErrors};
