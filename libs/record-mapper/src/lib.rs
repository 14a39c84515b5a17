//! Maps decoded protobuf messages onto record attributes.
//!
//! A [`RecordType`] owns the attribute set, the transformer registry and the
//! mapper settings of one record type. It is built once, at type-definition
//! time, and read-only afterwards:
//!
//! ```ignore
//! let mut user = RecordType::new("User", schema);
//! user.define_method("extract_first_name", Method::unary(extract_first_name));
//! user.attribute_from_proto("first_name", Transformer::method("extract_first_name"))?;
//!
//! let attributes = user.attributes_from_proto(&message)?;
//! ```

pub mod convert;
pub mod error;
pub mod record;
pub mod transformation;
pub mod transformer;

#[cfg(test)]
mod test_support;

pub use error::{AttributeTransformerError, MapperError, TransformerRejection};
pub use record::{ProtoRecord, RecordType};
pub use transformer::{
    AttributeTransformer, Method, Transformer, TransformError, TransformResult,
    TransformerOptions, TransformerRegistry,
};

pub use record_api::{Attributes, ColumnType, MapperConfig, ProtoMessage, RecordSchema, Value};
