pub mod config;
pub mod error;
pub mod mapping;
pub mod message;
pub mod schema;
pub mod value;

pub use config::{MapperConfig, RecordConfig, TimeZoneSetting};
pub use error::ConfigError;
pub use mapping::Attributes;
pub use message::{Cardinality, FieldInfo, FieldKind, NULLIFY_FIELD, ProtoMessage};
pub use schema::{Attribute, AttributeKind, ColumnType, Field, FieldType, RecordSchema, Schema};
pub use value::Value;
