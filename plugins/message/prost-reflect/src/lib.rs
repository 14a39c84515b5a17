use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use prost::Message;
use prost_reflect::{
    DescriptorPool, DynamicMessage, FieldDescriptor, Kind, MapKey, MessageDescriptor,
    ReflectMessage,
};
use record_api::{Cardinality, FieldInfo, FieldKind, ProtoMessage, Value};

// ---- Errors ----

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("descriptor_path is required")]
    MissingPath,

    #[error("message_type is required")]
    MissingMessageType,

    #[error("failed to read descriptor file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse descriptor set: {0}")]
    Parse(#[from] prost_reflect::DescriptorError),

    #[error("message type '{0}' not found in descriptor")]
    UnknownMessage(String),

    #[error("protobuf decode: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("json→protobuf: {0}")]
    Json(#[from] serde_json::Error),
}

// ---- Config ----

#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct MessageSourceConfig {
    /// Path to FileDescriptorSet (.bin from `protoc --descriptor_set_out`).
    pub descriptor_path: PathBuf,
    /// Fully-qualified message type name (e.g. "app.UserMessage").
    pub message_type: String,
}

impl MessageSourceConfig {
    /// Read the descriptor set and look up `message_type` in it.
    pub fn load(&self) -> Result<MessageDescriptor, DescriptorError> {
        if self.descriptor_path.as_os_str().is_empty() {
            return Err(DescriptorError::MissingPath);
        }
        if self.message_type.is_empty() {
            return Err(DescriptorError::MissingMessageType);
        }

        let descriptor_bytes =
            std::fs::read(&self.descriptor_path).map_err(|source| DescriptorError::Read {
                path: self.descriptor_path.clone(),
                source,
            })?;
        let pool = DescriptorPool::decode(descriptor_bytes.as_slice())?;
        message_descriptor(&pool, &self.message_type)
    }
}

/// Load `message_type` from the FileDescriptorSet at `path`.
pub fn load_message_descriptor(
    path: impl AsRef<Path>,
    message_type: &str,
) -> Result<MessageDescriptor, DescriptorError> {
    MessageSourceConfig {
        descriptor_path: path.as_ref().to_path_buf(),
        message_type: message_type.to_owned(),
    }
    .load()
}

pub fn message_descriptor(
    pool: &DescriptorPool,
    message_type: &str,
) -> Result<MessageDescriptor, DescriptorError> {
    pool.get_message_by_name(message_type)
        .ok_or_else(|| DescriptorError::UnknownMessage(message_type.to_owned()))
}

// ---- Decoding ----

/// Decode wire bytes into a message of the given type.
pub fn decode(
    descriptor: &MessageDescriptor,
    data: &[u8],
) -> Result<ReflectedMessage, DescriptorError> {
    Ok(DynamicMessage::decode(descriptor.clone(), data)?.into())
}

/// Build a message from its canonical JSON mapping.
pub fn from_json(
    descriptor: &MessageDescriptor,
    value: &serde_json::Value,
) -> Result<ReflectedMessage, DescriptorError> {
    Ok(DynamicMessage::deserialize(descriptor.clone(), value)?.into())
}

/// Encode back to wire bytes.
pub fn encode(message: &ReflectedMessage) -> Vec<u8> {
    message.0.encode_to_vec()
}

// ---- ProtoMessage ----

/// A `DynamicMessage` seen through [`ProtoMessage`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedMessage(pub DynamicMessage);

impl ReflectedMessage {
    /// Empty message of the given type.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self(DynamicMessage::new(descriptor))
    }
}

impl From<DynamicMessage> for ReflectedMessage {
    fn from(message: DynamicMessage) -> Self {
        Self(message)
    }
}

impl ProtoMessage for ReflectedMessage {
    fn message_name(&self) -> String {
        self.0.descriptor().full_name().to_owned()
    }

    fn field_set(&self) -> Vec<FieldInfo> {
        self.0.descriptor().fields().map(|f| field_info(&f)).collect()
    }

    /// Explicit presence where the field has it, non-default value otherwise
    /// (proto3 implicit presence).
    fn is_present(&self, name: &str) -> bool {
        self.0.has_field_by_name(name)
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.0.get_field_by_name(name).map(|v| to_value(&v))
    }
}

fn field_info(field: &FieldDescriptor) -> FieldInfo {
    let cardinality = match field.cardinality() {
        prost_reflect::Cardinality::Repeated => Cardinality::Repeated,
        prost_reflect::Cardinality::Optional | prost_reflect::Cardinality::Required => {
            Cardinality::Singular
        }
    };
    let kind = if field.is_map() {
        FieldKind::Map
    } else if matches!(field.kind(), Kind::Message(_)) {
        FieldKind::Message
    } else {
        FieldKind::Scalar
    };

    FieldInfo {
        name: field.name().to_owned(),
        cardinality,
        kind,
    }
}

fn to_value(value: &prost_reflect::Value) -> Value {
    use prost_reflect::Value as Pv;

    match value {
        Pv::Bool(v) => Value::Bool(*v),
        Pv::I32(v) => Value::Int64(i64::from(*v)),
        Pv::I64(v) => Value::Int64(*v),
        Pv::U32(v) => Value::UInt64(u64::from(*v)),
        Pv::U64(v) => Value::UInt64(*v),
        Pv::F32(v) => Value::Float32(*v),
        Pv::F64(v) => Value::Float64(*v),
        Pv::String(s) => Value::String(s.clone()),
        Pv::Bytes(b) => Value::Bytes(b.to_vec()),
        Pv::EnumNumber(n) => Value::Enum(*n),
        Pv::Message(m) => Value::Message(message_fields(m)),
        Pv::List(items) => Value::List(items.iter().map(to_value).collect()),
        Pv::Map(entries) => {
            let mut entries: Vec<_> = entries.iter().collect();
            entries.sort_by(|(a, _), (b, _)| map_key_order(a, b));
            Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (map_key(k), to_value(v)))
                    .collect(),
            )
        }
    }
}

fn map_key(key: &MapKey) -> Value {
    match key {
        MapKey::Bool(v) => Value::Bool(*v),
        MapKey::I32(v) => Value::Int64(i64::from(*v)),
        MapKey::I64(v) => Value::Int64(*v),
        MapKey::U32(v) => Value::UInt64(u64::from(*v)),
        MapKey::U64(v) => Value::UInt64(*v),
        MapKey::String(s) => Value::String(s.clone()),
    }
}

/// Keys of one map share a type; mixed types never occur.
fn map_key_order(a: &MapKey, b: &MapKey) -> Ordering {
    match (a, b) {
        (MapKey::Bool(a), MapKey::Bool(b)) => a.cmp(b),
        (MapKey::I32(a), MapKey::I32(b)) => a.cmp(b),
        (MapKey::I64(a), MapKey::I64(b)) => a.cmp(b),
        (MapKey::U32(a), MapKey::U32(b)) => a.cmp(b),
        (MapKey::U64(a), MapKey::U64(b)) => a.cmp(b),
        (MapKey::String(a), MapKey::String(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Set fields of a nested message.
fn message_fields(message: &DynamicMessage) -> BTreeMap<String, Value> {
    message
        .fields()
        .map(|(field, value)| (field.name().to_owned(), to_value(value)))
        .collect()
}
