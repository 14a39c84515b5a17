use crate::value::Value;

/// Name of the repeated string field listing attributes to clear.
pub const NULLIFY_FIELD: &str = "nullify";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Message,
    Map,
}

/// Static description of one message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub cardinality: Cardinality,
    pub kind: FieldKind,
}

impl FieldInfo {
    /// Lists and maps. Neither is ever mapped straight onto an attribute.
    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated || self.kind == FieldKind::Map
    }
}

/// A decoded protobuf message, read-only.
///
/// The mapper never decodes wire bytes: implementors wrap whatever the
/// decoding library produced (see the `message-prost-reflect` plugin).
pub trait ProtoMessage {
    /// Fully-qualified message type name (e.g. "app.UserMessage").
    fn message_name(&self) -> String;

    /// Every field the message type declares, set or not.
    fn field_set(&self) -> Vec<FieldInfo>;

    /// Presence predicate: `true` when the field is known and holds a value.
    fn is_present(&self, name: &str) -> bool;

    /// Current value of a known field (its default when unset).
    /// `None` for names the message type does not declare.
    fn field_value(&self, name: &str) -> Option<Value>;

    fn field_info(&self, name: &str) -> Option<FieldInfo> {
        self.field_set().into_iter().find(|f| f.name == name)
    }

    /// Attribute names listed in the message's `nullify` field.
    ///
    /// Empty unless the message declares `nullify` as a repeated field and it is set.
    fn nullify_list(&self) -> Vec<String> {
        let declared_repeated = self
            .field_info(NULLIFY_FIELD)
            .is_some_and(|f| f.is_repeated());
        if !declared_repeated || !self.is_present(NULLIFY_FIELD) {
            return Vec::new();
        }
        match self.field_value(NULLIFY_FIELD) {
            Some(Value::List(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
