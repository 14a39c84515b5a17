use record_api::{Cardinality, FieldInfo, FieldKind, ProtoMessage, Value};

/// In-memory message for unit tests. Unset fields are declared but absent.
pub(crate) struct TestMessage {
    name: String,
    fields: Vec<(FieldInfo, Option<Value>)>,
}

impl TestMessage {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            fields: Vec::new(),
        }
    }

    fn declare(mut self, name: &str, cardinality: Cardinality, kind: FieldKind, value: Option<Value>) -> Self {
        let info = FieldInfo {
            name: name.to_owned(),
            cardinality,
            kind,
        };
        self.fields.push((info, value));
        self
    }

    pub(crate) fn scalar(self, name: &str, value: impl Into<Value>) -> Self {
        self.declare(name, Cardinality::Singular, FieldKind::Scalar, Some(value.into()))
    }

    pub(crate) fn unset(self, name: &str) -> Self {
        self.declare(name, Cardinality::Singular, FieldKind::Scalar, None)
    }

    pub(crate) fn repeated(self, name: &str, items: Vec<Value>) -> Self {
        let value = (!items.is_empty()).then_some(Value::List(items));
        self.declare(name, Cardinality::Repeated, FieldKind::Scalar, value)
    }
}

impl ProtoMessage for TestMessage {
    fn message_name(&self) -> String {
        self.name.clone()
    }

    fn field_set(&self) -> Vec<FieldInfo> {
        self.fields.iter().map(|(info, _)| info.clone()).collect()
    }

    fn is_present(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|(info, value)| info.name == name && value.is_some())
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.fields
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(info, value)| match value {
                Some(v) => v.clone(),
                None if info.is_repeated() => Value::List(Vec::new()),
                None => Value::Null,
            })
    }
}
