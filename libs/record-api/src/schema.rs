use std::collections::HashMap;

use crate::error::ConfigError;

/// Field property marking an attribute that is assignable but has no column.
pub const VIRTUAL_PROP: &str = "virtual";

/// Column data type as declared by the storage layer.
///
/// Type name and attributes are arbitrary — only the name is inspected,
/// to resolve a [`ColumnType`] hint.
///
/// Examples:
/// - `{ name: "date" }`
/// - `{ name: "timestamp", attrs: { precision: 6 } }`
/// - `{ name: "varchar", attrs: { length: 255 } }`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FieldType {
    pub name: String,
    #[serde(default)]
    pub attrs: HashMap<String, serde_json::Value>,
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: HashMap::new(),
        }
    }
}

/// A single record attribute as declared in configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Attribute-level properties. `virtual = true` marks a non-column attribute.
    #[serde(default)]
    pub props: HashMap<String, serde_json::Value>,
}

impl Field {
    fn is_virtual(&self) -> bool {
        self.props
            .get(VIRTUAL_PROP)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Declarative record schema, as read from configuration.
///
/// Resolved into a [`RecordSchema`] once, at type-definition time.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Date/time-like column hint selecting a coercion for epoch-second fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Date,
    DateTime,
    Time,
    Timestamp,
}

impl ColumnType {
    /// Resolve a hint from a SQL type name.
    ///
    /// Precision and zone suffixes are ignored: `timestamp(6)`,
    /// `timestamp with time zone` and `DateTime64(3)` all resolve.
    /// Candidates are checked in order date, datetime, time, timestamp.
    pub fn from_sql_type(type_name: &str) -> Option<Self> {
        let lower = type_name.trim().to_ascii_lowercase();
        let base = lower.split(['(', ' ']).next().unwrap_or_default();

        match base {
            "date" | "date32" => Some(ColumnType::Date),
            "datetime" | "datetime2" | "datetime64" | "smalldatetime" | "datetimeoffset" => {
                Some(ColumnType::DateTime)
            }
            "time" | "timetz" => Some(ColumnType::Time),
            "timestamp" | "timestamptz" => Some(ColumnType::Timestamp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Backed by a table column.
    Column,
    /// Assignable, no column behind it.
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    pub column_type: Option<ColumnType>,
}

/// Resolved attribute set of a record type.
///
/// Column hints are resolved once, here, and never re-evaluated per call.
#[derive(Debug, Clone, Default)]
pub struct RecordSchema {
    attributes: Vec<Attribute>,
    index: HashMap<String, usize>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a declarative [`Schema`]. Duplicate attribute names are rejected.
    pub fn from_schema(schema: &Schema) -> Result<Self, ConfigError> {
        let mut record_schema = RecordSchema::new();
        for field in &schema.fields {
            if field.name.is_empty() {
                return Err(ConfigError::Invalid("attribute name must not be empty".into()));
            }
            if record_schema.contains(&field.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate attribute '{}'",
                    field.name
                )));
            }
            record_schema = if field.is_virtual() {
                record_schema.with_virtual(&field.name)
            } else {
                record_schema.with_column(&field.name, &field.field_type.name)
            };
        }
        Ok(record_schema)
    }

    /// Add (or replace) a column attribute.
    pub fn with_column(self, name: impl Into<String>, sql_type: &str) -> Self {
        let column_type = ColumnType::from_sql_type(sql_type);
        self.upsert(Attribute {
            name: name.into(),
            kind: AttributeKind::Column,
            column_type,
        })
    }

    /// Add (or replace) a virtual attribute.
    pub fn with_virtual(self, name: impl Into<String>) -> Self {
        self.upsert(Attribute {
            name: name.into(),
            kind: AttributeKind::Virtual,
            column_type: None,
        })
    }

    fn upsert(mut self, attribute: Attribute) -> Self {
        if let Some(&i) = self.index.get(&attribute.name) {
            self.attributes[i] = attribute;
        } else {
            self.index.insert(attribute.name.clone(), self.attributes.len());
            self.attributes.push(attribute);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.get(name).and_then(|a| a.column_type)
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
