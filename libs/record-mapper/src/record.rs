use std::collections::HashMap;
use std::fmt;

use record_api::{Attributes, MapperConfig, ProtoMessage, RecordConfig, RecordSchema};

use crate::error::{AttributeTransformerError, MapperError, TransformerRejection};
use crate::transformer::{
    AttributeTransformer, Method, Resolved, Transformer, TransformerOptions, TransformerRegistry,
};

/// Mapping definition of one record type.
///
/// Built once at type-definition time: attribute set, methods, transformers.
/// Read-only afterwards, so a `&'static RecordType` (e.g. in a `LazyLock`)
/// can be shared across threads.
pub struct RecordType {
    name: String,
    schema: RecordSchema,
    config: MapperConfig,
    methods: HashMap<String, Method>,
    pub(crate) transformers: TransformerRegistry,
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("config", &self.config)
            .field("methods", &methods)
            .field("transformers", &self.transformers)
            .finish()
    }
}

impl RecordType {
    pub fn new(name: impl Into<String>, schema: RecordSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            config: MapperConfig::default(),
            methods: HashMap::new(),
            transformers: TransformerRegistry::default(),
        }
    }

    /// Build from a parsed [`RecordConfig`] (schema + mapper settings).
    pub fn from_config(name: impl Into<String>, config: RecordConfig) -> Result<Self, MapperError> {
        let name = name.into();
        config
            .mapper
            .validate()
            .map_err(|e| MapperError::from(e).with_context(&name))?;
        let schema = RecordSchema::from_schema(&config.schema)
            .map_err(|e| MapperError::from(e).with_context(&name))?;
        Ok(Self::new(name, schema).with_config(config.mapper))
    }

    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    /// Define (or redefine) a named method that transformers may reference.
    ///
    /// Method references are resolved at registration, so define methods first.
    pub fn define_method(&mut self, name: impl Into<String>, method: Method) -> &mut Self {
        self.methods.insert(name.into(), method);
        self
    }

    /// Register a transformer for `attribute`, replacing any previous one.
    pub fn attribute_from_proto(
        &mut self,
        attribute: impl Into<String>,
        transformer: Transformer,
    ) -> Result<&mut Self, AttributeTransformerError> {
        self.attribute_from_proto_with(attribute, transformer, TransformerOptions::default())
    }

    /// Register a transformer with options. On error the registry is untouched.
    pub fn attribute_from_proto_with(
        &mut self,
        attribute: impl Into<String>,
        transformer: Transformer,
        options: TransformerOptions,
    ) -> Result<&mut Self, AttributeTransformerError> {
        let attribute = attribute.into();
        let resolved = self.resolve(&attribute, transformer)?;

        let replaced = self
            .transformers
            .insert(attribute.clone(), AttributeTransformer::new(resolved, options));
        tracing::debug!(record = %self.name, %attribute, replaced, "registered attribute transformer");
        Ok(self)
    }

    fn resolve(
        &self,
        attribute: &str,
        transformer: Transformer,
    ) -> Result<Resolved, AttributeTransformerError> {
        let reject = |reason| AttributeTransformerError {
            record_type: self.name.clone(),
            attribute: attribute.to_owned(),
            reason,
        };

        match transformer {
            Transformer::None => Err(reject(TransformerRejection::Missing)),
            Transformer::Method(name) => match self.methods.get(&name) {
                Some(method) => Ok(Resolved::Method {
                    method: method.clone(),
                    name,
                }),
                None => Err(reject(TransformerRejection::UnknownMethod(name))),
            },
            Transformer::Callable(f) => Ok(Resolved::Callable(f)),
        }
    }
}

/// A record type whose instances can be populated from protobuf messages.
///
/// ```ignore
/// static USER: LazyLock<RecordType> = LazyLock::new(build_user_type);
///
/// impl ProtoRecord for User {
///     fn record_type() -> &'static RecordType { &USER }
///     fn assign_attributes(&mut self, attributes: Attributes) -> Result<(), MapperError> { ... }
/// }
/// ```
pub trait ProtoRecord {
    fn record_type() -> &'static RecordType;

    /// Bulk assignment hook, owned by the storage layer.
    fn assign_attributes(&mut self, attributes: Attributes) -> Result<(), MapperError>;

    /// Instance-level shortcut for [`RecordType::attributes_from_proto`].
    fn attributes_from_proto(&self, message: &dyn ProtoMessage) -> Result<Attributes, MapperError> {
        Self::record_type().attributes_from_proto(message)
    }

    /// Map `message` and hand the result to [`ProtoRecord::assign_attributes`].
    fn assign_attributes_from_proto(&mut self, message: &dyn ProtoMessage) -> Result<(), MapperError> {
        let attributes = Self::record_type().attributes_from_proto(message)?;
        self.assign_attributes(attributes)
    }
}

#[cfg(test)]
mod tests {
    use record_api::{ColumnType, ConfigError, TimeZoneSetting, Value};

    use super::*;
    use crate::test_support::TestMessage;

    fn user_type() -> RecordType {
        let schema = RecordSchema::new()
            .with_column("first_name", "varchar")
            .with_column("account_id", "integer");
        RecordType::new("User", schema)
    }

    #[test]
    fn registers_callable() {
        let mut user = user_type();
        user.attribute_from_proto("account_id", Transformer::callable(|_| Ok(None)))
            .unwrap();

        let t = user.transformers().get("account_id").unwrap();
        assert_eq!(t.method_name(), None);
    }

    #[test]
    fn registers_method_reference() {
        let mut user = user_type();
        user.define_method("fetch_account_id", Method::nullary(|| Ok(Some(Value::Int64(1)))))
            .attribute_from_proto("account_id", Transformer::method("fetch_account_id"))
            .unwrap();

        let t = user.transformers().get("account_id").unwrap();
        assert_eq!(t.method_name(), Some("fetch_account_id"));
    }

    #[test]
    fn rejects_missing_transformer_and_leaves_registry() {
        let mut user = user_type();
        let err = user
            .attribute_from_proto("first_name", Transformer::None)
            .unwrap_err();

        assert_eq!(err.reason, TransformerRejection::Missing);
        assert_eq!(err.attribute, "first_name");
        assert_eq!(err.record_type, "User");
        assert!(user.transformers().is_empty());
    }

    #[test]
    fn rejects_unknown_method() {
        let mut user = user_type();
        let err = user
            .attribute_from_proto("first_name", Transformer::method("extract_first_name"))
            .unwrap_err();

        assert_eq!(
            err.reason,
            TransformerRejection::UnknownMethod("extract_first_name".into())
        );
        assert!(!user.transformers().contains("first_name"));
    }

    #[test]
    fn failed_registration_keeps_previous_transformer() {
        let mut user = user_type();
        user.attribute_from_proto("account_id", Transformer::callable(|_| Ok(Some(Value::Int64(1)))))
            .unwrap();
        assert!(user.attribute_from_proto("account_id", Transformer::None).is_err());

        let t = user.transformers().get("account_id").unwrap();
        let message = TestMessage::new("test.Empty");
        assert_eq!(t.call(&message).unwrap(), Some(Value::Int64(1)));
    }

    #[test]
    fn from_config_builds_schema() {
        let config = RecordConfig::from_toml_str(
            r#"
            [mapper]
            time_zone = "utc"

            [[schema.fields]]
            name = "born_on"
            field_type = { name = "date" }
            "#,
        )
        .unwrap();

        let user = RecordType::from_config("User", config).unwrap();
        assert_eq!(user.name(), "User");
        assert_eq!(
            user.schema().column_type("born_on"),
            Some(ColumnType::Date)
        );
        assert_eq!(user.config().time_zone, TimeZoneSetting::Utc);
    }

    #[test]
    fn from_config_reports_record_name() {
        let mut config = RecordConfig::default();
        config.mapper.time_zone = TimeZoneSetting::Fixed { offset_seconds: 100_000 };

        let err = RecordType::from_config("User", config).unwrap_err();
        assert!(matches!(
            err,
            MapperError::Config(ConfigError::Invalid(msg)) if msg.starts_with("User:")
        ));
    }
}
