use std::collections::BTreeMap;

use record_api::{Attributes, ColumnType, ProtoMessage, Value};

use crate::convert::{int64_to_date, int64_to_datetime, int64_to_time};
use crate::error::MapperError;
use crate::record::RecordType;

impl RecordType {
    /// Message fields eligible for mapping, by attribute name.
    ///
    /// - Present, non-repeated fields named like a record attribute: `Some(raw)`.
    /// - Every attribute with a registered transformer: `Some(raw)` when a
    ///   present, non-repeated field of that name exists, `None` otherwise.
    pub fn filter_attribute_fields(&self, message: &dyn ProtoMessage) -> BTreeMap<String, Option<Value>> {
        let mut fields = BTreeMap::new();

        for field in message.field_set() {
            if field.is_repeated() || !message.is_present(&field.name) {
                continue;
            }
            if !self.schema().contains(&field.name) && !self.transformers.contains(&field.name) {
                continue;
            }
            if let Some(raw) = message.field_value(&field.name) {
                fields.insert(field.name, Some(raw));
            }
        }

        for attribute in self.transformers.keys() {
            fields.entry(attribute.to_owned()).or_insert(None);
        }

        fields
    }

    /// Coerce a raw field value for `attribute` by its column hint.
    ///
    /// Integer epoch seconds become `Date`, `DateTime` or `Time` values.
    /// Everything else, including values outside the representable range,
    /// is returned unchanged.
    pub fn convert_field_to_attribute(&self, attribute: &str, raw: Value) -> Value {
        let Some(column_type) = self.schema().column_type(attribute) else {
            return raw;
        };
        let Some(seconds) = epoch_seconds(&raw) else {
            return raw;
        };

        let zone = self.config().time_zone;
        let converted = match column_type {
            ColumnType::Date => int64_to_date(seconds, zone).map(Value::Date),
            ColumnType::DateTime => int64_to_datetime(seconds, zone).map(Value::DateTime),
            ColumnType::Time | ColumnType::Timestamp => int64_to_time(seconds, zone).map(Value::Time),
        };

        converted.unwrap_or_else(|| {
            tracing::warn!(
                record = %self.name(),
                attribute,
                seconds,
                ?column_type,
                "epoch seconds out of range, keeping raw value"
            );
            raw
        })
    }

    /// Map `message` onto this record type's attributes.
    ///
    /// Transformers take precedence over coercion. A transformer returning
    /// `None` leaves its attribute out; one returning an error aborts the
    /// whole mapping, even when `nullify_on` would clear its result.
    /// Attributes named in the message's `nullify` list are set to `Null`.
    pub fn attributes_from_proto(&self, message: &dyn ProtoMessage) -> Result<Attributes, MapperError> {
        let nullify = message.nullify_list();
        let mut attributes = Attributes::new();

        for (name, raw) in self.filter_attribute_fields(message) {
            if let Some(transformer) = self.transformers.get(&name) {
                let value = transformer
                    .call(message)
                    .map_err(|source| MapperError::Transform {
                        attribute: name.clone(),
                        source,
                    })?;
                if transformer.nullifies(&nullify) {
                    tracing::debug!(record = %self.name(), attribute = %name, "nullified by transformer option");
                    attributes.insert(name, Value::Null);
                    continue;
                }
                match value {
                    Some(value) => {
                        attributes.insert(name, value);
                    }
                    None => {
                        tracing::debug!(record = %self.name(), attribute = %name, "transformer returned no value, skipping");
                    }
                }
            } else if let Some(raw) = raw {
                let value = self.convert_field_to_attribute(&name, raw);
                attributes.insert(name, value);
            }
        }

        for name in nullify {
            if self.schema().contains(&name) {
                tracing::debug!(record = %self.name(), attribute = %name, "nullified by message");
                attributes.insert(name, Value::Null);
            }
        }

        Ok(attributes)
    }
}

fn epoch_seconds(raw: &Value) -> Option<i64> {
    match raw {
        Value::Int64(_) | Value::UInt64(_) => raw.as_i64(),
        _ => None,
    }
}
