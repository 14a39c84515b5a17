use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use record_api::{ProtoMessage, Value};

/// Error raised by a transformer body. Propagated to the resolution caller.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// `Ok(None)` means "no value": the attribute is left out of the result.
pub type TransformResult = Result<Option<Value>, TransformError>;

pub type MessageFn = Arc<dyn Fn(&dyn ProtoMessage) -> TransformResult + Send + Sync>;
pub type NullaryFn = Arc<dyn Fn() -> TransformResult + Send + Sync>;

/// A named method of a record type, invocable as a transformer.
///
/// Arity is part of the definition: nullary methods get nothing,
/// unary methods get the message being mapped.
#[derive(Clone)]
pub enum Method {
    Nullary(NullaryFn),
    Unary(MessageFn),
}

impl Method {
    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn() -> TransformResult + Send + Sync + 'static,
    {
        Method::Nullary(Arc::new(f))
    }

    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(&dyn ProtoMessage) -> TransformResult + Send + Sync + 'static,
    {
        Method::Unary(Arc::new(f))
    }

    pub fn arity(&self) -> usize {
        match self {
            Method::Nullary(_) => 0,
            Method::Unary(_) => 1,
        }
    }

    fn invoke(&self, message: &dyn ProtoMessage) -> TransformResult {
        match self {
            Method::Nullary(f) => f(),
            Method::Unary(f) => f(message),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method/{}", self.arity())
    }
}

/// Transformer as handed to registration. Validated once, then resolved.
#[derive(Clone)]
pub enum Transformer {
    /// Nothing to call. Always rejected.
    None,
    /// Reference to a method defined on the record type.
    Method(String),
    /// Function of the message.
    Callable(MessageFn),
}

impl Transformer {
    pub fn method(name: impl Into<String>) -> Self {
        Transformer::Method(name.into())
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&dyn ProtoMessage) -> TransformResult + Send + Sync + 'static,
    {
        Transformer::Callable(Arc::new(f))
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformer::None => f.write_str("None"),
            Transformer::Method(name) => f.debug_tuple("Method").field(name).finish(),
            Transformer::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformerOptions {
    /// Clear the attribute (set it to `Null`) when the message's `nullify`
    /// list names this field.
    pub nullify_on: Option<String>,
}

impl TransformerOptions {
    pub fn nullify_on(field: impl Into<String>) -> Self {
        Self {
            nullify_on: Some(field.into()),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Resolved {
    Method { name: String, method: Method },
    Callable(MessageFn),
}

/// A validated transformer, as stored in the registry.
#[derive(Clone)]
pub struct AttributeTransformer {
    resolved: Resolved,
    options: TransformerOptions,
}

impl AttributeTransformer {
    pub(crate) fn new(resolved: Resolved, options: TransformerOptions) -> Self {
        Self { resolved, options }
    }

    pub fn call(&self, message: &dyn ProtoMessage) -> TransformResult {
        match &self.resolved {
            Resolved::Method { method, .. } => method.invoke(message),
            Resolved::Callable(f) => f(message),
        }
    }

    /// `true` when `nullify_on` is set and listed in `nullify`.
    pub fn nullifies(&self, nullify: &[String]) -> bool {
        self.options
            .nullify_on
            .as_ref()
            .is_some_and(|field| nullify.iter().any(|n| n == field))
    }

    /// Method name, for method-reference transformers.
    pub fn method_name(&self) -> Option<&str> {
        match &self.resolved {
            Resolved::Method { name, .. } => Some(name),
            Resolved::Callable(_) => None,
        }
    }
}

impl fmt::Debug for AttributeTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("AttributeTransformer");
        match &self.resolved {
            Resolved::Method { name, method } => {
                s.field("method", name).field("arity", &method.arity())
            }
            Resolved::Callable(_) => s.field("callable", &".."),
        };
        s.field("options", &self.options).finish()
    }
}

/// Attribute name → transformer, one per record type.
#[derive(Debug, Clone, Default)]
pub struct TransformerRegistry {
    entries: HashMap<String, AttributeTransformer>,
}

impl TransformerRegistry {
    pub fn get(&self, attribute: &str) -> Option<&AttributeTransformer> {
        self.entries.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.contains_key(attribute)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite. Returns `true` when an entry was replaced.
    pub(crate) fn insert(&mut self, attribute: String, transformer: AttributeTransformer) -> bool {
        self.entries.insert(attribute, transformer).is_some()
    }
}
