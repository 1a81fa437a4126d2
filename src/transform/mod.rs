use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod accessor;
pub mod collection_transformer;
pub mod group_fold;
pub mod pipeline;
pub mod predicate;

#[cfg(feature = "json")]
pub mod json;

use crate::helpers::value_helpers::to_text;
use accessor::MethodRecord;

/// Failure raised by a caller-supplied accessor method
pub type AccessorFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("missing accessor: expected a name or [name, args], got {found}")]
    MissingAccessorArgument { found: String },

    #[error("{op}: accessor `{accessor}` has {args} argument(s) but records are mappings")]
    ArgumentsNotSupportedForKeyAccess {
        op: &'static str,
        accessor: String,
        args: usize,
    },

    #[error("accessor `{accessor}`: arguments must be a list, got {found}")]
    InvalidArgumentListShape { accessor: String, found: String },

    #[error("unknown combiner: {found}")]
    InvalidCombinerShape { found: String },

    #[error("invalid predicate: {found}")]
    InvalidPredicateKind { found: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("{op}: accessor `{accessor}` failed on element {index}")]
    AccessorInvocation {
        op: &'static str,
        accessor: String,
        index: usize,
        #[source]
        source: AccessorFailure,
    },

    #[error("{op}: element {index} is not a list ({found})")]
    ElementNotASequence {
        op: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error("{op}: element {index} is a {found} record but the sequence holds {expected} records")]
    SequenceKindMismatch {
        op: &'static str,
        index: usize,
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("{op}: element {index} is not a record ({found})")]
    NotARecord {
        op: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error("{op}: value resolved for element {index} cannot be a key ({found})")]
    UnhashableKey {
        op: &'static str,
        index: usize,
        found: &'static str,
    },

    #[error("value cannot be represented as JSON ({found})")]
    NotSerializable { found: &'static str },
}

pub type Result<T> = std::result::Result<T, TransformError>;

/// Dynamic value flowing through every operation
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value (missing key, explicit undef)
    #[default]
    Undef,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// Mapping-kind record
    Map(IndexMap<String, Value>),
    /// Method-kind record
    Object(Arc<dyn MethodRecord>),
}

impl Value {
    /// Short type name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undef => "undef",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    /// Wraps a method-kind record
    pub fn object<R: MethodRecord + 'static>(record: R) -> Self {
        Value::Object(Arc::new(record))
    }

    /// Builds a mapping-kind record from `(key, value)` pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Key lookup on a mapping value; anything else yields `None`
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undef, Value::Undef) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // objects compare by identity
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        i64::try_from(v)
            .map(Value::Int)
            .unwrap_or(Value::Float(v as f64))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Undef)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

/// Shape of the records in a sequence, decided by its first element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// String-keyed maps, accessed by key lookup
    Mapping,
    /// Objects, accessed by named method calls
    Method,
}

impl RecordKind {
    /// Returns `None` when the value is not a record at all
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Map(_) => Some(RecordKind::Mapping),
            Value::Object(_) => Some(RecordKind::Method),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Mapping => write!(f, "mapping"),
            RecordKind::Method => write!(f, "method"),
        }
    }
}

/// Hashable form of a resolved value, used by grouping and uniqueness
///
/// A key is the text form of a scalar, so `42`, `42.0` and `"42"` share a
/// bucket, matching [`Predicate::equals`](predicate::Predicate::equals).
/// Undef, `""` and `false` all land in the empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Returns `None` for lists, maps and objects
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Undef => Some(Key::empty()),
            Value::List(_) | Value::Map(_) | Value::Object(_) => None,
            scalar => to_text(scalar).map(|text| Key(text.into_owned())),
        }
    }

    pub fn empty() -> Self {
        Key(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_number(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|n| !n.is_nan())
    }
}

// empty first, then numeric keys by value, then the rest by text
impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |k: &Key| match (k.is_empty(), k.as_number()) {
            (true, _) => 0,
            (false, Some(_)) => 1,
            (false, None) => 2,
        };
        rank(self).cmp(&rank(other)).then_with(|| {
            match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            }
            .then_with(|| self.0.cmp(&other.0))
        })
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key(v.to_owned())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key(v)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key(v.to_string())
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        Value::Str(key.0)
    }
}

/// Result of a grouping fold; iterates in first-seen key order
pub type GroupMap<A> = IndexMap<Key, A>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_uses_text_form() {
        assert_eq!(Key::from_value(&Value::Int(42)), Some(Key::from("42")));
        assert_eq!(Key::from_value(&Value::Float(42.0)), Some(Key::from("42")));
        assert_eq!(Key::from_value(&Value::from("42")), Some(Key::from(42)));
        assert_eq!(Key::from_value(&Value::Float(2.5)), Some(Key::from("2.5")));
        assert_eq!(Key::from_value(&Value::Bool(true)), Some(Key::from("1")));
    }

    #[test]
    fn test_absent_and_empty_share_a_key() {
        assert_eq!(Key::from_value(&Value::Undef), Some(Key::empty()));
        assert_eq!(Key::from_value(&Value::from("")), Some(Key::empty()));
        assert_eq!(Key::from_value(&Value::Bool(false)), Some(Key::empty()));
    }

    #[test]
    fn test_key_rejects_containers() {
        assert!(Key::from_value(&Value::List(vec![])).is_none());
        assert!(Key::from_value(&Value::map([("a", 1)])).is_none());
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            Key::from("b"),
            Key::from("10"),
            Key::empty(),
            Key::from("9"),
            Key::from("1.5"),
            Key::from("a"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                Key::empty(),
                Key::from("1.5"),
                Key::from("9"),
                Key::from("10"),
                Key::from("a"),
                Key::from("b"),
            ]
        );
    }

    #[test]
    fn test_value_accessors() {
        let record = Value::map([("title", Value::from("Dune")), ("tags", Value::from(vec!["a"]))]);
        assert_eq!(record.get("title").and_then(Value::as_str), Some("Dune"));
        assert_eq!(record.get("tags").and_then(Value::as_list).map(<[Value]>::len), Some(1));
        assert!(record.get("missing").is_none());
        assert!(Value::Undef.is_undef());
        assert!(!Value::from("").is_undef());
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Undef);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }
}
