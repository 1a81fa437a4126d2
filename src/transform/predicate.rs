use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::helpers::value_helpers::{is_truthy, loose_eq, to_text};
use crate::transform::{Result, TransformError, Value};

/// Callable over a resolved value
pub type ValueFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Callable over a `(key, value)` entry of a map
pub type EntryFn = Arc<dyn Fn(&str, &Value) -> bool + Send + Sync>;

/// Retain/reject test applied to a resolved value
///
/// The shape is fixed when the predicate is built, so filtering never
/// re-inspects the caller's argument per element.
#[derive(Clone, Default)]
pub enum Predicate {
    /// Keep truthy values
    #[default]
    Default,
    Callable(ValueFn),
    /// Entry callable, only usable where a key is available
    KeyValue(EntryFn),
    Equals(Value),
    Matches(Regex),
    /// Keep values naming one of these keys
    KeyIn(HashSet<String>),
}

impl Predicate {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Predicate::Callable(Arc::new(f))
    }

    pub fn from_entry_fn<F>(f: F) -> Self
    where
        F: Fn(&str, &Value) -> bool + Send + Sync + 'static,
    {
        Predicate::KeyValue(Arc::new(f))
    }

    pub fn equals(literal: impl Into<Value>) -> Self {
        Predicate::Equals(literal.into())
    }

    /// Compiles `pattern` as a regular expression
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Predicate::Matches(Regex::new(pattern)?))
    }

    pub fn key_in<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::KeyIn(keys.into_iter().map(Into::into).collect())
    }

    /// Classifies a dynamic argument: undef is the default test, scalars are
    /// literals, maps are key sets (their values are ignored)
    pub fn classify(value: Value) -> Result<Self> {
        match value {
            Value::Undef => Ok(Predicate::Default),
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
                Ok(Predicate::Equals(value))
            }
            Value::Map(map) => Ok(Predicate::KeyIn(map.into_keys().collect())),
            other => Err(TransformError::InvalidPredicateKind {
                found: other.kind_name().to_string(),
            }),
        }
    }

    /// Decides whether `value` is retained; `key` is the entry key when
    /// filtering a map
    pub fn matches(&self, value: &Value, key: Option<&str>) -> Result<bool> {
        let retained = match self {
            Predicate::Default => is_truthy(value),
            Predicate::Callable(f) => f(value),
            Predicate::KeyValue(f) => match key {
                Some(key) => f(key, value),
                None => {
                    return Err(TransformError::InvalidPredicateKind {
                        found: "entry callable used without a key".to_string(),
                    });
                }
            },
            Predicate::Equals(literal) => loose_eq(value, literal),
            Predicate::Matches(re) => to_text(value).is_some_and(|text| re.is_match(&text)),
            Predicate::KeyIn(keys) => to_text(value).is_some_and(|text| keys.contains(&*text)),
        };
        Ok(retained)
    }
}

impl From<Regex> for Predicate {
    fn from(re: Regex) -> Self {
        Predicate::Matches(re)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Default => write!(f, "Default"),
            Predicate::Callable(_) => write!(f, "Callable(..)"),
            Predicate::KeyValue(_) => write!(f, "KeyValue(..)"),
            Predicate::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Predicate::Matches(re) => f.debug_tuple("Matches").field(&re.as_str()).finish(),
            Predicate::KeyIn(keys) => f.debug_tuple("KeyIn").field(keys).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_truthiness() {
        let p = Predicate::default();
        assert!(p.matches(&Value::Int(3), None).unwrap());
        assert!(!p.matches(&Value::from(""), None).unwrap());
        assert!(!p.matches(&Value::Undef, None).unwrap());
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            Predicate::classify(Value::Undef).unwrap(),
            Predicate::Default
        ));
        assert!(matches!(
            Predicate::classify(Value::from("x")).unwrap(),
            Predicate::Equals(_)
        ));
        assert!(matches!(
            Predicate::classify(Value::map([("a", 1), ("b", 2)])).unwrap(),
            Predicate::KeyIn(keys) if keys.len() == 2
        ));
        assert!(matches!(
            Predicate::classify(Value::List(vec![])),
            Err(TransformError::InvalidPredicateKind { .. })
        ));
    }

    #[test]
    fn test_pattern_matches_text_form() {
        let p = Predicate::pattern(r"^Sci").unwrap();
        assert!(p.matches(&Value::from("Sci-fi"), None).unwrap());
        assert!(!p.matches(&Value::from("Fantasy"), None).unwrap());

        let digits = Predicate::pattern(r"^\d+$").unwrap();
        assert!(digits.matches(&Value::Int(1984), None).unwrap());
        assert!(!digits.matches(&Value::Undef, None).unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Predicate::pattern("("),
            Err(TransformError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_key_in_ignores_payload() {
        let p = Predicate::classify(Value::map([("Sci-fi", 0), ("Horror", 0)])).unwrap();
        assert!(p.matches(&Value::from("Sci-fi"), None).unwrap());
        assert!(!p.matches(&Value::from("Fantasy"), None).unwrap());
    }

    #[test]
    fn test_entry_callable_needs_key() {
        let p = Predicate::from_entry_fn(|k, _| k.starts_with('a'));
        assert!(p.matches(&Value::Int(1), Some("alpha")).unwrap());
        assert!(!p.matches(&Value::Int(1), Some("beta")).unwrap());
        assert!(matches!(
            p.matches(&Value::Int(1), None),
            Err(TransformError::InvalidPredicateKind { .. })
        ));
    }

    #[test]
    fn test_equals_is_numeric_for_numbers() {
        let p = Predicate::equals(2);
        assert!(p.matches(&Value::Float(2.0), None).unwrap());
        assert!(!p.matches(&Value::Int(3), None).unwrap());
    }
}
