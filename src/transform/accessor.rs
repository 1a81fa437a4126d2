use std::fmt;

use log::trace;

use crate::transform::{AccessorFailure, RecordKind, Result, TransformError, Value};

/// A record exposing named accessors
///
/// Implement this for any type that should take part in method-kind
/// sequences. `args` is empty when the accessor descriptor carries none.
///
/// # Example
/// ```rust
/// use record_transform::transform::{AccessorFailure, Value, accessor::MethodRecord};
///
/// #[derive(Debug)]
/// struct Book {
///     title: String,
/// }
///
/// impl MethodRecord for Book {
///     fn call(&self, name: &str, _args: &[Value]) -> Result<Value, AccessorFailure> {
///         match name {
///             "title" => Ok(Value::from(self.title.as_str())),
///             other => Err(format!("no accessor `{}`", other).into()),
///         }
///     }
/// }
/// ```
pub trait MethodRecord: fmt::Debug + Send + Sync {
    fn call(&self, name: &str, args: &[Value]) -> std::result::Result<Value, AccessorFailure>;
}

/// Names the value to extract from each record: a key, or a method plus
/// positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    name: String,
    args: Vec<Value>,
}

impl Accessor {
    /// Bare name, valid for both record kinds
    pub fn new(name: impl Into<String>) -> Self {
        Accessor {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Method name plus arguments; only valid for method-kind records
    pub fn with_args(name: impl Into<String>, args: Vec<Value>) -> Self {
        Accessor {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl From<&str> for Accessor {
    fn from(name: &str) -> Self {
        Accessor::new(name)
    }
}

impl From<String> for Accessor {
    fn from(name: String) -> Self {
        Accessor::new(name)
    }
}

impl TryFrom<Value> for Accessor {
    type Error = TransformError;

    /// Accepts `"name"`, `["name"]` or `["name", [args...]]`
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Str(name) if !name.is_empty() => Ok(Accessor::new(name)),
            Value::List(items) => {
                let mut items = items.into_iter();
                let name = match items.next() {
                    Some(Value::Str(name)) if !name.is_empty() => name,
                    Some(other) => {
                        return Err(TransformError::MissingAccessorArgument {
                            found: other.kind_name().to_string(),
                        });
                    }
                    None => {
                        return Err(TransformError::MissingAccessorArgument {
                            found: "empty list".to_string(),
                        });
                    }
                };
                let accessor = match items.next() {
                    None => Accessor::new(name),
                    Some(Value::List(args)) => Accessor::with_args(name, args),
                    Some(other) => {
                        return Err(TransformError::InvalidArgumentListShape {
                            accessor: name,
                            found: other.kind_name().to_string(),
                        });
                    }
                };
                let extra = items.count();
                if extra > 0 {
                    return Err(TransformError::InvalidArgumentListShape {
                        accessor: accessor.name,
                        found: format!("{} trailing item(s)", extra),
                    });
                }
                Ok(accessor)
            }
            Value::Str(_) => Err(TransformError::MissingAccessorArgument {
                found: "empty name".to_string(),
            }),
            other => Err(TransformError::MissingAccessorArgument {
                found: other.kind_name().to_string(),
            }),
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({} args)", self.name, self.args.len())
        }
    }
}

/// How an accessor is applied to every record of one sequence
#[derive(Debug, Clone, Copy)]
pub enum AccessorMode<'a> {
    KeyLookup(&'a str),
    MethodCall(&'a str, &'a [Value]),
}

impl<'a> AccessorMode<'a> {
    /// Picks the mode for `kind`, rejecting arguments on key lookups
    pub fn select(op: &'static str, kind: RecordKind, accessor: &'a Accessor) -> Result<Self> {
        match kind {
            RecordKind::Mapping if !accessor.args.is_empty() => {
                Err(TransformError::ArgumentsNotSupportedForKeyAccess {
                    op,
                    accessor: accessor.name.clone(),
                    args: accessor.args.len(),
                })
            }
            RecordKind::Mapping => Ok(AccessorMode::KeyLookup(&accessor.name)),
            RecordKind::Method => Ok(AccessorMode::MethodCall(&accessor.name, &accessor.args)),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            AccessorMode::KeyLookup(_) => RecordKind::Mapping,
            AccessorMode::MethodCall(_, _) => RecordKind::Method,
        }
    }
}

/// Applies one accessor across a sequence whose kind was fixed by its first
/// element
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    op: &'static str,
    mode: AccessorMode<'a>,
}

impl<'a> Resolver<'a> {
    /// Inspects the first record and fixes the mode for the whole sequence
    ///
    /// Returns `Ok(None)` for an empty sequence.
    ///
    /// # Errors
    /// - [`TransformError::NotARecord`] if the first element is neither a map
    ///   nor an object
    /// - [`TransformError::ArgumentsNotSupportedForKeyAccess`] if the records
    ///   are maps and the accessor carries arguments
    pub fn for_sequence(
        op: &'static str,
        records: &[Value],
        accessor: &'a Accessor,
    ) -> Result<Option<Self>> {
        let Some(first) = records.first() else {
            return Ok(None);
        };
        let kind = RecordKind::of(first).ok_or(TransformError::NotARecord {
            op,
            index: 0,
            found: first.kind_name(),
        })?;
        let mode = AccessorMode::select(op, kind, accessor)?;
        trace!("{}: resolving `{}` as {:?}", op, accessor, mode);
        Ok(Some(Resolver { op, mode }))
    }

    pub fn mode(&self) -> AccessorMode<'a> {
        self.mode
    }

    /// Resolves the accessor against the record at `index`
    pub fn resolve(&self, index: usize, record: &Value) -> Result<Value> {
        match (self.mode, record) {
            (AccessorMode::KeyLookup(name), Value::Map(map)) => {
                Ok(map.get(name).cloned().unwrap_or_default())
            }
            (AccessorMode::MethodCall(name, args), Value::Object(object)) => object
                .call(name, args)
                .map_err(|source| TransformError::AccessorInvocation {
                    op: self.op,
                    accessor: name.to_string(),
                    index,
                    source,
                }),
            (mode, other) => Err(match RecordKind::of(other) {
                Some(found) => TransformError::SequenceKindMismatch {
                    op: self.op,
                    index,
                    expected: mode.kind(),
                    found,
                },
                None => TransformError::NotARecord {
                    op: self.op,
                    index,
                    found: other.kind_name(),
                },
            }),
        }
    }
}

/// Resolves `accessor` against a single record, using the record's own kind
pub fn resolve(record: &Value, accessor: &Accessor) -> Result<Value> {
    match Resolver::for_sequence("resolve", std::slice::from_ref(record), accessor)? {
        Some(resolver) => resolver.resolve(0, record),
        None => Ok(Value::Undef),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        start: i64,
    }

    impl MethodRecord for Counter {
        fn call(&self, name: &str, args: &[Value]) -> std::result::Result<Value, AccessorFailure> {
            match name {
                "start" => Ok(Value::Int(self.start)),
                "plus" => {
                    let step = args.first().and_then(Value::as_i64).unwrap_or(1);
                    Ok(Value::Int(self.start + step))
                }
                other => Err(format!("no accessor `{}`", other).into()),
            }
        }
    }

    #[test]
    fn test_key_lookup_missing_key_is_undef() {
        let record = Value::map([("title", "Dune")]);
        assert_eq!(
            resolve(&record, &Accessor::new("title")).unwrap(),
            Value::from("Dune")
        );
        assert_eq!(
            resolve(&record, &Accessor::new("author")).unwrap(),
            Value::Undef
        );
    }

    #[test]
    fn test_method_call_passes_arguments() {
        let record = Value::object(Counter { start: 10 });
        let accessor = Accessor::with_args("plus", vec![Value::Int(5)]);
        assert_eq!(resolve(&record, &accessor).unwrap(), Value::Int(15));
        assert_eq!(
            resolve(&record, &Accessor::new("plus")).unwrap(),
            Value::Int(11)
        );
    }

    #[test]
    fn test_arguments_rejected_for_key_lookup() {
        let record = Value::map([("title", "Dune")]);
        let accessor = Accessor::with_args("title", vec![Value::Int(1)]);
        let err = resolve(&record, &accessor).unwrap_err();
        assert!(matches!(
            err,
            TransformError::ArgumentsNotSupportedForKeyAccess { args: 1, .. }
        ));
    }

    #[test]
    fn test_accessor_failure_is_wrapped() {
        let record = Value::object(Counter { start: 1 });
        let err = resolve(&record, &Accessor::new("nope")).unwrap_err();
        match err {
            TransformError::AccessorInvocation {
                accessor, source, ..
            } => {
                assert_eq!(accessor, "nope");
                assert_eq!(source.to_string(), "no accessor `nope`");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_later_record_of_other_kind_is_rejected() {
        let records = vec![
            Value::map([("start", 1)]),
            Value::object(Counter { start: 2 }),
        ];
        let accessor = Accessor::new("start");
        let resolver = Resolver::for_sequence("test", &records, &accessor)
            .unwrap()
            .unwrap();
        assert_eq!(resolver.resolve(0, &records[0]).unwrap(), Value::Int(1));
        let err = resolver.resolve(1, &records[1]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::SequenceKindMismatch {
                index: 1,
                expected: RecordKind::Mapping,
                found: RecordKind::Method,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_sequence_has_no_resolver() {
        let accessor = Accessor::with_args("x", vec![Value::Int(1)]);
        assert!(
            Resolver::for_sequence("test", &[], &accessor)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_accessor_from_value() {
        assert_eq!(
            Accessor::try_from(Value::from("title")).unwrap(),
            Accessor::new("title")
        );
        assert_eq!(
            Accessor::try_from(Value::from(vec![
                Value::from("plus"),
                Value::from(vec![Value::Int(2)]),
            ]))
            .unwrap(),
            Accessor::with_args("plus", vec![Value::Int(2)])
        );
        assert!(matches!(
            Accessor::try_from(Value::from(vec![Value::from("plus"), Value::Int(2)])),
            Err(TransformError::InvalidArgumentListShape { .. })
        ));
        assert!(matches!(
            Accessor::try_from(Value::Undef),
            Err(TransformError::MissingAccessorArgument { .. })
        ));
        assert!(matches!(
            Accessor::try_from(Value::from("")),
            Err(TransformError::MissingAccessorArgument { .. })
        ));
    }

    #[test]
    fn test_accessor_rejects_trailing_items() {
        let descriptor = Value::from(vec![
            Value::from("plus"),
            Value::from(vec![Value::Int(2)]),
            Value::Int(3),
        ]);
        assert!(matches!(
            Accessor::try_from(descriptor),
            Err(TransformError::InvalidArgumentListShape { ref accessor, .. }) if accessor == "plus"
        ));
    }

    #[test]
    fn test_mode_follows_first_record() {
        let accessor = Accessor::new("value");
        let maps = vec![Value::map([("value", 1)])];
        let resolver = Resolver::for_sequence("test", &maps, &accessor)
            .unwrap()
            .unwrap();
        assert!(matches!(resolver.mode(), AccessorMode::KeyLookup("value")));
        assert_eq!(resolver.mode().kind(), RecordKind::Mapping);
    }
}
