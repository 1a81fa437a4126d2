//! Element-wise operations over record sequences
//!
//! Every function takes the sequence by reference and returns a newly
//! allocated result; records are cloned, never mutated. An empty input
//! always produces an empty output, whatever the accessor.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use crate::transform::{
    Key, Result, TransformError, Value, accessor::Accessor, accessor::Resolver,
    predicate::Predicate,
};

/// Resolves `accessor` against every record
///
/// # Returns
/// One value per record, in input order
///
/// # Example
/// ```rust
/// # use record_transform::transform::{Value, accessor::Accessor, collection_transformer::map_by};
/// let books = vec![
///     Value::map([("title", "Dune")]),
///     Value::map([("title", "Emma")]),
/// ];
/// let titles = map_by(&books, &Accessor::new("title")).unwrap();
/// assert_eq!(titles, vec![Value::from("Dune"), Value::from("Emma")]);
/// ```
pub fn map_by(records: &[Value], accessor: &Accessor) -> Result<Vec<Value>> {
    let Some(resolver) = Resolver::for_sequence("map_by", records, accessor)? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        out.push(resolver.resolve(i, record)?);
    }

    debug!("map_by `{}`: {} values", accessor, out.len());
    Ok(out)
}

/// Keeps the records whose resolved value satisfies `predicate`
///
/// Order is preserved. [`Predicate::Default`] keeps truthy values.
pub fn filter_by(
    records: &[Value],
    accessor: &Accessor,
    predicate: &Predicate,
) -> Result<Vec<Value>> {
    let Some(resolver) = Resolver::for_sequence("filter_by", records, accessor)? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let value = resolver.resolve(i, record)?;
        if predicate.matches(&value, None)? {
            out.push(record.clone());
        }
    }

    debug!(
        "filter_by `{}`: kept {} of {} records",
        accessor,
        out.len(),
        records.len()
    );
    Ok(out)
}

/// Filters plain values with no accessor in between
pub fn filter_values(values: &[Value], predicate: &Predicate) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    for value in values {
        if predicate.matches(value, None)? {
            out.push(value.clone());
        }
    }

    debug!("filter_values: kept {} of {} values", out.len(), values.len());
    Ok(out)
}

/// Keeps the entries of `map` whose value satisfies `predicate`
///
/// Entry callables ([`Predicate::KeyValue`]) receive each entry's key.
pub fn filter_hash(
    map: &IndexMap<String, Value>,
    predicate: &Predicate,
) -> Result<IndexMap<String, Value>> {
    let mut out = IndexMap::new();
    for (key, value) in map {
        if predicate.matches(value, Some(key))? {
            out.insert(key.clone(), value.clone());
        }
    }

    debug!("filter_hash: kept {} of {} entries", out.len(), map.len());
    Ok(out)
}

/// Keeps the first record for each distinct resolved value
///
/// Values compare as [`Key`]s: by text form, so `42` and `"42"` are the same
/// value, and absent values share the empty key with `""`.
/// Lists, maps and objects cannot be compared and raise
/// [`TransformError::UnhashableKey`].
pub fn unique_by(records: &[Value], accessor: &Accessor) -> Result<Vec<Value>> {
    let Some(resolver) = Resolver::for_sequence("unique_by", records, accessor)? else {
        return Ok(Vec::new());
    };

    let mut seen: HashSet<Key> = HashSet::with_capacity(records.len());
    let mut out = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let value = resolver.resolve(i, record)?;
        let key = Key::from_value(&value).ok_or(TransformError::UnhashableKey {
            op: "unique_by",
            index: i,
            found: value.kind_name(),
        })?;
        if seen.insert(key) {
            out.push(record.clone());
        }
    }

    debug!(
        "unique_by `{}`: {} distinct of {} records",
        accessor,
        out.len(),
        records.len()
    );
    Ok(out)
}

/// Concatenates a sequence of lists, one level deep
///
/// # Errors
/// [`TransformError::ElementNotASequence`] when an element is not a list
pub fn flatten_one_level(lists: &[Value]) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    for (i, element) in lists.iter().enumerate() {
        match element {
            Value::List(items) => out.extend(items.iter().cloned()),
            other => {
                return Err(TransformError::ElementNotASequence {
                    op: "flatten_one_level",
                    index: i,
                    found: other.kind_name(),
                });
            }
        }
    }

    debug!(
        "flatten_one_level: {} lists into {} values",
        lists.len(),
        out.len()
    );
    Ok(out)
}
