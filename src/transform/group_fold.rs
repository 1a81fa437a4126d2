use std::str::FromStr;

use log::debug;

use crate::transform::{
    GroupMap, Key, Result, TransformError, Value, accessor::Accessor, accessor::Resolver,
};

/// Built-in combiners, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combine {
    /// Last record per key
    Last,
    /// Number of records per key
    Count,
    /// All records per key, in input order
    Array,
}

impl FromStr for Combine {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "last" => Ok(Combine::Last),
            "count" => Ok(Combine::Count),
            "array" | "list" => Ok(Combine::Array),
            _ => Err(TransformError::InvalidCombinerShape {
                found: s.to_string(),
            }),
        }
    }
}

fn fold<A, F>(
    op: &'static str,
    records: &[Value],
    accessor: &Accessor,
    mut combine: F,
) -> Result<GroupMap<A>>
where
    F: FnMut(Option<A>, &Value, &Key) -> A,
{
    let Some(resolver) = Resolver::for_sequence(op, records, accessor)? else {
        return Ok(GroupMap::new());
    };

    // slots are only `None` while their combine call runs
    let mut slots: GroupMap<Option<A>> = GroupMap::new();
    for (i, record) in records.iter().enumerate() {
        let value = resolver.resolve(i, record)?;
        let key = Key::from_value(&value).ok_or(TransformError::UnhashableKey {
            op,
            index: i,
            found: value.kind_name(),
        })?;
        let slot = slots.entry(key.clone()).or_insert(None);
        let previous = slot.take();
        *slot = Some(combine(previous, record, &key));
    }

    debug!(
        "{} `{}`: {} records into {} groups",
        op,
        accessor,
        records.len(),
        slots.len()
    );
    Ok(slots
        .into_iter()
        .filter_map(|(key, slot)| slot.map(|acc| (key, acc)))
        .collect())
}

/// Folds the records into one accumulator per resolved key
///
/// `combine` receives the key's previous accumulator (`None` the first time
/// the key is seen), the record itself and the key.
///
/// # Example
/// ```rust
/// # use record_transform::transform::{Key, Value, accessor::Accessor, group_fold::group_fold};
/// let sales = vec![
///     Value::map([("region", Value::from("EU")), ("amount", Value::Int(10))]),
///     Value::map([("region", Value::from("US")), ("amount", Value::Int(5))]),
///     Value::map([("region", Value::from("EU")), ("amount", Value::Int(7))]),
/// ];
/// let totals = group_fold(&sales, &Accessor::new("region"), |sum: Option<i64>, record, _| {
///     let amount = record.get("amount").and_then(Value::as_i64).unwrap_or(0);
///     sum.unwrap_or(0) + amount
/// })
/// .unwrap();
/// assert_eq!(totals[&Key::from("EU")], 17);
/// ```
pub fn group_fold<A, F>(records: &[Value], accessor: &Accessor, combine: F) -> Result<GroupMap<A>>
where
    F: FnMut(Option<A>, &Value, &Key) -> A,
{
    fold("group_fold", records, accessor, combine)
}

/// Groups records by key; a later record overwrites an earlier one
pub fn group_by(records: &[Value], accessor: &Accessor) -> Result<GroupMap<Value>> {
    fold("group_by", records, accessor, |_, record, _| record.clone())
}

/// [`group_by`] with a caller-supplied combiner
pub fn group_by_with<A, F>(
    records: &[Value],
    accessor: &Accessor,
    combine: F,
) -> Result<GroupMap<A>>
where
    F: FnMut(Option<A>, &Value, &Key) -> A,
{
    fold("group_by_with", records, accessor, combine)
}

/// Counts the records sharing each key
pub fn group_by_count(records: &[Value], accessor: &Accessor) -> Result<GroupMap<usize>> {
    fold("group_by_count", records, accessor, |count: Option<usize>, _, _| {
        count.unwrap_or(0) + 1
    })
}

/// Collects the records sharing each key, keeping their input order
pub fn group_by_array(records: &[Value], accessor: &Accessor) -> Result<GroupMap<Vec<Value>>> {
    fold("group_by_array", records, accessor, |list, record, _| {
        let mut list: Vec<Value> = list.unwrap_or_default();
        list.push(record.clone());
        list
    })
}

/// Groups as [`group_by_array`], then emits the groups in ascending key order
pub fn group_by_sorted_array(records: &[Value], accessor: &Accessor) -> Result<Vec<Vec<Value>>> {
    let mut groups = fold("group_by_sorted_array", records, accessor, |list, record, _| {
        let mut list: Vec<Value> = list.unwrap_or_default();
        list.push(record.clone());
        list
    })?;
    groups.sort_keys();
    Ok(groups.into_values().collect())
}

/// Runs a named built-in combiner, returning dynamic values
pub fn group_by_named(
    records: &[Value],
    accessor: &Accessor,
    combine: Combine,
) -> Result<GroupMap<Value>> {
    match combine {
        Combine::Last => group_by(records, accessor),
        Combine::Count => Ok(into_values(group_by_count(records, accessor)?)),
        Combine::Array => Ok(into_values(group_by_array(records, accessor)?)),
    }
}

fn into_values<A: Into<Value>>(map: GroupMap<A>) -> GroupMap<Value> {
    map.into_iter().map(|(k, v)| (k, v.into())).collect()
}

/// Converts a group map into a mapping value keyed by each key's text
pub fn group_map_to_value<A: Into<Value>>(map: GroupMap<A>) -> Value {
    Value::Map(
        map.into_iter()
            .map(|(k, v)| (k.as_str().to_owned(), v.into()))
            .collect(),
    )
}
