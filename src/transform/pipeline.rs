use std::borrow::Cow;

use log::debug;

use crate::transform::{
    GroupMap, Result, Value,
    accessor::Accessor,
    collection_transformer::{filter_by, filter_values, flatten_one_level, map_by, unique_by},
    group_fold,
    predicate::Predicate,
};

/// One step of a pipeline
#[derive(Debug, Clone)]
pub enum Stage {
    FilterBy(Accessor, Predicate),
    FilterValues(Predicate),
    UniqueBy(Accessor),
    MapBy(Accessor),
    Flatten,
}

impl Stage {
    fn apply(&self, input: &[Value]) -> Result<Vec<Value>> {
        match self {
            Stage::FilterBy(accessor, predicate) => filter_by(input, accessor, predicate),
            Stage::FilterValues(predicate) => filter_values(input, predicate),
            Stage::UniqueBy(accessor) => unique_by(input, accessor),
            Stage::MapBy(accessor) => map_by(input, accessor),
            Stage::Flatten => flatten_one_level(input),
        }
    }
}

/// Chains element-wise operations over one sequence
///
/// Stages run in the order they were added, each as a full pass over the
/// previous stage's output. Nothing runs until a terminal method
/// ([`execute`](Pipeline::execute) or one of the `group_by*` methods).
///
/// # Example
/// ```rust
/// # use record_transform::transform::{Value, pipeline::Pipeline, predicate::Predicate};
/// let books = vec![
///     Value::map([("title", "Dune"), ("genre", "Sci-fi")]),
///     Value::map([("title", "Emma"), ("genre", "Romance")]),
///     Value::map([("title", "Dune"), ("genre", "Sci-fi")]),
/// ];
/// let titles = Pipeline::new(&books)
///     .filter_by("genre", Predicate::equals("Sci-fi"))
///     .unique_by("title")
///     .map_by("title")
///     .execute()
///     .unwrap();
/// assert_eq!(titles, vec![Value::from("Dune")]);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    records: &'a [Value],
    stages: Vec<Stage>,
    limit: Option<usize>,
}

impl<'a> Pipeline<'a> {
    pub fn new(records: &'a [Value]) -> Self {
        Self {
            records,
            stages: Vec::new(),
            limit: None,
        }
    }

    /// Add a filter on a resolved value
    pub fn filter_by(mut self, accessor: impl Into<Accessor>, predicate: Predicate) -> Self {
        self.stages.push(Stage::FilterBy(accessor.into(), predicate));
        self
    }

    /// Add several filters at once, applied in order
    pub fn filters(mut self, filters: Vec<(Accessor, Predicate)>) -> Self {
        for (accessor, predicate) in filters {
            self.stages.push(Stage::FilterBy(accessor, predicate));
        }
        self
    }

    /// Add a filter on the elements themselves
    pub fn filter_values(mut self, predicate: Predicate) -> Self {
        self.stages.push(Stage::FilterValues(predicate));
        self
    }

    pub fn unique_by(mut self, accessor: impl Into<Accessor>) -> Self {
        self.stages.push(Stage::UniqueBy(accessor.into()));
        self
    }

    /// Replace every element by its resolved value
    pub fn map_by(mut self, accessor: impl Into<Accessor>) -> Self {
        self.stages.push(Stage::MapBy(accessor.into()));
        self
    }

    pub fn flatten(mut self) -> Self {
        self.stages.push(Stage::Flatten);
        self
    }

    /// Limit number of results
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage and return the resulting sequence
    pub fn execute(self) -> Result<Vec<Value>> {
        let mut current: Cow<'a, [Value]> = Cow::Borrowed(self.records);
        for stage in &self.stages {
            current = Cow::Owned(stage.apply(&current)?);
        }

        let mut out = current.into_owned();
        if let Some(n) = self.limit {
            out.truncate(n);
        }

        debug!(
            "pipeline: {} stages, {} -> {} elements",
            self.stages.len(),
            self.records.len(),
            out.len()
        );
        Ok(out)
    }

    /// Run the stages, then group the result keeping the last record per key
    pub fn group_by(self, accessor: impl Into<Accessor>) -> Result<GroupMap<Value>> {
        let accessor = accessor.into();
        group_fold::group_by(&self.execute()?, &accessor)
    }

    /// Run the stages, then count the result per key
    pub fn group_by_count(self, accessor: impl Into<Accessor>) -> Result<GroupMap<usize>> {
        let accessor = accessor.into();
        group_fold::group_by_count(&self.execute()?, &accessor)
    }

    /// Run the stages, then collect the result per key
    pub fn group_by_array(self, accessor: impl Into<Accessor>) -> Result<GroupMap<Vec<Value>>> {
        let accessor = accessor.into();
        group_fold::group_by_array(&self.execute()?, &accessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Key, TransformError};

    fn books() -> Vec<Value> {
        vec![
            Value::map([("title", "Dune"), ("genre", "Sci-fi")]),
            Value::map([("title", "Foundation"), ("genre", "Sci-fi")]),
            Value::map([("title", "Dune"), ("genre", "Sci-fi")]),
            Value::map([("title", "The Hobbit"), ("genre", "Fantasy")]),
        ]
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let records = books();
        assert_eq!(Pipeline::new(&records).execute().unwrap(), records);
    }

    #[test]
    fn test_stages_run_in_order() {
        let records = books();
        let titles = Pipeline::new(&records)
            .unique_by("title")
            .filter_by("genre", Predicate::equals("Sci-fi"))
            .map_by("title")
            .execute()
            .unwrap();
        assert_eq!(titles, vec![Value::from("Dune"), Value::from("Foundation")]);
    }

    #[test]
    fn test_filters_adds_one_stage_each() {
        let records = books();
        let pipeline = Pipeline::new(&records).filters(vec![
            (Accessor::new("genre"), Predicate::equals("Sci-fi")),
            (Accessor::new("title"), Predicate::pattern("^F").unwrap()),
        ]);
        assert_eq!(pipeline.stages().len(), 2);
        assert!(matches!(pipeline.stages()[0], Stage::FilterBy(..)));
        let out = pipeline.execute().unwrap();
        assert_eq!(out, vec![records[1].clone()]);
    }

    #[test]
    fn test_limit_truncates_result() {
        let records = books();
        let out = Pipeline::new(&records).limit(2).execute().unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_group_terminal() {
        let records = books();
        let counts = Pipeline::new(&records)
            .unique_by("title")
            .group_by_count("genre")
            .unwrap();
        assert_eq!(counts[&Key::from("Sci-fi")], 2);
        assert_eq!(counts[&Key::from("Fantasy")], 1);
    }

    #[test]
    fn test_map_then_filter_values() {
        let records = books();
        let out = Pipeline::new(&records)
            .map_by("title")
            .filter_values(Predicate::pattern("^The ").unwrap())
            .execute()
            .unwrap();
        assert_eq!(out, vec![Value::from("The Hobbit")]);
    }

    #[test]
    fn test_accessor_after_map_fails() {
        let records = books();
        let err = Pipeline::new(&records)
            .map_by("title")
            .unique_by("title")
            .execute()
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::NotARecord {
                op: "unique_by",
                index: 0,
                ..
            }
        ));
    }
}
