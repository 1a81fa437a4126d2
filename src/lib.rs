//! # record-transform
//!
//! `record-transform` provides declarative data-shaping operations over
//! homogeneous sequences of records, where every record is either a
//! string-keyed map or an object exposing named accessor methods.
//!
//! - Accessor resolution decided once per sequence (key lookup or method call)
//! - Predicate filtering: truthiness, callables, literals, regex, key sets
//! - Uniqueness by resolved value, first occurrence wins
//! - Grouping folds with caller-supplied combiners
//! - One-level flattening
//! - Fluent pipelines chaining the above
//!
//! # Features
//!
//! - **`json`** (default): conversions from and to `serde_json::Value`
//!
//! # Example
//!
//! ```rust
//! use record_transform::{Accessor, Key, Predicate, Value};
//! use record_transform::transform::{
//!     collection_transformer::filter_by, group_fold::group_by_count,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let books = vec![
//!         Value::map([("title", "Dune"), ("genre", "Sci-fi")]),
//!         Value::map([("title", "Neuromancer"), ("genre", "Sci-fi")]),
//!         Value::map([("title", "The Hobbit"), ("genre", "Fantasy")]),
//!     ];
//!
//!     // Filter records
//!     let sci_fi = filter_by(&books, &Accessor::new("genre"), &Predicate::equals("Sci-fi"))?;
//!     println!("Sci-fi books: {:?}", sci_fi);
//!
//!     // Count per genre
//!     let counts = group_by_count(&books, &Accessor::new("genre"))?;
//!     assert_eq!(counts[&Key::from("Sci-fi")], 2);
//!
//!     Ok(())
//! }
//! ```

mod helpers;
pub mod transform;

pub use transform::{
    GroupMap, Key, RecordKind, Result, TransformError, Value,
    accessor::{Accessor, MethodRecord},
    pipeline::Pipeline,
    predicate::Predicate,
};
