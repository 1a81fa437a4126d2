pub mod value_helpers;
