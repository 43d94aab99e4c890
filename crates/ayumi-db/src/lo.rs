pub mod query;

pub use query::{ChildLo, Query};
