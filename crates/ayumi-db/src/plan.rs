pub mod mutation;
pub mod query;

pub use mutation::{Mutation, NewPlan};
pub use query::Query;
