pub mod mutation;
pub mod query;

pub use mutation::{Mutation, NewEnrolment};
pub use query::Query;
