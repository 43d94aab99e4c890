pub mod enrolment;
pub mod group;
pub mod lo;
pub mod plan;
pub mod user;

pub use sea_orm;
