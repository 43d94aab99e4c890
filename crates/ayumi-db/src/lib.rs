pub mod enrolment;
pub mod group;
pub mod lo;
pub mod plan;
pub mod user;
pub mod util;

pub use sea_orm;
