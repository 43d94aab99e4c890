pub mod authorize;
pub mod event;
pub mod plan;
pub mod propagation;
pub mod tree;

pub use plan::Reconciler;
pub use propagation::Propagator;
