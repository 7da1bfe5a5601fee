pub mod access;
pub mod policy;

pub use access::{GateDecision, evaluate};
pub use policy::PathPolicy;
