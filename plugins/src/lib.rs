//! Concrete sinks and wiring for runtap-core.

pub mod factory;
pub mod score;
