//! End-to-end test support for the repaso scheduling engine.

pub mod fixtures;
