//! Routed pages of the viewer.

mod instance;

pub use instance::InstancePage;
