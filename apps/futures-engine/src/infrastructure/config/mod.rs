//! Application wiring.

mod container;

pub use container::{Container, ContainerError};
