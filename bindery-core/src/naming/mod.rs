//! Collision-safe naming of pages and chapters

mod index;
mod resolver;

pub use index::ContainerNameIndex;
pub use resolver::{NameCollisionResolver, FALLBACK_NAME};
