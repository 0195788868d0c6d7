//! Shared parameter textures: slot pool, CPU-side store and the texture that mirrors it.

pub mod layout;
pub mod slots;
pub mod store;
pub mod target;
pub mod texture;

pub use layout::{DEFAULT_PROPERTY_NAME, PtexConfig, PtexLayout};
pub use slots::SlotAllocator;
pub use store::{ParameterStore, WriteOutcome};
pub use target::ParameterTarget;
pub use texture::{ParameterTexture, PtexStats, Registration};
