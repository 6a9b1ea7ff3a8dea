//! Shared application plumbing for the Life terminal front end.

use std::sync::{Arc, Mutex};

use life_core::LifeWorld;
use life_patterns::PatternCatalog;

pub mod input;
pub mod terminal;

pub type SharedWorld = Arc<Mutex<LifeWorld>>;
pub type SharedCatalog = Arc<PatternCatalog>;

pub mod renderer {
    use anyhow::Result;

    use crate::{SharedCatalog, SharedWorld};

    /// Shared context passed to renderer implementations.
    pub struct RendererContext {
        pub world: SharedWorld,
        pub catalog: SharedCatalog,
        /// Catalog index the world was seeded from.
        pub pattern_index: usize,
    }

    pub trait Renderer {
        /// Stable identifier describing the renderer implementation.
        fn name(&self) -> &'static str;

        /// Launch the renderer; blocks until the session completes.
        fn run(&self, ctx: RendererContext) -> Result<()>;
    }
}

pub use renderer::{Renderer, RendererContext};
