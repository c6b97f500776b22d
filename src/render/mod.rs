//! Render-side coordination: the backend boundary and the preload pipeline.

pub mod backend;
pub mod preload;

pub use backend::{RenderBackend, RenderNotice, RenderSubscription};
pub use preload::{PreloadOutcome, build_render_request, preload_tile_images};
