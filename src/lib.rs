//! # Umbra - Screen-Space Ambient Occlusion Pipeline
//!
//! Umbra computes a screen-space ambient occlusion approximation for
//! wgpu-based real-time renderers and composites it onto the lit frame.
//!
//! ## Features
//!
//! - **Quality presets**: five levels trading sample count against the
//!   resolution occlusion is computed at
//! - **Separable blur**: the raw estimate is denoised with a two-pass
//!   horizontal/vertical blur into a persistent result target
//! - **Two shading paths**: a single full-screen blend for forward
//!   renderers, a multi-render-target write for deferred renderers
//! - **Ambient-only mode**: occlusion can be computed early and
//!   composited later in the frame
//!
//! The host renderer owns the shader programs, the temporary
//! render-target allocator, and the command stream; the effect records
//! logical commands through the [`host::Recorder`] trait.
//!
//! ## Example
//!
//! ```ignore
//! use umbra::prelude::*;
//!
//! let mut effect = AmbientOcclusion::new();
//! effect.set_quality(AoQuality::High);
//!
//! // Each frame, with a host-provided recorder:
//! let mut ctx = FrameContext {
//!     device: &device,
//!     width: 1920,
//!     height: 1080,
//!     path: ShadingPath::Forward,
//!     fog: FogState::default(),
//!     debug_overlay: false,
//!     recorder: &mut recorder,
//! };
//! effect.render_and_composite(&mut ctx)?;
//! ```

#![warn(missing_docs)]

pub mod host;
pub mod passes;
pub mod pipeline;
pub mod quality;
pub mod settings;
pub mod target;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::host::*;
    pub use crate::passes::*;
    pub use crate::pipeline::*;
    pub use crate::quality::*;
    pub use crate::settings::*;
    pub use crate::target::*;
}

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
