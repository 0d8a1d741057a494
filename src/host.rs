//! Seam between the occlusion pipeline and the host renderer.
//!
//! The host owns the shader programs, the temporary render-target
//! allocator, and the command stream; the pipeline only records logical
//! commands through the [`Recorder`] trait. Execution order of recorded
//! commands is the only ordering guarantee the pipeline relies on.

use thiserror::Error;

use crate::passes::{PassId, ShadingPath};
use crate::pipeline::AoUniforms;
use crate::target::TargetFactory;

/// Errors that can occur while recording the occlusion effect.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AoError {
    /// The host failed to allocate a temporary render target.
    #[error("failed to allocate scratch target {0:?}")]
    ScratchAllocation(ScratchId),
}

/// Depth data the effect requires from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    /// Depth buffer plus per-pixel normals.
    DepthNormals,
}

/// Identifier for a temporary render target, stable across a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchId(pub u32);

impl ScratchId {
    /// Raw occlusion mask written by the estimate pass.
    pub const MASK: ScratchId = ScratchId(0);
    /// Intermediate target for the separable blur.
    pub const BLUR: ScratchId = ScratchId(1);
}

/// Description of a temporary render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Texture format.
    pub format: wgpu::TextureFormat,
    /// Sampling filter.
    pub filter: wgpu::FilterMode,
}

impl TargetDesc {
    /// Descriptor for an occlusion target: 8-bit RGBA, linear color,
    /// bilinear filtering.
    pub fn occlusion(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: wgpu::TextureFormat::Rgba8Unorm,
            filter: wgpu::FilterMode::Linear,
        }
    }
}

/// Source of a full-screen pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// No explicit source; the program reads implicitly bound inputs
    /// (camera depth/normals or the global occlusion binding).
    None,
    /// A temporary render target.
    Scratch(ScratchId),
    /// The persistent occlusion result texture.
    Result,
}

/// Destination of a full-screen pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A temporary render target.
    Scratch(ScratchId),
    /// The persistent occlusion result texture.
    Result,
    /// The camera's frame buffer.
    FrameBuffer,
    /// The deferred ambient-lighting buffer.
    Ambient,
}

/// What happens to a destination's existing contents when a pass starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    /// Preserve existing contents (blend passes rely on this).
    Load,
    /// Clear before drawing.
    Clear,
    /// Contents are fully overwritten; no need to load or clear.
    DontCare,
}

/// Ordered command-recording interface implemented by the host.
pub trait Recorder {
    /// Open a named profiling region.
    fn begin_sample(&mut self, label: &'static str);

    /// Close a named profiling region.
    fn end_sample(&mut self, label: &'static str);

    /// Allocate a temporary render target for the rest of the frame
    /// recording. Fails if the host cannot provide one.
    fn acquire_scratch(&mut self, id: ScratchId, desc: &TargetDesc) -> Result<(), AoError>;

    /// Release a previously acquired temporary render target.
    fn release_scratch(&mut self, id: ScratchId);

    /// Upload the parameter block read by the occlusion programs.
    fn set_uniforms(&mut self, uniforms: &AoUniforms);

    /// Expose the occlusion result texture as a globally readable input
    /// for subsequent passes.
    fn bind_occlusion(&mut self);

    /// Record a full-screen pass. `dests` holds one entry for ordinary
    /// passes and several for multi-render-target writes.
    fn draw(&mut self, pass: PassId, source: Source, dests: &[Target], load: LoadAction);
}

/// Per-frame fog parameters from the host renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FogState {
    /// Whether global fog is enabled.
    pub enabled: bool,
    /// Fog density.
    pub density: f32,
    /// Fog start distance.
    pub start: f32,
    /// Fog end distance.
    pub end: f32,
}

/// Per-frame context handed to the effect's entry points.
pub struct FrameContext<'a, R: Recorder, D: TargetFactory = wgpu::Device> {
    /// Device used for persistent resource allocation.
    pub device: &'a D,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Active shading path.
    pub path: ShadingPath,
    /// Global fog parameters.
    pub fog: FogState,
    /// Whether the occlusion debug overlay is active.
    pub debug_overlay: bool,
    /// Command recorder for this frame.
    pub recorder: &'a mut R,
}

/// Scoped profiling region.
///
/// Emits the matching `end_sample` on every exit path, including early
/// returns from error propagation, so regions always stay balanced.
pub struct SampleScope<'a, R: Recorder> {
    recorder: &'a mut R,
    label: &'static str,
}

impl<'a, R: Recorder> SampleScope<'a, R> {
    /// Open a region on `recorder`.
    pub fn begin(recorder: &'a mut R, label: &'static str) -> Self {
        recorder.begin_sample(label);
        Self { recorder, label }
    }
}

impl<R: Recorder> Drop for SampleScope<'_, R> {
    fn drop(&mut self) {
        self.recorder.end_sample(self.label);
    }
}

// Scopes forward recording so they can wrap inner pipeline steps and
// nest within each other.
impl<R: Recorder> Recorder for SampleScope<'_, R> {
    fn begin_sample(&mut self, label: &'static str) {
        self.recorder.begin_sample(label);
    }

    fn end_sample(&mut self, label: &'static str) {
        self.recorder.end_sample(label);
    }

    fn acquire_scratch(&mut self, id: ScratchId, desc: &TargetDesc) -> Result<(), AoError> {
        self.recorder.acquire_scratch(id, desc)
    }

    fn release_scratch(&mut self, id: ScratchId) {
        self.recorder.release_scratch(id);
    }

    fn set_uniforms(&mut self, uniforms: &AoUniforms) {
        self.recorder.set_uniforms(uniforms);
    }

    fn bind_occlusion(&mut self) {
        self.recorder.bind_occlusion();
    }

    fn draw(&mut self, pass: PassId, source: Source, dests: &[Target], load: LoadAction) {
        self.recorder.draw(pass, source, dests, load);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MarkerLog {
        events: Vec<(&'static str, &'static str)>,
    }

    impl Recorder for MarkerLog {
        fn begin_sample(&mut self, label: &'static str) {
            self.events.push(("begin", label));
        }

        fn end_sample(&mut self, label: &'static str) {
            self.events.push(("end", label));
        }

        fn acquire_scratch(&mut self, id: ScratchId, _desc: &TargetDesc) -> Result<(), AoError> {
            Err(AoError::ScratchAllocation(id))
        }

        fn release_scratch(&mut self, _id: ScratchId) {}
        fn set_uniforms(&mut self, _uniforms: &AoUniforms) {}
        fn bind_occlusion(&mut self) {}
        fn draw(&mut self, _pass: PassId, _source: Source, _dests: &[Target], _load: LoadAction) {}
    }

    #[test]
    fn test_scope_balances_on_early_return() {
        fn failing(rec: &mut MarkerLog) -> Result<(), AoError> {
            let mut scope = SampleScope::begin(rec, "outer");
            scope.acquire_scratch(ScratchId::MASK, &TargetDesc::occlusion(4, 4))?;
            unreachable!();
        }

        let mut rec = MarkerLog::default();
        assert!(failing(&mut rec).is_err());
        assert_eq!(rec.events, vec![("begin", "outer"), ("end", "outer")]);
    }

    #[test]
    fn test_scopes_nest() {
        let mut rec = MarkerLog::default();
        {
            let mut outer = SampleScope::begin(&mut rec, "outer");
            let _inner = SampleScope::begin(&mut outer, "inner");
        }
        assert_eq!(
            rec.events,
            vec![
                ("begin", "outer"),
                ("begin", "inner"),
                ("end", "inner"),
                ("end", "outer"),
            ]
        );
    }
}
