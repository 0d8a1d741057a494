//! GPU pass set and pass selection.
//!
//! The shader programs themselves are owned by the host; this module only
//! names them and maps a logical operation plus shading path to the
//! concrete program to run.

/// Shading path of the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingPath {
    /// Per-object lighting in a single geometry pass.
    #[default]
    Forward,
    /// Lighting resolved from buffered geometry data in a later pass.
    Deferred,
}

/// Logical operation within the occlusion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Estimate per-pixel occlusion from depth/normals.
    Estimate,
    /// Horizontal half of the separable denoising blur.
    BlurHorizontal,
    /// Vertical half of the separable denoising blur.
    BlurVertical,
    /// Blend the occlusion result into the frame.
    Composite,
    /// Visualize the raw occlusion result.
    DebugOverlay,
}

/// The eight GPU programs the pipeline can run.
///
/// Estimate and horizontal blur come in forward/deferred pairs with the
/// deferred variant directly after its forward counterpart; the vertical
/// blur and debug overlay are shared between paths. The two composite
/// programs differ structurally (single-target blend vs multi-target
/// write) and are deliberately not adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PassId {
    /// Occlusion estimate, forward path.
    EstimateForward = 0,
    /// Occlusion estimate, deferred path.
    EstimateDeferred = 1,
    /// Horizontal blur, forward path.
    BlurHorizontalForward = 2,
    /// Horizontal blur, deferred path.
    BlurHorizontalDeferred = 3,
    /// Vertical blur, shared between paths.
    BlurVertical = 4,
    /// Single-target blend composite (forward path).
    CompositeForward = 5,
    /// Occlusion visualization overlay.
    DebugOverlay = 6,
    /// Multi-target composite (deferred path).
    CompositeDeferred = 7,
}

impl PassId {
    /// Numeric index of this pass in the program set.
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Select the concrete pass for a logical operation on a shading path.
#[inline]
pub const fn select_pass(op: LogicalOp, path: ShadingPath) -> PassId {
    match (op, path) {
        (LogicalOp::Estimate, ShadingPath::Forward) => PassId::EstimateForward,
        (LogicalOp::Estimate, ShadingPath::Deferred) => PassId::EstimateDeferred,
        (LogicalOp::BlurHorizontal, ShadingPath::Forward) => PassId::BlurHorizontalForward,
        (LogicalOp::BlurHorizontal, ShadingPath::Deferred) => PassId::BlurHorizontalDeferred,
        (LogicalOp::BlurVertical, _) => PassId::BlurVertical,
        (LogicalOp::Composite, ShadingPath::Forward) => PassId::CompositeForward,
        (LogicalOp::Composite, ShadingPath::Deferred) => PassId::CompositeDeferred,
        (LogicalOp::DebugOverlay, _) => PassId::DebugOverlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_passes_adjacent() {
        assert_eq!(
            select_pass(LogicalOp::Estimate, ShadingPath::Forward).index() + 1,
            select_pass(LogicalOp::Estimate, ShadingPath::Deferred).index()
        );
        assert_eq!(
            select_pass(LogicalOp::BlurHorizontal, ShadingPath::Forward).index() + 1,
            select_pass(LogicalOp::BlurHorizontal, ShadingPath::Deferred).index()
        );
    }

    #[test]
    fn test_shared_passes() {
        assert_eq!(
            select_pass(LogicalOp::BlurVertical, ShadingPath::Forward),
            select_pass(LogicalOp::BlurVertical, ShadingPath::Deferred)
        );
        assert_eq!(
            select_pass(LogicalOp::DebugOverlay, ShadingPath::Forward),
            select_pass(LogicalOp::DebugOverlay, ShadingPath::Deferred)
        );
    }

    #[test]
    fn test_composites_distinct_and_non_adjacent() {
        let forward = select_pass(LogicalOp::Composite, ShadingPath::Forward).index();
        let deferred = select_pass(LogicalOp::Composite, ShadingPath::Deferred).index();
        assert_ne!(forward, deferred);
        assert!(forward.abs_diff(deferred) > 1);
    }
}
