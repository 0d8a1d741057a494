//! Persistent occlusion result target.
//!
//! The result texture survives across frames and is lazily (re)allocated
//! to match the current frame size and quality level. The decision of
//! what `ensure` has to do is a pure function over the target's state so
//! the resize rules stay testable without a GPU.

use crate::quality::AoQuality;

/// Allocator for the persistent occlusion texture. Implemented for
/// [`wgpu::Device`]; tests substitute a counting fake.
pub trait TargetFactory {
    /// GPU texture handle produced by this factory. Dropping the handle
    /// releases the resource.
    type Target;

    /// Allocate an occlusion render target: 8-bit RGBA, linear color,
    /// bilinear filtering.
    fn create_target(&self, width: u32, height: u32) -> Self::Target;
}

/// Texture and view pair backing the occlusion result.
pub struct OcclusionTexture {
    /// The texture.
    pub texture: wgpu::Texture,
    /// Texture view.
    pub view: wgpu::TextureView,
}

impl TargetFactory for wgpu::Device {
    type Target = OcclusionTexture;

    fn create_target(&self, width: u32, height: u32) -> OcclusionTexture {
        let texture = self.create_texture(&wgpu::TextureDescriptor {
            label: Some("Occlusion Result"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        OcclusionTexture { texture, view }
    }
}

/// Allocation state of the result target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetState {
    /// No GPU resource exists (never allocated, or released).
    #[default]
    Uninitialized,
    /// A GPU resource exists for the given frame size and quality.
    Allocated {
        /// Frame width the resource was sized from.
        frame_width: u32,
        /// Frame height the resource was sized from.
        frame_height: u32,
        /// Quality level the resource was sized for.
        quality: AoQuality,
    },
}

/// What `ensure` has to do for a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureAction {
    /// Inputs unchanged; nothing to do.
    NoOp,
    /// Only the quality changed; update the stored scaled dimensions but
    /// keep the GPU resource.
    ResizeOnly,
    /// Drop any existing GPU resource and allocate a new one.
    Recreate,
}

/// Decide how to reconcile the current target state with a request.
///
/// `reset` forces recreation even for quality-only changes; it is set on
/// first use and after [`ResultTarget::release`].
pub fn decide_action(
    current: TargetState,
    frame_width: u32,
    frame_height: u32,
    quality: AoQuality,
    reset: bool,
) -> EnsureAction {
    match current {
        TargetState::Uninitialized => EnsureAction::Recreate,
        TargetState::Allocated {
            frame_width: w,
            frame_height: h,
            quality: q,
        } => {
            if w != frame_width || h != frame_height || reset {
                EnsureAction::Recreate
            } else if q != quality {
                EnsureAction::ResizeOnly
            } else {
                EnsureAction::NoOp
            }
        }
    }
}

/// Persistent GPU target holding the blurred occlusion result.
pub struct ResultTarget<D: TargetFactory = wgpu::Device> {
    state: TargetState,
    reset: bool,
    width: u32,
    height: u32,
    handle: Option<D::Target>,
}

impl<D: TargetFactory> ResultTarget<D> {
    /// Create an unallocated target.
    pub fn new() -> Self {
        Self {
            state: TargetState::Uninitialized,
            reset: true,
            width: 0,
            height: 0,
            handle: None,
        }
    }

    /// Make sure the target matches the current frame size and quality,
    /// reallocating the GPU resource only when structurally necessary.
    /// Cheap to call every frame with unchanged inputs.
    pub fn ensure(&mut self, device: &D, frame_width: u32, frame_height: u32, quality: AoQuality) {
        let action = decide_action(self.state, frame_width, frame_height, quality, self.reset);

        // The final dimensions always track the requested quality, even
        // when the GPU resource is kept.
        let (width, height) = quality.scaled_size(frame_width, frame_height);
        self.width = width;
        self.height = height;

        if action == EnsureAction::Recreate {
            log::debug!("recreating occlusion result target at {}x{}", width, height);
            self.handle = None;
            self.handle = Some(device.create_target(width, height));
            self.reset = false;
        }

        self.state = TargetState::Allocated {
            frame_width,
            frame_height,
            quality,
        };
    }

    /// Release the GPU resource. Safe to call repeatedly or before any
    /// allocation; a later `ensure` reallocates lazily.
    pub fn release(&mut self) {
        self.handle = None;
        self.state = TargetState::Uninitialized;
        self.reset = true;
        self.width = 0;
        self.height = 0;
    }

    /// The allocated target handle, if any.
    pub fn handle(&self) -> Option<&D::Target> {
        self.handle.as_ref()
    }

    /// Current scaled dimensions.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current allocation state.
    pub fn state(&self) -> TargetState {
        self.state
    }
}

impl<D: TargetFactory> Default for ResultTarget<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const Q: AoQuality = AoQuality::High;

    /// Fake factory counting allocations.
    #[derive(Default)]
    struct CountingFactory {
        allocations: Rc<Cell<usize>>,
    }

    struct FakeTexture {
        width: u32,
        height: u32,
    }

    impl TargetFactory for CountingFactory {
        type Target = FakeTexture;

        fn create_target(&self, width: u32, height: u32) -> FakeTexture {
            self.allocations.set(self.allocations.get() + 1);
            FakeTexture { width, height }
        }
    }

    #[test]
    fn test_dimensions_follow_quality_table() {
        let factory = CountingFactory::default();
        let mut target = ResultTarget::<CountingFactory>::new();
        for q in AoQuality::ALL {
            // Fresh allocation per level; quality-only changes on a live
            // target keep the texture (covered separately below).
            target.release();
            target.ensure(&factory, 1920, 1080, q);
            assert_eq!(target.size(), q.scaled_size(1920, 1080));
            let texture = target.handle().unwrap();
            assert_eq!((texture.width, texture.height), target.size());
        }
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let factory = CountingFactory::default();
        let mut target = ResultTarget::<CountingFactory>::new();
        target.ensure(&factory, 1920, 1080, Q);
        assert_eq!(factory.allocations.get(), 1);
        target.ensure(&factory, 1920, 1080, Q);
        target.ensure(&factory, 1920, 1080, Q);
        assert_eq!(factory.allocations.get(), 1);
    }

    #[test]
    fn test_frame_resize_recreates_once() {
        let factory = CountingFactory::default();
        let mut target = ResultTarget::<CountingFactory>::new();
        target.ensure(&factory, 1920, 1080, Q);
        target.ensure(&factory, 1280, 720, Q);
        assert_eq!(factory.allocations.get(), 2);
        assert_eq!(target.size(), (1280, 720));
        target.ensure(&factory, 1280, 720, Q);
        assert_eq!(factory.allocations.get(), 2);
    }

    #[test]
    fn test_quality_change_resizes_without_recreate() {
        let factory = CountingFactory::default();
        let mut target = ResultTarget::<CountingFactory>::new();
        target.ensure(&factory, 1920, 1080, Q);
        target.ensure(&factory, 1920, 1080, AoQuality::Lowest);
        // Stored dimensions track the new quality, the texture is kept
        // at its original size.
        assert_eq!(target.size(), (960, 540));
        assert_eq!(factory.allocations.get(), 1);
        let texture = target.handle().unwrap();
        assert_eq!((texture.width, texture.height), (1920, 1080));
    }

    #[test]
    fn test_release_then_ensure_reallocates() {
        let factory = CountingFactory::default();
        let mut target = ResultTarget::<CountingFactory>::new();
        target.release();
        assert!(target.handle().is_none());
        target.ensure(&factory, 1920, 1080, Q);
        target.release();
        target.release();
        assert_eq!(target.state(), TargetState::Uninitialized);
        target.ensure(&factory, 1920, 1080, Q);
        assert_eq!(factory.allocations.get(), 2);
        assert!(target.handle().is_some());
    }

    #[test]
    fn test_decide_action_table() {
        let state = TargetState::Allocated {
            frame_width: 1920,
            frame_height: 1080,
            quality: Q,
        };
        assert_eq!(
            decide_action(TargetState::Uninitialized, 1920, 1080, Q, true),
            EnsureAction::Recreate
        );
        assert_eq!(decide_action(state, 1920, 1080, Q, false), EnsureAction::NoOp);
        assert_eq!(
            decide_action(state, 1280, 720, Q, false),
            EnsureAction::Recreate
        );
        assert_eq!(
            decide_action(state, 1920, 1080, AoQuality::Ultra, false),
            EnsureAction::ResizeOnly
        );
        assert_eq!(
            decide_action(state, 1920, 1080, AoQuality::Ultra, true),
            EnsureAction::Recreate
        );
    }
}
