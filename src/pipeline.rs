//! The occlusion pipeline and its composition strategies.
//!
//! Per frame the pipeline estimates occlusion at a quality-scaled
//! resolution, denoises it with a separable two-pass blur into the
//! persistent result target, and blends the result into the lit frame.
//! Forward renderers get a single full-screen blend onto the frame
//! buffer; deferred renderers get a multi-render-target write into the
//! ambient-lighting buffer and the frame buffer.

use crate::host::{
    AoError, DepthMode, FogState, FrameContext, LoadAction, Recorder, SampleScope, ScratchId,
    Source, Target, TargetDesc,
};
use crate::passes::{select_pass, LogicalOp, ShadingPath};
use crate::quality::AoQuality;
use crate::settings::{AoSettings, MIN_RADIUS};
use crate::target::{ResultTarget, TargetFactory};

/// Parameter block read by the occlusion programs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AoUniforms {
    /// intensity, radius, downsample factor, sample count.
    pub params: [f32; 4],
    /// Occlusion tint (white minus occlusion color), w unused.
    pub tint: [f32; 4],
    /// Fog compensation: density, start, end, active flag (0/1).
    pub fog: [f32; 4],
}

/// Derive the per-frame parameter block from the settings and host state.
///
/// Fog compensation only applies on the forward path: forward fog is
/// baked per object during geometry rendering, so occlusion drawn
/// afterwards has to fade with it. Deferred fog runs after occlusion
/// composition and needs no compensation.
fn derive_uniforms(settings: &AoSettings, path: ShadingPath, fog: FogState) -> AoUniforms {
    let tint = settings.tint();
    let fog_active = path == ShadingPath::Forward && fog.enabled;
    AoUniforms {
        params: [
            settings.intensity,
            settings.effective_radius(),
            settings.quality.downsample(),
            settings.quality.sample_count() as f32,
        ],
        tint: [tint[0], tint[1], tint[2], 0.0],
        fog: if fog_active {
            [fog.density, fog.start, fog.end, 1.0]
        } else {
            [0.0; 4]
        },
    }
}

/// Screen-space ambient occlusion effect.
///
/// Owns the persistent result target; the host calls one of the entry
/// points each frame. Instances never share targets, so a host with
/// several cameras needs one effect per camera.
pub struct AmbientOcclusion<D: TargetFactory = wgpu::Device> {
    settings: AoSettings,
    target: ResultTarget<D>,
    enabled: bool,
}

impl<D: TargetFactory> AmbientOcclusion<D> {
    /// Create a new effect with default settings.
    pub fn new() -> Self {
        Self {
            settings: AoSettings::default(),
            target: ResultTarget::new(),
            enabled: true,
        }
    }

    /// Get settings.
    pub fn settings(&self) -> &AoSettings {
        &self.settings
    }

    /// Set settings.
    pub fn set_settings(&mut self, settings: AoSettings) {
        self.settings = settings;
    }

    /// Set quality preset.
    pub fn set_quality(&mut self, quality: AoQuality) {
        self.settings.quality = quality;
    }

    /// Set sampling radius.
    pub fn set_radius(&mut self, radius: f32) {
        self.settings.radius = radius.max(MIN_RADIUS);
    }

    /// Set occlusion intensity.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.settings.intensity = intensity.max(0.0);
    }

    /// Set occlusion color.
    pub fn set_color(&mut self, color: [f32; 3]) {
        self.settings.color = color;
    }

    /// Check if the effect is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Set whether the effect is enabled. A disabled effect records
    /// nothing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Depth data this effect needs the host to provide.
    pub fn required_depth_mode(&self) -> DepthMode {
        DepthMode::DepthNormals
    }

    /// The occlusion result target handle, if allocated.
    pub fn result(&self) -> Option<&D::Target> {
        self.target.handle()
    }

    /// Current size of the occlusion result.
    pub fn result_size(&self) -> (u32, u32) {
        self.target.size()
    }

    /// Release the persistent GPU resource. The effect stays usable; the
    /// next frame reallocates lazily.
    pub fn release(&mut self) {
        self.target.release();
    }

    /// Compute occlusion and composite it onto the frame in one call.
    ///
    /// Forward paths blend onto the frame buffer; deferred paths write
    /// the ambient-lighting buffer and the frame buffer simultaneously.
    pub fn render_and_composite<R: Recorder>(
        &mut self,
        ctx: &mut FrameContext<'_, R, D>,
    ) -> Result<(), AoError> {
        if !self.should_record(ctx) {
            return Ok(());
        }
        let FrameContext {
            device,
            width,
            height,
            path,
            fog,
            debug_overlay,
            recorder,
        } = ctx;

        let mut frame = SampleScope::begin(&mut **recorder, "Ambient Occlusion");
        {
            let mut render = SampleScope::begin(&mut frame, "Ambient Occlusion Render");
            self.record_occlusion(*device, *width, *height, *path, *fog, *debug_overlay, &mut render)?;
        }
        {
            let mut composite = SampleScope::begin(&mut frame, "Ambient Occlusion Composite");
            record_composite(&mut composite, *path);
        }
        Ok(())
    }

    /// Compute occlusion into the result target without compositing.
    ///
    /// Used when the occlusion has to be combined with an ambient
    /// lighting term later in the frame; pair with
    /// [`composite_ambient_only`](Self::composite_ambient_only).
    pub fn render_ambient_only<R: Recorder>(
        &mut self,
        ctx: &mut FrameContext<'_, R, D>,
    ) -> Result<(), AoError> {
        if !self.should_record(ctx) {
            return Ok(());
        }
        let FrameContext {
            device,
            width,
            height,
            path,
            fog,
            debug_overlay,
            recorder,
        } = ctx;

        let mut render = SampleScope::begin(&mut **recorder, "Ambient Occlusion Render");
        self.record_occlusion(*device, *width, *height, *path, *fog, *debug_overlay, &mut render)
    }

    /// Composite a previously computed occlusion result onto the frame
    /// buffer, preserving its existing contents.
    pub fn composite_ambient_only<R: Recorder>(
        &mut self,
        ctx: &mut FrameContext<'_, R, D>,
    ) -> Result<(), AoError> {
        if !self.should_record(ctx) {
            return Ok(());
        }
        let mut composite = SampleScope::begin(&mut *ctx.recorder, "Ambient Occlusion Composite");
        record_composite(&mut composite, ShadingPath::Forward);
        Ok(())
    }

    fn should_record<R: Recorder>(&self, ctx: &FrameContext<'_, R, D>) -> bool {
        if !self.enabled {
            return false;
        }
        if ctx.width == 0 || ctx.height == 0 {
            log::debug!("skipping ambient occlusion for zero-sized frame");
            return false;
        }
        true
    }

    /// Record the estimate and blur passes into the result target.
    ///
    /// Scratch targets are strictly scoped to this call: "mask" dies
    /// right after the horizontal blur reads it, "blur" right after the
    /// vertical blur, on failure paths included.
    fn record_occlusion<R: Recorder>(
        &mut self,
        device: &D,
        width: u32,
        height: u32,
        path: ShadingPath,
        fog: FogState,
        debug_overlay: bool,
        rec: &mut R,
    ) -> Result<(), AoError> {
        self.target.ensure(device, width, height, self.settings.quality);

        rec.set_uniforms(&derive_uniforms(&self.settings, path, fog));

        let (scaled_width, scaled_height) = self.settings.quality.scaled_size(width, height);
        let desc = TargetDesc::occlusion(scaled_width, scaled_height);

        rec.acquire_scratch(ScratchId::MASK, &desc)?;
        rec.draw(
            select_pass(LogicalOp::Estimate, path),
            Source::None,
            &[Target::Scratch(ScratchId::MASK)],
            LoadAction::DontCare,
        );

        if let Err(err) = rec.acquire_scratch(ScratchId::BLUR, &desc) {
            rec.release_scratch(ScratchId::MASK);
            return Err(err);
        }
        rec.draw(
            select_pass(LogicalOp::BlurHorizontal, path),
            Source::Scratch(ScratchId::MASK),
            &[Target::Scratch(ScratchId::BLUR)],
            LoadAction::DontCare,
        );
        rec.release_scratch(ScratchId::MASK);

        rec.draw(
            select_pass(LogicalOp::BlurVertical, path),
            Source::Scratch(ScratchId::BLUR),
            &[Target::Result],
            LoadAction::DontCare,
        );
        rec.release_scratch(ScratchId::BLUR);

        if debug_overlay {
            rec.draw(
                select_pass(LogicalOp::DebugOverlay, path),
                Source::Result,
                &[Target::FrameBuffer],
                LoadAction::Load,
            );
        }

        Ok(())
    }
}

impl<D: TargetFactory> Default for AmbientOcclusion<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientOcclusion {
    /// View of the occlusion result texture, for the host to bind as the
    /// global occlusion input when executing recorded commands.
    pub fn result_view(&self) -> Option<&wgpu::TextureView> {
        self.target.handle().map(|t| &t.view)
    }
}

/// Record the composition pass for a shading path. Both variants read
/// the result texture through the global occlusion binding and preserve
/// the destination's existing contents.
fn record_composite<R: Recorder>(rec: &mut R, path: ShadingPath) {
    rec.bind_occlusion();
    let dests: &[Target] = match path {
        ShadingPath::Forward => &[Target::FrameBuffer],
        ShadingPath::Deferred => &[Target::Ambient, Target::FrameBuffer],
    };
    rec.draw(
        select_pass(LogicalOp::Composite, path),
        Source::None,
        dests,
        LoadAction::Load,
    );
}
