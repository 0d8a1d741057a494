//! Ambient occlusion settings.

use crate::quality::AoQuality;

/// Smallest usable sampling radius. Radii at or below zero would produce
/// degenerate sample kernels, so the effective radius is clamped here.
pub const MIN_RADIUS: f32 = 1e-4;

/// Ambient occlusion settings.
///
/// Owned by the host application and read by the pipeline each frame.
/// The pipeline never mutates these; values that need sanitizing (the
/// radius) are derived per use instead.
#[derive(Debug, Clone)]
pub struct AoSettings {
    /// Quality preset (affects sample count and occlusion resolution).
    pub quality: AoQuality,
    /// Intensity/strength of the occlusion (>= 0).
    pub intensity: f32,
    /// Sampling radius in world units.
    pub radius: f32,
    /// Occlusion color. Applied as a tint subtracted from white, so black
    /// gives plain darkening.
    pub color: [f32; 3],
}

impl Default for AoSettings {
    fn default() -> Self {
        Self {
            quality: AoQuality::default(),
            intensity: 1.0,
            radius: 0.3,
            color: [0.0, 0.0, 0.0],
        }
    }
}

impl AoSettings {
    /// Radius actually used for sampling: the configured radius clamped
    /// to [`MIN_RADIUS`].
    #[inline]
    pub fn effective_radius(&self) -> f32 {
        self.radius.max(MIN_RADIUS)
    }

    /// Tint vector handed to the composition programs: white minus the
    /// occlusion color.
    #[inline]
    pub fn tint(&self) -> [f32; 3] {
        [
            1.0 - self.color[0],
            1.0 - self.color[1],
            1.0 - self.color[2],
        ]
    }
}
