//! Quality presets for the ambient occlusion pipeline.

/// Ambient occlusion quality preset.
///
/// Each level trades sample count against the resolution the occlusion
/// is computed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum AoQuality {
    /// Lowest quality - 3 samples at half resolution.
    Lowest = 0,
    /// Low quality - 5 samples at half resolution.
    Low = 1,
    /// Medium quality - 6 samples at three-quarter resolution.
    #[default]
    Medium = 2,
    /// High quality - 5 samples at full resolution.
    High = 3,
    /// Ultra quality - 12 samples at full resolution.
    Ultra = 4,
}

impl AoQuality {
    /// All quality levels, in ascending order.
    pub const ALL: [AoQuality; 5] = [
        AoQuality::Lowest,
        AoQuality::Low,
        AoQuality::Medium,
        AoQuality::High,
        AoQuality::Ultra,
    ];

    /// Get the number of occlusion samples for this quality level.
    #[inline]
    pub const fn sample_count(self) -> u32 {
        match self {
            AoQuality::Lowest => 3,
            AoQuality::Low => 5,
            AoQuality::Medium => 6,
            AoQuality::High => 5,
            AoQuality::Ultra => 12,
        }
    }

    /// Get the fraction of the frame resolution the occlusion is computed at.
    #[inline]
    pub const fn downsample(self) -> f32 {
        match self {
            AoQuality::Lowest => 0.5,
            AoQuality::Low => 0.5,
            AoQuality::Medium => 0.75,
            AoQuality::High => 1.0,
            AoQuality::Ultra => 1.0,
        }
    }

    /// Compute the occlusion target size for a given frame size.
    #[inline]
    pub fn scaled_size(self, frame_width: u32, frame_height: u32) -> (u32, u32) {
        let factor = self.downsample();
        (
            (frame_width as f32 * factor) as u32,
            (frame_height as f32 * factor) as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_values() {
        for q in AoQuality::ALL {
            assert!(matches!(q.sample_count(), 3 | 5 | 6 | 12));
            assert!([0.5, 0.75, 1.0].contains(&q.downsample()));
        }
        assert_eq!(AoQuality::High.sample_count(), 5);
        assert_eq!(AoQuality::High.downsample(), 1.0);
        assert_eq!(AoQuality::Lowest.sample_count(), 3);
        assert_eq!(AoQuality::Lowest.downsample(), 0.5);
    }

    proptest! {
        #[test]
        fn prop_scaled_size_matches_floor(w in 0u32..8192, h in 0u32..8192) {
            for q in AoQuality::ALL {
                let (sw, sh) = q.scaled_size(w, h);
                prop_assert_eq!(sw, (w as f32 * q.downsample()) as u32);
                prop_assert_eq!(sh, (h as f32 * q.downsample()) as u32);
                prop_assert!(sw <= w && sh <= h);
            }
        }
    }

    #[test]
    fn test_scaled_size_floors() {
        assert_eq!(AoQuality::High.scaled_size(1920, 1080), (1920, 1080));
        assert_eq!(AoQuality::Lowest.scaled_size(1920, 1080), (960, 540));
        assert_eq!(AoQuality::Medium.scaled_size(1920, 1080), (1440, 810));
        // Odd sizes round down.
        assert_eq!(AoQuality::Lowest.scaled_size(1921, 1081), (960, 540));
        assert_eq!(AoQuality::Medium.scaled_size(1023, 1), (767, 0));
    }
}
