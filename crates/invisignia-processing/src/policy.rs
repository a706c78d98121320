//! Size-tier policy: maps an asset's byte size to a compression target.
//!
//! Pure, deterministic, and total over non-negative sizes. `None` means the
//! asset is small enough to submit as-is and the compression engine must not
//! be invoked.

/// Assets at or below this size (in KiB) are never compressed.
pub const NO_COMPRESSION_THRESHOLD_KB: f64 = 800.0;

/// Flat budget for the fixed-cap policy, in KiB.
pub const FIXED_CAP_KB: f64 = 1200.0;

const MAX_WIDTH_PX: u32 = 1920;
const MAX_HEIGHT_PX: u32 = 1080;
const INITIAL_QUALITY: f32 = 0.90;
const TIERED_QUALITY_FLOOR: f32 = 0.85;
const FIXED_CAP_QUALITY_FLOOR: f32 = 0.75;

/// Byte-size budget and encoding constraints one compression pass must try
/// to satisfy. Computed once per submission; immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionTarget {
    pub target_bytes: usize,
    pub max_width_px: u32,
    pub max_height_px: u32,
    pub initial_quality: f32,
    pub quality_floor: f32,
}

/// Named size policies.
///
/// `Tiered` scales the budget with the original size; `FixedCap` applies a
/// flat budget for contexts with a hard transfer cap. Two distinct policies,
/// not one with a special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePolicy {
    #[default]
    Tiered,
    FixedCap,
}

impl SizePolicy {
    /// Select a compression target for an asset of `original_size_bytes`,
    /// or `None` when no compression is needed.
    pub fn select(self, original_size_bytes: usize) -> Option<CompressionTarget> {
        let kb = original_size_bytes as f64 / 1024.0;

        let (target_kb, quality_floor) = match self {
            SizePolicy::Tiered => {
                // Ordered, first-match tiers on the size in KiB.
                if kb <= NO_COMPRESSION_THRESHOLD_KB {
                    return None;
                }
                let target = if kb > 5120.0 {
                    kb * 0.40
                } else if kb > 2048.0 {
                    kb * 0.50
                } else {
                    kb - NO_COMPRESSION_THRESHOLD_KB
                };
                (target, TIERED_QUALITY_FLOOR)
            }
            SizePolicy::FixedCap => {
                if kb <= FIXED_CAP_KB {
                    return None;
                }
                (FIXED_CAP_KB, FIXED_CAP_QUALITY_FLOOR)
            }
        };

        Some(CompressionTarget {
            target_bytes: (target_kb * 1024.0) as usize,
            max_width_px: MAX_WIDTH_PX,
            max_height_px: MAX_HEIGHT_PX,
            initial_quality: INITIAL_QUALITY,
            quality_floor,
        })
    }
}
