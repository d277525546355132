use std::f64::consts::TAU;

use crate::records::Record;
use crate::richness::RichnessRange;
use crate::util::{seed_for, seeded_unit};

pub const FEATURED_COLOR: [f32; 3] = [1.0, 0.84, 0.0];
pub const DEFAULT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// One positioned point of the constellation, indexed positionally to match
/// the subset's iteration order. A full pass supersedes the previous one
/// wholesale; points are never patched individually.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutPoint {
    pub record_index: usize,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub color: [f32; 3],
}

/// Tunable layout knobs. The defaults reproduce the production visual
/// density at ~1,400 records; none of the exact values is load-bearing
/// beyond the monotonicity contract of [`spread_radius`].
#[derive(Clone, Copy, Debug)]
pub struct LayoutParams {
    /// Spread floor when the filtered subset is small ("zoom in" effect).
    pub min_radius: f32,
    /// Spread when the whole collection is visible.
    pub max_radius: f32,
    /// Collection size the radius ceiling was tuned for; bigger subsets grow
    /// the radius with sqrt(len) past this point.
    pub reference_count: usize,
    /// Minimum distance between any two accepted points, best effort.
    pub min_separation: f32,
    /// Placement retries before accepting an overlapping candidate.
    pub max_attempts: u32,
    /// Vertical offset of the disk centre.
    pub center_offset_y: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            min_radius: 100.0,
            max_radius: 300.0,
            reference_count: 1_400,
            min_separation: 4.0,
            max_attempts: 50,
            center_offset_y: 10.0,
        }
    }
}

/// Spread radius for a subset of the given size. Non-decreasing in
/// `subset_len` for a fixed `full_len`: narrowing a filter never pushes
/// points further out.
pub fn spread_radius(subset_len: usize, full_len: usize, params: &LayoutParams) -> f32 {
    if subset_len == 0 {
        return params.min_radius;
    }

    let full = full_len.max(subset_len).max(1) as f32;
    let ratio = subset_len as f32 / full;
    let linear = params.min_radius + (params.max_radius - params.min_radius) * ratio;

    // Past the reference design size, density would grow unbounded under the
    // fixed ceiling; let the radius follow sqrt(len) instead.
    let reference = params.reference_count.max(1) as f32;
    let sqrt_growth = params.max_radius * (subset_len as f32 / reference).sqrt();

    linear.max(sqrt_growth).max(params.min_radius)
}

/// Deterministically positions, scales, and colors every record of `subset`.
/// `full` is the unfiltered collection, used only to normalize richness so
/// relative sizes stay stable as filters change.
///
/// Re-running on an identical subset reproduces bit-identical output: all
/// jitter comes from the seeded draw in [`crate::util`], never from a real
/// RNG. Placement keeps a minimum separation to previously placed points on
/// a best-effort basis; after `max_attempts` draws the last candidate is
/// accepted regardless of overlap, so every record always gets a position.
pub fn layout(subset: &[Record], full: &[Record], params: &LayoutParams) -> Vec<LayoutPoint> {
    if subset.is_empty() {
        return Vec::new();
    }

    let range = RichnessRange::from_collection(full);
    let radius = spread_radius(subset.len(), full.len(), params) as f64;

    let mut points = Vec::with_capacity(subset.len());
    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(subset.len());
    let mut overlap_fallbacks = 0usize;

    for (index, record) in subset.iter().enumerate() {
        let seed = seed_for(&record.id, index);
        let featured = record.is_featured();

        let base_richness_scale = 1.0 + range.normalized(record) * 5.0;
        let multiplier = 0.7 + seeded_unit(seed + 4.0) * 0.6;
        let base_scale = base_richness_scale * multiplier;
        let scale = if featured { base_scale * 2.0 } else { base_scale };

        let color = if featured { FEATURED_COLOR } else { DEFAULT_COLOR };

        let (x, y) = place(seed, radius, params, &placed, &mut overlap_fallbacks);
        placed.push((x, y));
        points.push(LayoutPoint {
            record_index: index,
            x: x as f32,
            y: y as f32,
            scale: scale as f32,
            color,
        });
    }

    tracing::debug!(
        subset = subset.len(),
        radius,
        overlap_fallbacks,
        "layout pass complete"
    );

    points
}

fn place(
    seed: f64,
    radius: f64,
    params: &LayoutParams,
    placed: &[(f64, f64)],
    overlap_fallbacks: &mut usize,
) -> (f64, f64) {
    let min_separation = params.min_separation as f64;
    let attempts = params.max_attempts.max(1);

    let mut candidate = (0.0, 0.0);
    for attempt in 0..attempts {
        // Each attempt advances the seed by a stride of two so the distance
        // and angle draws never reuse an earlier attempt's values.
        let stride = f64::from(attempt) * 2.0;
        // sqrt keeps density uniform across the disk instead of clustering
        // at the centre.
        let distance = seeded_unit(seed + 1.0 + stride).sqrt() * radius;
        let angle = seeded_unit(seed + 2.0 + stride) * TAU;

        candidate = (
            distance * angle.cos(),
            distance * angle.sin() + params.center_offset_y as f64,
        );

        let separated = placed.iter().all(|&(px, py)| {
            let dx = candidate.0 - px;
            let dy = candidate.1 - py;
            (dx * dx + dy * dy).sqrt() >= min_separation
        });
        if separated {
            return candidate;
        }
    }

    // Overlap beats dropping the record.
    *overlap_fallbacks += 1;
    candidate
}
