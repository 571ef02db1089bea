//! Numeric scales mapping aggregated traffic to visual attributes.
//!
//! The radius scale is square-root so marker *area*, not radius, tracks the
//! trip count. Its domain follows the maximum observed traffic and its range
//! widens under an active time filter, when sparser data benefits from more
//! visual spread.

/// Radius floor; keeps zero-traffic stations visible.
pub const MIN_RADIUS: f64 = 5.0;

/// Upper radius bound without a time filter.
pub const UNFILTERED_MAX_RADIUS: f64 = 25.0;

/// Upper radius bound with an active time filter.
pub const FILTERED_MAX_RADIUS: f64 = 50.0;

/// Square-root scale from traffic totals to marker radii.
#[derive(Debug, Clone)]
pub struct RadiusScale {
    domain_max: f64,
    range_max: f64,
}

impl RadiusScale {
    pub fn new() -> Self {
        RadiusScale {
            domain_max: 1.0,
            range_max: UNFILTERED_MAX_RADIUS,
        }
    }

    /// Sets the domain to `[0, max_total]`, clamped to at least 1 so the
    /// scale never degenerates to zero width.
    pub fn set_domain(&mut self, max_total: u32) {
        self.domain_max = f64::from(max_total.max(1));
    }

    /// Picks the output range: `[5, 25]` unfiltered, `[5, 50]` filtered.
    pub fn set_filtered(&mut self, filter_active: bool) {
        self.range_max = if filter_active {
            FILTERED_MAX_RADIUS
        } else {
            UNFILTERED_MAX_RADIUS
        };
    }

    /// Maps a traffic total to a radius, floored at [`MIN_RADIUS`].
    pub fn radius(&self, total: u32) -> f64 {
        let t = (f64::from(total) / self.domain_max).sqrt();
        let r = MIN_RADIUS + (self.range_max - MIN_RADIUS) * t;
        r.max(MIN_RADIUS)
    }
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantizes a flow ratio in `[0, 1]` onto the six-step palette
/// `{0.0, 0.2, 0.4, 0.6, 0.8, 1.0}` used as the marker's flow style value.
pub fn flow_step(ratio: f64) -> f64 {
    const STEPS: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
    let clamped = ratio.clamp(0.0, 1.0);
    let idx = ((clamped * STEPS.len() as f64) as usize).min(STEPS.len() - 1);
    STEPS[idx]
}
