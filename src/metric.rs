//! Distance metrics between agent positions
//!
//! The simulation domain is a cube of side `L` that wraps on every axis,
//! so two agents near opposite faces are close. [`PeriodicMetric`] takes
//! the shorter way around on each axis before combining them:
//!
//! ```text
//! d_axis = |(a mod L) - (b mod L)|  (reduced modulo L)
//! wrapped = min(d_axis, L - d_axis)        in [0, L/2]
//! distance = sqrt(wx² + wy² + wz²)          <= L/2 · sqrt(3)
//! ```

use crate::trajectory::Position;
use crate::{Error, Result};

/// Distance between two positions
///
/// Implementations must be symmetric and non-negative, and return 0 for
/// identical positions.
pub trait DistanceMetric: Send + Sync {
    /// Distance from `a` to `b`
    fn distance(&self, a: &Position, b: &Position) -> f64;
}

/// Plain Euclidean distance, for runs without wraparound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EuclideanMetric;

impl DistanceMetric for EuclideanMetric {
    #[inline]
    fn distance(&self, a: &Position, b: &Position) -> f64 {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let dz = a.z - b.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Euclidean distance on a cubic domain with periodic boundaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicMetric {
    period: f64,
}

impl PeriodicMetric {
    /// Create a metric for a domain of side `period`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `period` is positive and finite
    pub fn new(period: f64) -> Result<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(Error::Config(format!(
                "period must be a positive finite number, got {period}"
            )));
        }
        Ok(Self { period })
    }

    /// Domain period L
    #[must_use]
    pub const fn period(&self) -> f64 {
        self.period
    }

    /// Largest distance the metric can return, `L/2 · sqrt(3)`
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.period / 2.0 * 3.0_f64.sqrt()
    }

    /// Shortest separation along one axis for a raw difference, in `[0, L/2]`
    #[inline]
    #[must_use]
    pub fn wrap(&self, delta: f64) -> f64 {
        let d = delta.abs() % self.period;
        d.min(self.period - d)
    }

    /// Shortest separation between two coordinates on one axis
    ///
    /// Both coordinates are reduced into `[0, L)` first, so the
    /// difference stays finite for any finite input.
    #[inline]
    #[must_use]
    pub fn separation(&self, a: f64, b: f64) -> f64 {
        self.wrap(a.rem_euclid(self.period) - b.rem_euclid(self.period))
    }
}

impl Default for PeriodicMetric {
    fn default() -> Self {
        Self {
            period: crate::config::DEFAULT_PERIOD,
        }
    }
}

impl DistanceMetric for PeriodicMetric {
    #[inline]
    fn distance(&self, a: &Position, b: &Position) -> f64 {
        let dx = self.separation(a.x, b.x);
        let dy = self.separation(a.y, b.y);
        let dz = self.separation(a.z, b.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
