//! Arc-length reparameterization of a [`PathCurve`].
//!
//! A uniform parameter `u` means "fraction of the total length". The table
//! maps it to the natural parameter `t` that lands at that length, so items
//! spaced evenly in `u` are spaced evenly along the curve instead of
//! bunching where the curve parameter runs slowly.

use log::debug;

use crate::{
    error::{Result, StackError},
    path::{PathCurve, PathKey},
};

/// Number of chords used to approximate the curve length.
pub const DEFAULT_SAMPLES: usize = 256;

/// Cumulative chord lengths of one curve, sampled at uniform natural
/// parameter steps.
#[derive(Clone, Debug, Default)]
pub struct ArcLengthTable {
    /// `lengths[i]` is the length from `t = 0` to `t = i / samples`.
    lengths: Vec<f32>,
    /// Curve the table was built for, if any.
    key: Option<PathKey>,
}

impl ArcLengthTable {
    /// Builds a table for `curve` from `samples` chords.
    ///
    /// Fails if the curve evaluates to non-finite points or has no length.
    pub fn build(curve: &dyn PathCurve, samples: usize) -> Result<Self> {
        let mut table = Self::default();
        table.rebuild(curve, samples)?;
        Ok(table)
    }

    /// Makes the table valid for the curve named by `key`.
    ///
    /// The table is only rebuilt when `key` differs from the one it was last
    /// built for. A failed build leaves the table empty.
    pub fn initialize(&mut self, key: PathKey, curve: &dyn PathCurve) -> Result<()> {
        if self.key == Some(key) && self.is_ready() {
            return Ok(());
        }

        self.key = None;
        self.rebuild(curve, DEFAULT_SAMPLES)?;
        self.key = Some(key);
        debug!(
            "arc-length table for path {} rebuilt, length {:.3}",
            key.node,
            self.total_length()
        );
        Ok(())
    }

    fn rebuild(&mut self, curve: &dyn PathCurve, samples: usize) -> Result<()> {
        self.lengths.clear();
        if samples == 0 {
            return Err(StackError::DegeneratePath("no samples requested"));
        }
        self.lengths.try_reserve_exact(samples + 1)?;

        let mut prev = curve.point(0.0);
        let mut total = 0.0_f32;
        self.lengths.push(0.0);
        for i in 1..=samples {
            let p = curve.point(i as f32 / samples as f32);
            total += p.distance(prev);
            self.lengths.push(total);
            prev = p;
        }

        if !total.is_finite() {
            self.lengths.clear();
            return Err(StackError::DegeneratePath("curve evaluates to non-finite points"));
        }
        if total <= f32::EPSILON {
            self.lengths.clear();
            return Err(StackError::DegeneratePath("curve has zero length"));
        }
        Ok(())
    }

    /// Whether the table can answer queries.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.lengths.len() >= 2
    }

    /// Approximate length of the whole curve.
    pub fn total_length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Key of the curve the table currently describes.
    pub fn key(&self) -> Option<PathKey> {
        self.key
    }

    /// Converts a uniform (length fraction) parameter into the natural
    /// parameter at the same point. Inputs outside `[0, 1]` are clamped.
    ///
    /// An empty table returns `u` unchanged.
    pub fn uniform_to_natural(&self, u: f32) -> f32 {
        if !self.is_ready() {
            return u.clamp(0.0, 1.0);
        }

        let samples = self.lengths.len() - 1;
        let target = u.clamp(0.0, 1.0) * self.total_length();

        // First sample whose cumulative length reaches the target.
        let idx = self.lengths.partition_point(|&l| l < target);
        if idx == 0 {
            return 0.0;
        }
        if idx > samples {
            return 1.0;
        }

        let (l0, l1) = (self.lengths[idx - 1], self.lengths[idx]);
        let frac = if l1 > l0 { (target - l0) / (l1 - l0) } else { 0.0 };
        ((idx - 1) as f32 + frac) / samples as f32
    }
}
