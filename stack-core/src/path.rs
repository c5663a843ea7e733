//! Curves that a stack can follow.
//!
//! Curves are evaluated in their own local space over a natural parameter
//! `t ∈ [0, 1]`. Natural parameter speed is generally not constant, which is
//! what [`crate::arc_length::ArcLengthTable`] corrects for.

use glam::{Affine3A, Vec3};

use crate::types::{NodeId, Revision};

/// A parametric curve over `t ∈ [0, 1]`.
pub trait PathCurve {
    /// Point at natural parameter `t`, in curve space.
    fn point(&self, t: f32) -> Vec3;

    /// Unit tangent at natural parameter `t`, in curve space.
    fn tangent(&self, t: f32) -> Vec3;
}

/// Piecewise-linear curve. Each segment gets an equal share of the
/// parameter range regardless of its length.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points: Vec<Vec3>,
}

impl Polyline {
    /// Returns `None` for fewer than two points.
    pub fn new(points: Vec<Vec3>) -> Option<Self> {
        (points.len() >= 2).then_some(Self { points })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Segment index and local parameter for `t`.
    fn locate(&self, t: f32) -> (usize, f32) {
        let segments = self.points.len() - 1;
        let s = t.clamp(0.0, 1.0) * segments as f32;
        let i = (s.floor() as usize).min(segments - 1);
        (i, s - i as f32)
    }
}

impl PathCurve for Polyline {
    fn point(&self, t: f32) -> Vec3 {
        let (i, f) = self.locate(t);
        self.points[i].lerp(self.points[i + 1], f)
    }

    fn tangent(&self, t: f32) -> Vec3 {
        let (i, _) = self.locate(t);
        (self.points[i + 1] - self.points[i]).normalize_or_zero()
    }
}

/// Cubic Bézier segment with control points `p0..p3`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// First derivative with respect to `t`.
    pub fn derivative(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let mt = 1.0 - t;
        3.0 * mt * mt * (self.p1 - self.p0)
            + 6.0 * mt * t * (self.p2 - self.p1)
            + 3.0 * t * t * (self.p3 - self.p2)
    }
}

impl PathCurve for CubicBezier {
    fn point(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let mt = 1.0 - t;
        self.p0 * (mt * mt * mt)
            + self.p1 * (3.0 * mt * mt * t)
            + self.p2 * (3.0 * mt * t * t)
            + self.p3 * (t * t * t)
    }

    fn tangent(&self, t: f32) -> Vec3 {
        // Coincident control points zero the derivative at the ends.
        self.derivative(t)
            .try_normalize()
            .unwrap_or_else(|| (self.p3 - self.p0).normalize_or_zero())
    }
}

/// Curve payload stored on a scene node.
#[derive(Clone, Debug, PartialEq)]
pub enum Spline {
    Linear(Polyline),
    Bezier(CubicBezier),
}

impl PathCurve for Spline {
    fn point(&self, t: f32) -> Vec3 {
        match self {
            Spline::Linear(p) => p.point(t),
            Spline::Bezier(b) => b.point(t),
        }
    }

    fn tangent(&self, t: f32) -> Vec3 {
        match self {
            Spline::Linear(p) => p.tangent(t),
            Spline::Bezier(b) => b.tangent(t),
        }
    }
}

/// Identity plus change stamp of a path object.
///
/// Two keys are equal only if they name the same node at the same revision,
/// which is exactly when a cached arc-length table is still valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathKey {
    pub node: NodeId,
    pub revision: Revision,
}

/// A borrowed view of a path object for one generation pass.
#[derive(Clone, Copy)]
pub struct PathInput<'a> {
    pub key: PathKey,
    pub curve: &'a dyn PathCurve,
    /// World transform of the path object.
    pub world: Affine3A,
}

impl std::fmt::Debug for PathInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathInput")
            .field("key", &self.key)
            .field("world", &self.world)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn polyline_needs_two_points() {
        assert!(Polyline::new(vec![Vec3::ZERO]).is_none());
        assert!(Polyline::new(vec![Vec3::ZERO, Vec3::X]).is_some());
    }

    #[test]
    fn polyline_splits_parameter_evenly_between_segments() {
        // A short first segment and a long second one.
        let line = Polyline::new(vec![Vec3::ZERO, Vec3::X, Vec3::new(10.0, 0.0, 0.0)]).unwrap();

        assert!(close(line.point(0.0), Vec3::ZERO));
        assert!(close(line.point(0.5), Vec3::X));
        assert!(close(line.point(0.75), Vec3::new(5.5, 0.0, 0.0)));
        assert!(close(line.point(1.0), Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn polyline_tangent_follows_segment_direction() {
        let corner = Vec3::new(0.0, 0.0, 4.0);
        let line = Polyline::new(vec![Vec3::ZERO, corner, corner + Vec3::X * 4.0]).unwrap();

        assert!(close(line.tangent(0.25), Vec3::Z));
        assert!(close(line.tangent(0.75), Vec3::X));
        assert!(close(line.tangent(1.0), Vec3::X));
    }

    #[test]
    fn bezier_hits_its_end_points() {
        let b = CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(3.0, 2.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
        );
        assert!(close(b.point(0.0), b.p0));
        assert!(close(b.point(1.0), b.p3));
        // Symmetric control polygon peaks in the middle.
        assert!(close(b.point(0.5), Vec3::new(2.0, 1.5, 0.0)));
    }

    #[test]
    fn bezier_tangent_falls_back_when_derivative_vanishes() {
        let b = CubicBezier::new(Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0));
        assert!(close(b.tangent(0.0), Vec3::X));
    }

    #[test]
    fn spline_delegates_to_its_curve() {
        let b = CubicBezier::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0);
        let s = Spline::Bezier(b);
        assert!(close(s.point(0.3), b.point(0.3)));
        assert!(close(s.tangent(0.3), b.tangent(0.3)));
    }
}
