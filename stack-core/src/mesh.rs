use glam::{Affine3A, Vec3};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of this box after transforming its eight corners.
    pub fn transformed(&self, m: &Affine3A) -> Self {
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        // Eight corners are always present.
        Self::from_points(corners.map(|c| m.transform_point3(c))).unwrap_or(*self)
    }
}

/// Geometry payload of a scene node: a cloud of points in node space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub points: Vec<Vec3>,
}

impl Mesh {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Upright cylinder standing on the origin, approximated by two rings of
    /// `segments` points.
    pub fn cylinder(radius: f32, height: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let mut points = Vec::with_capacity(segments * 2);
        for y in [0.0, height] {
            for i in 0..segments {
                let a = i as f32 / segments as f32 * std::f32::consts::TAU;
                points.push(Vec3::new(a.cos() * radius, y, a.sin() * radius));
            }
        }
        Self { points }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.points.iter().copied())
    }
}
