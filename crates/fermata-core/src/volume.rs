use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// The shape of a time bubble volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleShape {
    /// A sphere of the given radius.
    Sphere {
        /// Sphere radius; containment is inclusive at the boundary.
        radius: f64,
    },
    /// An axis-aligned box described by its half extents.
    Box {
        /// Half extent along each axis.
        half_extents: Vec3,
    },
    /// A vertical cylinder.
    Cylinder {
        /// Planar (XZ) radius.
        radius: f64,
        /// Full height; membership spans `center.y ± height / 2`.
        height: f64,
        /// If set, the vertical test is skipped and the cylinder is an
        /// infinite column.
        ignore_y: bool,
    },
}

/// A spatial volume imposing a local time mode on entities inside it.
///
/// Pure value type, immutable once constructed. `contains` is total:
/// degenerate geometry (non-positive radius or extents) contains nothing
/// rather than faulting — authoring such a volume is the spawning
/// collaborator's contract violation, not ours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleVolume {
    /// Center of the volume in world space.
    pub center: Vec3,
    /// The shape tested against entity positions.
    pub shape: BubbleShape,
}

impl BubbleVolume {
    /// A sphere at `center` with the given radius.
    pub fn sphere(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            shape: BubbleShape::Sphere { radius },
        }
    }

    /// An axis-aligned box at `center` with the given half extents.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            shape: BubbleShape::Box { half_extents },
        }
    }

    /// A vertical cylinder at `center`.
    pub fn cylinder(center: Vec3, radius: f64, height: f64, ignore_y: bool) -> Self {
        Self {
            center,
            shape: BubbleShape::Cylinder {
                radius,
                height,
                ignore_y,
            },
        }
    }

    /// Whether `point` lies inside the volume. Inclusive at the boundary.
    pub fn contains(&self, point: Vec3) -> bool {
        match self.shape {
            BubbleShape::Sphere { radius } => {
                radius > 0.0 && self.center.distance(point) <= radius
            }
            BubbleShape::Box { half_extents } => {
                if half_extents.x <= 0.0 || half_extents.y <= 0.0 || half_extents.z <= 0.0 {
                    return false;
                }
                (point.x - self.center.x).abs() <= half_extents.x
                    && (point.y - self.center.y).abs() <= half_extents.y
                    && (point.z - self.center.z).abs() <= half_extents.z
            }
            BubbleShape::Cylinder {
                radius,
                height,
                ignore_y,
            } => {
                if radius <= 0.0 || (!ignore_y && height <= 0.0) {
                    return false;
                }
                if self.center.distance_xz(point) > radius {
                    return false;
                }
                ignore_y || (point.y - self.center.y).abs() <= height / 2.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_containment() {
        let v = BubbleVolume::sphere(Vec3::ZERO, 10.0);
        assert!(v.contains(Vec3::new(9.9, 0.0, 0.0)));
        assert!(!v.contains(Vec3::new(15.0, 0.0, 0.0)));
    }

    #[test]
    fn sphere_boundary_is_inclusive() {
        // A point at exactly the radius is contained.
        let v = BubbleVolume::sphere(Vec3::ZERO, 10.0);
        assert!(v.contains(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn box_containment() {
        let v = BubbleVolume::cuboid(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 3.0, 4.0));
        assert!(v.contains(Vec3::new(3.0, 4.0, 5.0)));
        assert!(v.contains(Vec3::new(-1.0, -2.0, -3.0)));
        assert!(!v.contains(Vec3::new(3.1, 1.0, 1.0)));
    }

    #[test]
    fn cylinder_containment() {
        let v = BubbleVolume::cylinder(Vec3::ZERO, 5.0, 4.0, false);
        assert!(v.contains(Vec3::new(3.0, 1.9, 4.0)));
        assert!(!v.contains(Vec3::new(3.0, 2.1, 4.0)));
        assert!(!v.contains(Vec3::new(5.1, 0.0, 0.0)));
    }

    #[test]
    fn cylinder_ignore_y_is_infinite_column() {
        let v = BubbleVolume::cylinder(Vec3::ZERO, 5.0, 4.0, true);
        assert!(v.contains(Vec3::new(3.0, 1000.0, 0.0)));
        assert!(!v.contains(Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn degenerate_geometry_contains_nothing() {
        assert!(!BubbleVolume::sphere(Vec3::ZERO, 0.0).contains(Vec3::ZERO));
        assert!(!BubbleVolume::sphere(Vec3::ZERO, -1.0).contains(Vec3::ZERO));
        assert!(
            !BubbleVolume::cuboid(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).contains(Vec3::ZERO)
        );
        assert!(!BubbleVolume::cylinder(Vec3::ZERO, -2.0, 4.0, false).contains(Vec3::ZERO));
        assert!(!BubbleVolume::cylinder(Vec3::ZERO, 2.0, 0.0, false).contains(Vec3::ZERO));
    }
}
