use crate::vec3::{Point3, Vec3};

/// A ray, beginning at `origin` and extending along `direction`.
///
/// `direction` need not be a unit vector.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    /// Finds the point along the ray at parameter `t`. Positive values of `t`
    /// represent positions forward from the origin, and negative values,
    /// behind the origin.
    pub fn point_at_parameter(&self, t: f32) -> Point3 {
        self.origin + t * self.direction
    }
}
