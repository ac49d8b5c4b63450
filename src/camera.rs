use rand::prelude::*;

use crate::ray::Ray;
use crate::vec3::{Axis::*, Point3, Vec3};

/// A thin-lens camera.
///
/// All the trigonometry happens in `look`; `get_ray` only interpolates across
/// the precomputed viewport and jitters the origin across the lens.
#[derive(Clone, Debug)]
pub struct Camera {
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Sets up a camera at `look_from` pointed at `look_at`.
    ///
    /// `fov` is the vertical field of view in degrees and `aspect` is width
    /// over height. Points at `focus_dist` from the lens are in perfect focus;
    /// `aperture` is the lens diameter, so zero gives a pinhole camera with no
    /// defocus blur.
    ///
    /// The view direction must not be parallel to `up`.
    pub fn look(
        look_from: Point3,
        look_at: Point3,
        up: Vec3,
        fov: f32,
        aspect: f32,
        aperture: f32,
        focus_dist: f32,
    ) -> Self {
        let lens_radius = aperture / 2.;
        let theta = fov * std::f32::consts::PI / 180.;
        let half_height = f32::tan(theta / 2.);
        let half_width = aspect * half_height;
        let origin = look_from;
        let w = (look_from - look_at).into_unit();
        let u = up.cross(&w).into_unit();
        let v = w.cross(&u);
        let lower_left_corner =
            origin - half_width * focus_dist * u - half_height * focus_dist * v - focus_dist * w;
        let horizontal = 2. * half_width * focus_dist * u;
        let vertical = 2. * half_height * focus_dist * v;
        Camera {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius,
        }
    }

    /// Produces a ray through viewport coordinates `(s, t)`, where `(0, 0)` is
    /// the lower left corner and `(1, 1)` the upper right.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut impl Rng) -> Ray {
        let rd = self.lens_radius * Vec3::in_unit_disc(rng);
        let offset = rd[X] * self.u + rd[Y] * self.v;
        let origin = self.origin + offset;
        Ray {
            origin,
            direction: (self.lower_left_corner + s * self.horizontal + t * self.vertical) - origin,
        }
    }
}
