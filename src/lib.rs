#![deny(unsafe_code)]

pub mod camera;
mod error;
pub mod material;
pub mod object;
pub mod ray;
pub mod render;
pub mod scenes;
pub mod vec3;

use rand::prelude::*;

pub use crate::camera::Camera;
pub use crate::error::Error;
pub use crate::material::Material;
pub use crate::object::{Hittable, Object, Scene, Sphere};
pub use crate::ray::Ray;
pub use crate::render::{render, render_with, Framebuffer, RenderConfig, Scheduler};
pub use crate::vec3::{Color, Point3, Vec3};

/// Closest intersection distance we'll accept. Keeps a scattered ray from
/// re-hitting the surface it just left due to rounding ("shadow acne").
pub const NEAR: f32 = 0.001;

/// Bounce budget used when nobody asks for something else.
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Sky color straight up; the horizon is white.
pub const SKY_BLUE: Color = Color(Vec3(0.5, 0.7, 1.0));

/// Background radiance for a ray that escapes the scene: a vertical gradient
/// from white at `y = -1` to `SKY_BLUE` at `y = 1`.
pub fn sky(ray: &Ray) -> Color {
    let unit_direction = ray.direction.into_unit();
    let t = 0.5 * (unit_direction.1 + 1.);
    Color::WHITE.lerp(SKY_BLUE, t)
}

/// Computes the color seen along `ray` in `world`, following at most
/// `max_depth` surface interactions.
///
/// This is the actual ray-tracing routine. It's the iterative form of the
/// usual recursion: each scatter multiplies the running attenuation, and the
/// path ends black if it is absorbed or runs out of bounces.
pub fn ray_color(world: &impl Hittable, mut ray: Ray, max_depth: u32, rng: &mut impl Rng) -> Color {
    // Records the cumulative (product) attenuation of each surface we've
    // visited so far.
    let mut strength = Color::WHITE;

    for _ in 0..max_depth {
        let hit = match world.hit(&ray, NEAR..=std::f32::MAX) {
            Some(hit) => hit,
            None => return strength * sky(&ray),
        };

        if let Some((new_ray, attenuation)) = hit.material.scatter(&ray, &hit, rng) {
            // Redirect flight, accumulate the new attenuation value.
            ray = new_ray;
            strength = strength * attenuation;
        } else {
            // Locally absorbed; we're done.
            return Color::BLACK;
        }
    }

    Color::BLACK
}
