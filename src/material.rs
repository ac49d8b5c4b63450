use rand::prelude::*;

use crate::object::HitRecord;
use crate::ray::Ray;
use crate::vec3::{reflect, refract, Color, Vec3};

/// Material options for a rendered object.
///
/// Materials are plain values; any number of objects may carry copies of the
/// same one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Material {
    /// An opaque material with a matte surface, where lighting is calculated
    /// using [Lambertian reflectance][lambert].
    ///
    /// [lambert]: https://en.wikipedia.org/wiki/Lambertian_reflectance
    Lambertian { albedo: Color },
    /// A reflective material that looks like polished or frosted metal.
    Metal {
        /// The amount of light energy reflected in each color component, so
        /// `Color::WHITE` is a white surface, and `Color::BLACK` is totally
        /// black.
        albedo: Color,
        /// The amount of randomness introduced into reflected rays. A `fuzz` of
        /// 0 makes the surface look polished and mirror-smooth, while a `fuzz`
        /// of 1 produces a frosted, almost matte surface. Values outside
        /// `[0, 1]` aren't rejected, but don't look like anything real.
        fuzz: f32,
    },
    /// A transparent refractive material like glass or water.
    Dielectric {
        /// [Refractive index][ref-idx] of the material, which determines how
        /// much light is bent when traveling into or out of an object.
        ///
        /// [ref-idx]: https://en.wikipedia.org/wiki/Refractive_index
        ref_idx: f32,
    },
}

impl Material {
    /// Performs surface scattering from a material.
    ///
    /// When light traveling along `ray` reaches a surface made out of this
    /// material (intersection described by `hit`), some of it will be absorbed,
    /// and the rest will either be reflected or refracted. If 100% of the light
    /// is absorbed, `scatter` returns `None`; otherwise, it returns a new `Ray`
    /// giving the reflected/refracted direction of the light, and a `Color`
    /// with the fraction of energy kept in each of red, green, and blue.
    ///
    /// (In reality, light would be *both* reflected and refracted, but we
    /// choose one or the other randomly and use over-sampling to produce a
    /// blend.)
    pub fn scatter(&self, ray: &Ray, hit: &HitRecord, rng: &mut impl Rng) -> Option<(Ray, Color)> {
        match *self {
            Material::Lambertian { albedo } => {
                let scattered = Ray {
                    origin: hit.p,
                    direction: diffuse_direction(hit.normal, Vec3::random_unit(rng)),
                };
                Some((scattered, albedo))
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray.direction.into_unit(), hit.normal);
                let scattered = Ray {
                    origin: hit.p,
                    direction: reflected + fuzz * Vec3::in_unit_sphere(rng),
                };
                if scattered.direction.dot(hit.normal) > 0. {
                    Some((scattered, albedo))
                } else {
                    // Fuzz pushed the reflection below the surface.
                    None
                }
            }
            Material::Dielectric { ref_idx } => {
                let refraction_ratio = if hit.front_face {
                    1. / ref_idx
                } else {
                    ref_idx
                };

                let unit_direction = ray.direction.into_unit();
                let cos_theta = f32::min((-unit_direction).dot(hit.normal), 1.);
                let sin_theta = (1. - cos_theta * cos_theta).sqrt();

                let cannot_refract = refraction_ratio * sin_theta > 1.;
                let direction = if cannot_refract
                    || rng.gen::<f32>() < schlick(cos_theta, refraction_ratio)
                {
                    reflect(unit_direction, hit.normal)
                } else {
                    refract(unit_direction, hit.normal, refraction_ratio)
                };

                let scattered = Ray {
                    origin: hit.p,
                    direction,
                };
                Some((scattered, Color::WHITE))
            }
        }
    }
}

/// Bounce direction off a diffuse surface: the normal nudged by a random unit
/// vector, or the bare normal if the two nearly cancel.
#[inline]
fn diffuse_direction(normal: Vec3, random_unit: Vec3) -> Vec3 {
    let direction = normal + random_unit;
    if direction.near_zero() {
        normal
    } else {
        direction
    }
}

/// [Schlick's approximation][schlick] for computing reflection vs. refraction
/// at a material surface.
///
/// `r0` comes out the same whether `ref_idx` is an index or its reciprocal.
///
/// [schlick]: https://en.wikipedia.org/wiki/Schlick%27s_approximation
#[inline]
fn schlick(cos: f32, ref_idx: f32) -> f32 {
    let r0 = (1. - ref_idx) / (1. + ref_idx);
    let r0 = r0 * r0;
    r0 + (1. - r0) * f32::powf(1. - cos, 5.)
}
