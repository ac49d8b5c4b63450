//! Hardcoded scenes and the cameras that go with them.

use std::str::FromStr;

use rand::prelude::*;

use crate::camera::Camera;
use crate::material::Material;
use crate::object::{Scene, Sphere};
use crate::vec3::{Color, Point3, Vec3};
use crate::Error;

/// The scenes the renderer knows how to build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneName {
    /// The "Ray Tracing in One Weekend" cover: a field of small random spheres
    /// around three big ones.
    Random,
    /// Three spheres in a row (diffuse, hollow glass, metal) on a ground.
    Test,
    /// A polished metal ball resting above a diffuse ground.
    Pair,
}

impl SceneName {
    pub const ALL: [SceneName; 3] = [SceneName::Random, SceneName::Test, SceneName::Pair];

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneName::Random => "random",
            SceneName::Test => "test",
            SceneName::Pair => "pair",
        }
    }

    /// Builds the scene. Only `Random` consumes randomness.
    pub fn build(&self, rng: &mut impl Rng) -> Scene {
        match self {
            SceneName::Random => random_scene(rng),
            SceneName::Test => test_scene(),
            SceneName::Pair => pair_scene(),
        }
    }

    /// The camera this scene was composed for, at the given aspect ratio.
    /// `fov` overrides the vertical field of view (in degrees).
    pub fn camera(&self, aspect: f32, fov: Option<f32>) -> Camera {
        let up = Vec3(0., 1., 0.);
        match self {
            SceneName::Random => {
                let look_from = Point3::new(13., 2., 3.);
                let look_at = Point3::ORIGIN;
                Camera::look(look_from, look_at, up, fov.unwrap_or(30.), aspect, 0.1, 10.)
            }
            SceneName::Test => {
                let look_from = Point3::new(-2., 2., 1.);
                let look_at = Point3::new(0., 0., -1.);
                let dist_to_focus = (look_from - look_at).length();
                Camera::look(look_from, look_at, up, fov.unwrap_or(20.), aspect, 2.0, dist_to_focus)
            }
            SceneName::Pair => Camera::look(
                Point3::ORIGIN,
                Point3::new(0., 0., -1.),
                up,
                fov.unwrap_or(90.),
                aspect,
                0.,
                1.,
            ),
        }
    }
}

impl FromStr for SceneName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SceneName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownScene(s.to_string()))
    }
}

impl std::fmt::Display for SceneName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn random_scene(rng: &mut impl Rng) -> Scene {
    let mut world = Scene::new();
    world.push(Sphere::new(
        Point3::new(0., -1000., 0.),
        1000.,
        Material::Lambertian {
            albedo: Color::new(0.5, 0.5, 0.5),
        },
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = rng.gen::<f32>();
            let center = Point3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if (center - Point3::new(4., 0.2, 0.)).length() <= 0.9 {
                continue;
            }

            let material = if choose_mat < 0.8 {
                Material::Lambertian {
                    albedo: rng.gen::<Color>() * rng.gen::<Color>(),
                }
            } else if choose_mat < 0.95 {
                Material::Metal {
                    albedo: Color(Vec3::random_range(rng, 0.5, 1.)),
                    fuzz: rng.gen_range(0., 0.5),
                }
            } else {
                Material::Dielectric { ref_idx: 1.5 }
            };
            world.push(Sphere::new(center, 0.2, material));
        }
    }

    world.push(Sphere::new(
        Point3::new(0., 1., 0.),
        1.0,
        Material::Dielectric { ref_idx: 1.5 },
    ));
    world.push(Sphere::new(
        Point3::new(-4., 1., 0.),
        1.0,
        Material::Lambertian {
            albedo: Color::new(0.4, 0.2, 0.1),
        },
    ));
    world.push(Sphere::new(
        Point3::new(4., 1., 0.),
        1.0,
        Material::Metal {
            albedo: Color::new(0.7, 0.6, 0.5),
            fuzz: 0.,
        },
    ));

    world
}

pub fn test_scene() -> Scene {
    let ground = Material::Lambertian {
        albedo: Color::new(0.8, 0.8, 0.0),
    };
    let center = Material::Lambertian {
        albedo: Color::new(0.1, 0.2, 0.5),
    };
    let glass = Material::Dielectric { ref_idx: 1.5 };
    let metal = Material::Metal {
        albedo: Color::new(0.8, 0.6, 0.2),
        fuzz: 0.,
    };

    vec![
        Sphere::new(Point3::new(0., -100.5, -1.), 100., ground),
        Sphere::new(Point3::new(0., 0., -1.), 0.5, center),
        Sphere::new(Point3::new(-1., 0., -1.), 0.5, glass),
        // Negative radius: the inside surface of a bubble in the glass.
        Sphere::new(Point3::new(-1., 0., -1.), -0.45, glass),
        Sphere::new(Point3::new(1., 0., -1.), 0.5, metal),
    ]
    .into_iter()
    .collect()
}

pub fn pair_scene() -> Scene {
    vec![
        Sphere::new(
            Point3::new(0., -100.5, -1.),
            100.,
            Material::Lambertian {
                albedo: Color::new(0.8, 0.3, 0.1),
            },
        ),
        Sphere::new(
            Point3::new(0., 0., -1.),
            0.5,
            Material::Metal {
                albedo: Color::new(0.8, 0.8, 0.8),
                fuzz: 0.,
            },
        ),
    ]
    .into_iter()
    .collect()
}
