use std::ops::RangeInclusive;

use crate::material::Material;
use crate::ray::Ray;
use crate::vec3::{Point3, Vec3};

/// Something a ray can run into.
///
/// The primary purpose of a `Hittable` is to interact with rays of light using
/// the `hit` method.
pub trait Hittable: Sync {
    /// Tests if `ray` intersects `self`, and if so, if that intersection occurs
    /// within `t_range` along the ray. (Recall that `Ray` is defined in terms
    /// of a `t` value that refers to points along the ray.)
    ///
    /// The `t_range` serves two purposes here. First, if the intersection
    /// occurs at *negative* `t`, the object is behind the photons instead of in
    /// front of them, and the intersection is an illusion. Second, while the
    /// upper end of `t_range` starts out as infinity, we adjust it down as we
    /// find objects along `ray`. Once we've found an object at position `t`, we
    /// can ignore any objects at positions greater than `t`.
    fn hit<'o>(&'o self, ray: &Ray, t_range: RangeInclusive<f32>) -> Option<HitRecord<'o>>;
}

/// A sphere.
///
/// A negative `radius` is allowed and flips the surface normals inside out,
/// which is how a hollow glass shell is modeled: nest a negative-radius
/// dielectric sphere inside a positive one.
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Point3, radius: f32, material: Material) -> Self {
        Sphere {
            center,
            radius,
            material,
        }
    }
}

impl Hittable for Sphere {
    #[inline]
    fn hit<'o>(&'o self, ray: &Ray, t_range: RangeInclusive<f32>) -> Option<HitRecord<'o>> {
        // Note:
        //
        //   (-b +- sqrt(b^2 - 4ac))/(2a)  =>  (-h +- sqrt(h^2 - ac))/a
        //
        // through the substitution b = 2h.
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0. {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        for &t in &[(-half_b - sqrtd) / a, (-half_b + sqrtd) / a] {
            if t_range.contains(&t) {
                let p = ray.point_at_parameter(t);
                let outward_normal = (p - self.center) / self.radius;
                return Some(HitRecord::new(ray, t, p, outward_normal, &self.material));
            }
        }
        None
    }
}

/// The closed set of primitives a `Scene` can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Sphere(Sphere),
}

impl From<Sphere> for Object {
    fn from(s: Sphere) -> Self {
        Object::Sphere(s)
    }
}

impl Hittable for Object {
    #[inline]
    fn hit<'o>(&'o self, ray: &Ray, t_range: RangeInclusive<f32>) -> Option<HitRecord<'o>> {
        match self {
            Object::Sphere(s) => s.hit(ray, t_range),
        }
    }
}

/// A collection of objects, searched linearly for the nearest hit.
///
/// Order doesn't affect which hit is reported, since the search always keeps
/// the closest one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    objects: Vec<Object>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn push(&mut self, object: impl Into<Object>) {
        self.objects.push(object.into());
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
}

impl<O: Into<Object>> std::iter::FromIterator<O> for Scene {
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        Scene {
            objects: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Hittable for Scene {
    fn hit<'o>(&'o self, ray: &Ray, t_range: RangeInclusive<f32>) -> Option<HitRecord<'o>> {
        let near = *t_range.start();
        let mut nearest = *t_range.end();
        let mut hit = None;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, near..=nearest) {
                nearest = rec.t;
                hit = Some(rec);
            }
        }

        hit
    }
}

/// A description of a `Ray` hitting an object. This stores information needed
/// for rendering later.
///
/// The `'m` lifetime refers to the `Material` of the object, which we capture
/// by reference. Thus, a `HitRecord` cannot outlive the object it refers to.
#[derive(Clone, Debug)]
pub struct HitRecord<'m> {
    /// Position along the ray, in units of the ray's direction.
    pub t: f32,
    /// Position along the ray, as an actual point.
    pub p: Point3,
    /// Unit surface normal at the hit position, always facing against the
    /// incoming ray.
    pub normal: Vec3,
    /// Whether the ray struck the outside of the surface, i.e. whether
    /// `normal` is the geometric outward normal rather than its negation.
    pub front_face: bool,
    /// Material of the object at the hit position.
    pub material: &'m Material,
}

impl<'m> HitRecord<'m> {
    /// Builds a record, orienting `outward_normal` (which must be unit length)
    /// to oppose `ray`.
    pub fn new(
        ray: &Ray,
        t: f32,
        p: Point3,
        outward_normal: Vec3,
        material: &'m Material,
    ) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };
        HitRecord {
            t,
            p,
            normal,
            front_face,
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::Color;

    const EPS: f32 = 1e-5;

    fn matte() -> Material {
        Material::Lambertian {
            albedo: Color::new(0.5, 0.5, 0.5),
        }
    }

    fn ray(origin: Point3, direction: Vec3) -> Ray {
        Ray { origin, direction }
    }

    #[test]
    fn ray_at_center_hits_at_distance_minus_radius() {
        let sphere = Sphere::new(Point3::new(0., 0., -5.), 1.5, matte());
        let r = ray(Point3::ORIGIN, Vec3(0., 0., -1.));
        let hit = sphere.hit(&r, 0.001..=std::f32::MAX).expect("should hit");
        assert!((hit.t - 3.5).abs() < EPS);
        assert!(hit.front_face);
        // Normal points back toward the ray's origin.
        assert!((hit.normal - Vec3(0., 0., 1.)).length() < EPS);
    }

    #[test]
    fn unnormalized_direction_scales_t() {
        let sphere = Sphere::new(Point3::new(0., 0., -5.), 1., matte());
        let r = ray(Point3::ORIGIN, Vec3(0., 0., -2.));
        let hit = sphere.hit(&r, 0.001..=std::f32::MAX).expect("should hit");
        assert!((hit.t - 2.).abs() < EPS);
        assert!((hit.p - Point3::new(0., 0., -4.)).length() < EPS);
    }

    #[test]
    fn miss_reports_none() {
        let sphere = Sphere::new(Point3::new(0., 0., -5.), 1., matte());
        let r = ray(Point3::ORIGIN, Vec3(0., 1., 0.));
        assert!(sphere.hit(&r, 0.001..=std::f32::MAX).is_none());
    }

    #[test]
    fn falls_back_to_far_root_from_inside() {
        let sphere = Sphere::new(Point3::ORIGIN, 2., matte());
        let r = ray(Point3::ORIGIN, Vec3(1., 0., 0.));
        let hit = sphere.hit(&r, 0.001..=std::f32::MAX).expect("should hit");
        assert!((hit.t - 2.).abs() < EPS);
        assert!(!hit.front_face);
        // The outward normal is +x; the stored normal faces the ray instead.
        assert!((hit.normal - Vec3(-1., 0., 0.)).length() < EPS);
    }

    #[test]
    fn roots_outside_range_are_rejected() {
        let sphere = Sphere::new(Point3::new(0., 0., -5.), 1., matte());
        let r = ray(Point3::ORIGIN, Vec3(0., 0., -1.));
        assert!(sphere.hit(&r, 0.001..=3.9).is_none());
        let hit = sphere.hit(&r, 4.5..=10.).expect("far root in range");
        assert!((hit.t - 6.).abs() < EPS);
    }

    #[test]
    fn negative_radius_turns_normals_inward() {
        let sphere = Sphere::new(Point3::new(0., 0., -5.), -1., matte());
        let r = ray(Point3::ORIGIN, Vec3(0., 0., -1.));
        let hit = sphere.hit(&r, 0.001..=std::f32::MAX).expect("should hit");
        assert!((hit.t - 4.).abs() < EPS);
        assert!(!hit.front_face);
        assert!((hit.normal - Vec3(0., 0., 1.)).length() < EPS);
    }

    #[test]
    fn scene_reports_nearest_hit_regardless_of_order() {
        let near = Sphere::new(
            Point3::new(0., 0., -3.),
            1.,
            Material::Metal {
                albedo: Color::WHITE,
                fuzz: 0.,
            },
        );
        let far = Sphere::new(Point3::new(0., 0., -10.), 1., matte());
        let r = ray(Point3::ORIGIN, Vec3(0., 0., -1.));

        for scene in &[
            vec![far.clone(), near.clone()].into_iter().collect::<Scene>(),
            vec![near.clone(), far.clone()].into_iter().collect::<Scene>(),
        ] {
            let hit = scene.hit(&r, 0.001..=std::f32::MAX).expect("should hit");
            assert!((hit.t - 2.).abs() < EPS);
            assert_eq!(hit.material, &near.material);
        }
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::new();
        let r = ray(Point3::ORIGIN, Vec3(0., 0., -1.));
        assert!(scene.is_empty());
        assert!(scene.hit(&r, 0.001..=std::f32::MAX).is_none());
    }
}
