use rand::prelude::*;

/// A three-vector of floats, used for directions and offsets.
///
/// Positions and colors share this representation but get their own wrapper
/// types, `Point3` and `Color`, so that a color can't be added to a point by
/// accident.
///
/// The components of the vector can be accessed tuple-style (`v.0`, `v.1`,
/// `v.2`) or using the `Axis` enum: `v[X]`, `v[Y]`, `v[Z]`. The latter
/// requires a `use spheretrace::vec3::Axis::*` statement.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Vec3(pub f32, pub f32, pub f32);

/// Components smaller than this are considered zero by `Vec3::near_zero`.
const NEAR_ZERO: f32 = 1e-8;

impl Vec3 {
    /// Generates a random `Vec3` inside a sphere with unit radius. The length
    /// of the result is between 0 and 1.
    pub fn in_unit_sphere(rng: &mut impl Rng) -> Self {
        loop {
            let v = Vec3::random_range(rng, -1., 1.);
            if v.length_squared() < 1. {
                return v;
            }
        }
    }

    /// Generates a random `Vec3` inside a disc with unit radius in the XY
    /// plane. The length of the result is between 0 and 1, and the Z component
    /// is 0.
    pub fn in_unit_disc(rng: &mut impl Rng) -> Self {
        loop {
            let v = Vec3(rng.gen_range(-1., 1.), rng.gen_range(-1., 1.), 0.);
            if v.length_squared() < 1. {
                return v;
            }
        }
    }

    /// Generates a random direction of unit length.
    pub fn random_unit(rng: &mut impl Rng) -> Self {
        loop {
            let v = Vec3::random_range(rng, -1., 1.);
            let len2 = v.length_squared();
            // Points very near the center can't be normalized reliably.
            if len2 < 1. && len2 > NEAR_ZERO {
                return v / len2.sqrt();
            }
        }
    }

    /// Generates a vector with each component drawn uniformly from
    /// `[min, max)`.
    pub fn random_range(rng: &mut impl Rng, min: f32, max: f32) -> Self {
        Vec3(
            rng.gen_range(min, max),
            rng.gen_range(min, max),
            rng.gen_range(min, max),
        )
    }

    /// Computes the dot product of two vectors.
    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.zip_with(other, core::ops::Mul::mul)
            .reduce(core::ops::Add::add)
    }

    /// Computes the cross product of two vectors.
    pub fn cross(&self, other: &Self) -> Self {
        Vec3(
            self.1 * other.2 - self.2 * other.1,
            -(self.0 * other.2 - self.2 * other.0),
            self.0 * other.1 - self.1 * other.0,
        )
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.dot(*self)
    }

    /// Gets the length/magnitude of a vector.
    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Produces a vector collinear with `self` but with unit length. That is,
    /// the result points the same direction as `self` relative to the origin.
    ///
    /// `self` must not be the zero vector.
    pub fn into_unit(self) -> Self {
        self / self.length()
    }

    /// Checks whether every component is within a tiny epsilon of zero. Used
    /// to catch degenerate scatter directions.
    pub fn near_zero(&self) -> bool {
        self.0.abs() < NEAR_ZERO && self.1.abs() < NEAR_ZERO && self.2.abs() < NEAR_ZERO
    }

    /// Applies `f` to each element of the vector in turn, giving a new vector.
    #[inline]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Vec3(f(self.0), f(self.1), f(self.2))
    }

    /// Combines each corresponding element of `self` and `other` by giving them
    /// as arguments to function `f`. The results are collected into a new
    /// vector.
    #[inline]
    pub fn zip_with(self, other: Vec3, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        Vec3(f(self.0, other.0), f(self.1, other.1), f(self.2, other.2))
    }

    /// Combines the elements of `self` using `f` until only one result remains.
    #[inline]
    pub fn reduce(self, f: impl Fn(f32, f32) -> f32) -> f32 {
        f(f(self.0, self.1), self.2)
    }
}

/// Element-wise multiplication (Hadamard product).
impl std::ops::Mul for Vec3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Self::Output {
        self.zip_with(rhs, std::ops::Mul::mul)
    }
}

/// `scalar * vector`
impl std::ops::Mul<Vec3> for f32 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs.map(|x| self * x)
    }
}

/// `vector / scalar`
impl std::ops::Div<f32> for Vec3 {
    type Output = Vec3;

    #[inline]
    fn div(self, rhs: f32) -> Self::Output {
        self.map(|x| x / rhs)
    }
}

/// `vector + vector`
impl std::ops::Add for Vec3 {
    type Output = Vec3;

    #[inline]
    fn add(self, rhs: Vec3) -> Self::Output {
        self.zip_with(rhs, std::ops::Add::add)
    }
}

/// `vector - vector`
impl std::ops::Sub for Vec3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, rhs: Vec3) -> Self::Output {
        self.zip_with(rhs, std::ops::Sub::sub)
    }
}

/// `-vector`
impl std::ops::Neg for Vec3 {
    type Output = Vec3;

    #[inline]
    fn neg(self) -> Self::Output {
        self.map(std::ops::Neg::neg)
    }
}

/// Allow `Vec3` to be produced by `Rng::gen`.
///
/// The resulting vector has each component in the half-open range `[0,1)`. Note
/// that this is *not* a unit vector.
impl rand::distributions::Distribution<Vec3> for rand::distributions::Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3(rng.gen(), rng.gen(), rng.gen())
    }
}

/// A position in world space.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Point3(pub Vec3);

impl Point3 {
    pub const ORIGIN: Point3 = Point3(Vec3(0., 0., 0.));

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Point3(Vec3(x, y, z))
    }
}

/// `point + offset`
impl std::ops::Add<Vec3> for Point3 {
    type Output = Point3;

    #[inline]
    fn add(self, rhs: Vec3) -> Self::Output {
        Point3(self.0 + rhs)
    }
}

/// `point - offset`
impl std::ops::Sub<Vec3> for Point3 {
    type Output = Point3;

    #[inline]
    fn sub(self, rhs: Vec3) -> Self::Output {
        Point3(self.0 - rhs)
    }
}

/// `point - point`, giving the offset between them.
impl std::ops::Sub for Point3 {
    type Output = Vec3;

    #[inline]
    fn sub(self, rhs: Point3) -> Self::Output {
        self.0 - rhs.0
    }
}

/// Linear-light radiance or attenuation, one lane per channel.
///
/// Components are nominally in `[0, 1]`, but sums of samples exceed that
/// until they're averaged.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    pub const BLACK: Color = Color(Vec3(0., 0., 0.));
    pub const WHITE: Color = Color(Vec3(1., 1., 1.));

    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Color(Vec3(r, g, b))
    }

    /// Linear interpolation from `self` (at `t = 0`) to `other` (at `t = 1`).
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        (1. - t) * self + t * other
    }

    #[inline]
    pub fn map(self, f: impl FnMut(f32) -> f32) -> Color {
        Color(self.0.map(f))
    }
}

/// `color + color`
impl std::ops::Add for Color {
    type Output = Color;

    #[inline]
    fn add(self, rhs: Color) -> Self::Output {
        Color(self.0 + rhs.0)
    }
}

/// Attenuation: `color * color`, channel by channel.
impl std::ops::Mul for Color {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: Color) -> Self::Output {
        Color(self.0 * rhs.0)
    }
}

/// `scalar * color`
impl std::ops::Mul<Color> for f32 {
    type Output = Color;

    #[inline]
    fn mul(self, rhs: Color) -> Self::Output {
        Color(self * rhs.0)
    }
}

/// `color / scalar`
impl std::ops::Div<f32> for Color {
    type Output = Color;

    #[inline]
    fn div(self, rhs: f32) -> Self::Output {
        Color(self.0 / rhs)
    }
}

/// Allow accumulation of samples from an iterator.
impl std::iter::Sum for Color {
    #[inline]
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Color::BLACK, std::ops::Add::add)
    }
}

/// Random colors have each channel in `[0,1)`.
impl rand::distributions::Distribution<Color> for rand::distributions::Standard {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        Color(rng.gen())
    }
}

/// Names for color channels.
///
/// `Color` has an `Index` impl for `Channel`, so you can use `Channel` values
/// to select components:
///
/// ```
/// use spheretrace::vec3::{Color, Channel::*};
///
/// let c = Color::new(1., 2., 3.);
/// assert_eq!(c[R], 1.);
/// assert_eq!(c[G], 2.);
/// assert_eq!(c[B], 3.);
/// ```
#[derive(Copy, Clone, Debug)]
pub enum Channel {
    /// Red.
    R,
    /// Green.
    G,
    /// Blue.
    B,
}

use Channel::*;

impl ::std::ops::Index<Channel> for Color {
    type Output = f32;

    fn index(&self, idx: Channel) -> &Self::Output {
        match idx {
            R => &(self.0).0,
            G => &(self.0).1,
            B => &(self.0).2,
        }
    }
}

/// Names for vector lanes when used as a coordinate.
///
/// `Vec3` and `Point3` have `Index` impls for `Axis`:
///
/// ```
/// use spheretrace::vec3::{Point3, Vec3, Axis::*};
///
/// let v = Vec3(1., 2., 3.);
/// assert_eq!(v[X], 1.);
/// assert_eq!(v[Y], 2.);
/// assert_eq!(v[Z], 3.);
///
/// let p = Point3::new(4., 5., 6.);
/// assert_eq!(p[Y], 5.);
/// ```
#[derive(Copy, Clone, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

use Axis::*;

impl ::std::ops::Index<Axis> for Vec3 {
    type Output = f32;

    fn index(&self, idx: Axis) -> &Self::Output {
        match idx {
            X => &self.0,
            Y => &self.1,
            Z => &self.2,
        }
    }
}

impl ::std::ops::Index<Axis> for Point3 {
    type Output = f32;

    fn index(&self, idx: Axis) -> &Self::Output {
        &self.0[idx]
    }
}

/// Reflects a vector `v` around a surface normal `n`.
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2. * v.dot(n) * n
}

/// Refracts the unit vector `uv` through a surface with unit normal `n`.
/// `etai_over_etat` is the ratio of refractive indices across the surface:
/// the material's index if the ray is exiting it, or its reciprocal if it's
/// entering.
///
/// The caller is responsible for ruling out total internal reflection first.
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = f32::min((-uv).dot(n), 1.);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1. - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn cross_of_basis_vectors() {
        let x = Vec3(1., 0., 0.);
        let y = Vec3(0., 1., 0.);
        assert_eq!(x.cross(&y), Vec3(0., 0., 1.));
        assert_eq!(y.cross(&x), Vec3(0., 0., -1.));
    }

    #[test]
    fn unit_vector_has_length_one() {
        let v = Vec3(3., -4., 12.).into_unit();
        assert!((v.length() - 1.).abs() < 1e-6);
        assert!(close(v, Vec3(3., -4., 12.) / 13.));
    }

    #[test]
    fn near_zero_threshold() {
        assert!(Vec3(1e-9, -1e-9, 0.).near_zero());
        assert!(!Vec3(1e-9, 1e-7, 0.).near_zero());
    }

    #[test]
    fn point_arithmetic() {
        let a = Point3::new(1., 2., 3.);
        let b = Point3::new(0., 1., 1.);
        assert_eq!(a - b, Vec3(1., 1., 2.));
        assert_eq!(b + Vec3(1., 1., 2.), a);
    }

    #[test]
    fn color_lerp_endpoints() {
        let sky = Color::new(0.5, 0.7, 1.);
        assert_eq!(Color::WHITE.lerp(sky, 0.), Color::WHITE);
        assert_eq!(Color::WHITE.lerp(sky, 1.), sky);
    }

    #[test]
    fn reflect_flips_normal_component() {
        let v = Vec3(1., -1., 0.);
        let n = Vec3(0., 1., 0.);
        assert_eq!(reflect(v, n), Vec3(1., 1., 0.));
    }

    #[test]
    fn refract_with_unit_ratio_passes_straight_through() {
        let uv = Vec3(1., -1., 0.).into_unit();
        let n = Vec3(0., 1., 0.);
        assert!(close(refract(uv, n, 1.), uv));
    }

    #[test]
    fn random_draws_stay_in_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(Vec3::in_unit_sphere(&mut rng).length_squared() < 1.);
            let d = Vec3::in_unit_disc(&mut rng);
            assert!(d.length_squared() < 1.);
            assert_eq!(d.2, 0.);
            assert!((Vec3::random_unit(&mut rng).length() - 1.).abs() < 1e-5);
        }
    }

    #[test]
    fn operations_are_pure() {
        let a = Vec3(0.1, 0.2, 0.3);
        let b = Vec3(-1.5, 2.5, 0.7);
        assert_eq!(a.cross(&b).to_bits(), a.cross(&b).to_bits());
        assert_eq!(a.dot(b).to_bits(), a.dot(b).to_bits());
        assert_eq!(
            refract(a.into_unit(), b.into_unit(), 0.6).to_bits(),
            refract(a.into_unit(), b.into_unit(), 0.6).to_bits()
        );
    }

    impl Vec3 {
        fn to_bits(self) -> [u32; 3] {
            [self.0.to_bits(), self.1.to_bits(), self.2.to_bits()]
        }
    }
}
