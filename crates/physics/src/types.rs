use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);
    pub const BACK: Self = Self::new(0.0, 0.0, -1.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Distance measured in the ground (x, z) plane, ignoring height.
    #[must_use]
    pub fn planar_distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Returns the unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > f32::EPSILON {
            self / len
        } else {
            Self::ZERO
        }
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 3] {
        bytemuck::cast(self)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f32> for Vec3 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Axis-aligned bounding box described by its center and half extents.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    #[must_use]
    pub const fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Strict containment; points on the surface are outside.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        let d = p - self.center;
        d.x.abs() < self.half_extents.x
            && d.y.abs() < self.half_extents.y
            && d.z.abs() < self.half_extents.z
    }

    /// Overlap test in the (x, z) plane only.
    #[must_use]
    pub fn overlaps_planar(&self, other: &Self) -> bool {
        (self.center.x - other.center.x).abs() < self.half_extents.x + other.half_extents.x
            && (self.center.z - other.center.z).abs() < self.half_extents.z + other.half_extents.z
    }

    #[must_use]
    pub fn translated(&self, delta: Vec3) -> Self {
        Self::new(self.center + delta, self.half_extents)
    }
}
