//! Minimal geometry types shared by the map crates: world-space vectors and
//! tile-space rectangles.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    #[cfg_attr(test, proptest(strategy = "-1.0e3f32..1.0e3"))]
    pub x: f32,
    #[cfg_attr(test, proptest(strategy = "-1.0e3f32..1.0e3"))]
    pub y: f32,
    #[cfg_attr(test, proptest(strategy = "-1.0e3f32..1.0e3"))]
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Integer tile (or chunk) coordinate on the map plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct TilePos {
    #[cfg_attr(test, proptest(strategy = "-4096i32..4096"))]
    pub x: i32,
    #[cfg_attr(test, proptest(strategy = "-4096i32..4096"))]
    pub y: i32,
}

impl TilePos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn east(self) -> Self {
        Self::new(self.x + 1, self.y)
    }

    #[inline]
    pub const fn north(self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    #[inline]
    pub const fn north_east(self) -> Self {
        Self::new(self.x + 1, self.y + 1)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Axis-aligned tile-space rectangle: origin plus size. The rectangle covers
/// `[x, x + w) × [y, y + h)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct TileRect {
    #[cfg_attr(test, proptest(strategy = "-4096i32..4096"))]
    pub x: i32,
    #[cfg_attr(test, proptest(strategy = "-4096i32..4096"))]
    pub y: i32,
    #[cfg_attr(test, proptest(strategy = "-8i32..256"))]
    pub w: i32,
    #[cfg_attr(test, proptest(strategy = "-8i32..256"))]
    pub h: i32,
}

impl TileRect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive x bound, saturating at `i32::MAX`.
    #[inline]
    pub const fn max_x(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    #[inline]
    pub const fn max_y(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.w) * i64::from(self.h)
        }
    }

    #[inline]
    pub fn contains(&self, p: TilePos) -> bool {
        p.x >= self.x && p.x < self.max_x() && p.y >= self.y && p.y < self.max_y()
    }

    /// AABB clip: max of mins, min of maxes. Returns `None` unless the overlap
    /// has positive width and height.
    pub fn intersect(&self, other: &TileRect) -> Option<TileRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.max_x().min(other.max_x());
        let y1 = self.max_y().min(other.max_y());
        if x1 > x0 && y1 > y0 {
            Some(TileRect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0)))
        } else {
            None
        }
    }

    /// Tiles in scan order: `x` outer, `y` inner.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        let (x0, y0, x1, y1) = (self.x, self.y, self.max_x(), self.max_y());
        (x0..x1).flat_map(move |x| (y0..y1).map(move |y| TilePos::new(x, y)))
    }
}
