use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::math;
use crate::{CLAMP_EPSILON, NORMALIZE_EPSILON};

/// A 2D vector used for position, velocity, acceleration and force
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians from the +x axis.
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = math::sin_cos(angle);
        Self { x: cos, y: sin }
    }

    pub fn dot(&self, other: &Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(&self) -> f32 {
        math::sqrtf(self.dot(self))
    }

    pub fn distance(&self, other: &Vector2) -> f32 {
        (*self - *other).norm()
    }

    /// Returns the zero vector when the length is too small to carry a
    /// direction.
    pub fn normalize(&self) -> Self {
        let norm = self.norm();
        if norm > NORMALIZE_EPSILON {
            *self * (1.0 / norm)
        } else {
            Self::ZERO
        }
    }

    /// Rescales the vector so its length does not exceed `max`.
    pub fn clamp_norm(&self, max: f32) -> Self {
        let norm = self.norm();
        if norm > max {
            *self * (max / (norm + CLAMP_EPSILON))
        } else {
            *self
        }
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Div<f32> for Vector2 {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}
