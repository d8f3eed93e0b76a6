//! Geometry shared by the world core and its host.
//!
//! World space is 2D screen space: x grows to the right, y grows downward,
//! and every object is positioned by its top-left corner.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - positions and sizes in world pixels
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Square of side `side`.
    #[must_use]
    pub const fn splat(side: f32) -> Self {
        Self::new(side, side)
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Inclusive horizontal range `[min, max]` in world pixels.
///
/// Used for viewport bounds, eviction ranges and terrain coverage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Leftmost x (inclusive).
    pub min: i32,
    /// Rightmost x (inclusive).
    pub max: i32,
}

impl Span {
    /// Creates a span, swapping the ends if they arrive reversed.
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Span starting at `left` covering `width` pixels (`[left, left + width]`).
    #[must_use]
    pub const fn from_left(left: i32, width: i32) -> Self {
        Self::new(left, left + width)
    }

    /// Returns true if `x` lies inside the span.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i32) -> bool {
        x >= self.min && x <= self.max
    }

    /// `max - min`.
    #[inline]
    #[must_use]
    pub const fn width(self) -> i32 {
        self.max - self.min
    }

    /// Grows the span by `margin` on both sides.
    #[must_use]
    pub const fn widen(self, margin: i32) -> Self {
        Self::new(self.min - margin, self.max + margin)
    }

    /// Shifts the span by `dx`.
    #[must_use]
    pub const fn shifted(self, dx: i32) -> Self {
        Self::new(self.min + dx, self.max + dx)
    }
}
