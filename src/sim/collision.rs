//! Collision checks between falling balls and the player
//!
//! Everything is axis-aligned: a ball only collides with the player while it
//! is inside the collision band at the bottom of the play area, and only the
//! horizontal spans are compared.

/// A horizontal extent `[left, right]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub left: f32,
    pub right: f32,
}

impl Span {
    #[inline]
    pub fn new(left: f32, width: f32) -> Self {
        Self {
            left,
            right: left + width,
        }
    }

    /// Strict overlap: spans that only touch at an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.right > other.left && self.left < other.right
    }
}

/// True once the ball's top `y` has reached the collision band
///
/// The band is one ball-height deep, sitting directly above the floor.
#[inline]
pub fn in_collision_band(y: f32, ball_size: f32, play_area_height: f32) -> bool {
    y + ball_size > play_area_height - ball_size
}

/// Next horizontal position for a drifting ball.
///
/// Returns the new `(x, speed)`. If moving would leave `[0, max_x]` the ball
/// stays put and its speed is negated instead.
#[inline]
pub fn drift(x: f32, speed: f32, max_x: f32) -> (f32, f32) {
    let next = x + speed;
    if (0.0..=max_x).contains(&next) {
        (next, speed)
    } else {
        (x, -speed)
    }
}
