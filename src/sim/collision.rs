//! Collision tests
//!
//! Axis-aligned rectangles for bird vs pipe, circles for coin pickup.

use glam::Vec2;

use super::state::{Bird, Coin, Pipe};
use crate::consts::BIRD_PICKUP_RADIUS;

/// Open-interval overlap of two horizontal spans
#[inline]
pub fn spans_overlap(a_left: f32, a_right: f32, b_left: f32, b_right: f32) -> bool {
    a_right > b_left && a_left < b_right
}

/// The bird hits a pipe when it overlaps the pipe horizontally and pokes
/// above the gap top or below the gap bottom.
pub fn bird_pipe_collision(bird: &Bird, pipe: &Pipe) -> bool {
    if !spans_overlap(bird.left(), bird.right(), pipe.x, pipe.right()) {
        return false;
    }
    bird.top() < pipe.top_height || bird.bottom() > pipe.gap_bottom()
}

/// Circles touch only when the centre distance is strictly less than the
/// summed radii.
#[inline]
pub fn circles_touch(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

/// Whether the bird is close enough to pick up a coin
pub fn bird_coin_pickup(bird: &Bird, coin: &Coin) -> bool {
    !coin.collected && circles_touch(bird.center(), BIRD_PICKUP_RADIUS, coin.pos, coin.radius)
}
