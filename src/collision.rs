use vicsek_common::{angle_to_vec, Obstacle, Vec2};

/// Advances a particle one tick along `heading`, unless that would land it on the obstacle.
///
/// Freeze-on-hit: when the proposed position lies in the closed obstacle
/// rectangle the particle keeps `current` for this tick. The test uses the
/// unwrapped proposed position; wrapping happens afterwards.
#[inline(always)]
pub fn resolve(current: Vec2, heading: f64, speed: f64, timestep: f64, obstacle: &Obstacle) -> Vec2 {
    let proposed = current + angle_to_vec(heading) * speed * timestep;
    if obstacle.contains(proposed) {
        current
    } else {
        proposed
    }
}
