use vicsek_common::Vec2;

/// Reduces one coordinate into `[0, box_size)`.
///
/// `rem_euclid` can round a tiny negative value up to exactly `box_size`;
/// that case maps to 0 so the result stays in the half-open range.
#[inline(always)]
pub fn wrap_coordinate(value: f64, box_size: f64) -> f64 {
    let wrapped = value.rem_euclid(box_size);
    if wrapped >= box_size {
        0.0
    } else {
        wrapped
    }
}

/// Periodic (toroidal) boundary: maps a position back into the box on both axes.
#[inline(always)]
pub fn wrap(pos: Vec2, box_size: f64) -> Vec2 {
    Vec2::new(wrap_coordinate(pos.x, box_size), wrap_coordinate(pos.y, box_size))
}
