use rand::Rng;
use std::f64::consts::PI;

/// Vicsek heading update: mean neighbor heading plus uniform angular noise.
///
/// The mean is the arithmetic mean of the raw angles, not a circular mean, so
/// headings on both sides of +-pi average towards 0 (e.g. 3.13 and -3.13 give
/// ~0 instead of ~pi). The result is not wrapped back into (-pi, pi].
/// With no neighbors the current heading is returned unchanged and no noise is
/// drawn.
pub fn next_heading<R: Rng + ?Sized>(
    neighbor_headings: &[f64],
    current_heading: f64,
    noise_amplitude: f64,
    rng: &mut R,
) -> f64 {
    if neighbor_headings.is_empty() {
        return current_heading;
    }
    let average_heading = neighbor_headings.iter().sum::<f64>() / neighbor_headings.len() as f64;
    let noise = noise_amplitude * rng.random_range(-PI..=PI);
    average_heading + noise
}
