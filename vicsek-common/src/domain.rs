use crate::vecmath::Vec2;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangular obstacle that particles cannot move into.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Obstacle {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Obstacle { x_min, x_max, y_min, y_max }
    }

    /// True if `pos` lies in the closed rectangle (edges included).
    #[inline(always)]
    pub fn contains(&self, pos: Vec2) -> bool {
        self.x_min <= pos.x && pos.x <= self.x_max && self.y_min <= pos.y && pos.y <= self.y_max
    }

    /// True if `pos` lies strictly inside the rectangle (edges excluded).
    #[inline(always)]
    pub fn interior_contains(&self, pos: Vec2) -> bool {
        self.x_min < pos.x && pos.x < self.x_max && self.y_min < pos.y && pos.y < self.y_max
    }

    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }

    /// True if the rectangle leaves no free area inside a square box of side `box_size`.
    pub fn covers_box(&self, box_size: f64) -> bool {
        self.x_min <= 0.0 && self.x_max >= box_size && self.y_min <= 0.0 && self.y_max >= box_size
    }
}

/// Static description of a simulation: the box, the particles and the obstacle.
///
/// A `Domain` can only be obtained through [`Domain::new`], which rejects
/// invalid combinations, so every accessor returns validated values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    box_size: f64,
    particle_count: usize,
    interaction_radius: f64,
    speed: f64,
    timestep: f64,
    noise_amplitude: f64,
    obstacle: Obstacle,
}

impl Domain {
    pub fn new(
        box_size: f64,
        particle_count: usize,
        interaction_radius: f64,
        speed: f64,
        timestep: f64,
        noise_amplitude: f64,
        obstacle: Obstacle,
    ) -> Result<Self> {
        let scalars = [
            ("box_size", box_size),
            ("interaction_radius", interaction_radius),
            ("speed", speed),
            ("timestep", timestep),
            ("noise_amplitude", noise_amplitude),
            ("obstacle.x_min", obstacle.x_min),
            ("obstacle.x_max", obstacle.x_max),
            ("obstacle.y_min", obstacle.y_min),
            ("obstacle.y_max", obstacle.y_max),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                anyhow::bail!("{} must be finite (got {}).", name, value);
            }
        }

        if box_size <= 0.0 {
            anyhow::bail!("box_size must be positive (got {}).", box_size);
        }
        if particle_count == 0 {
            anyhow::bail!("particle_count must be greater than 0.");
        }
        if interaction_radius <= 0.0 {
            anyhow::bail!("interaction_radius must be positive (got {}).", interaction_radius);
        }
        if timestep <= 0.0 {
            anyhow::bail!("timestep must be positive (got {}).", timestep);
        }
        if speed < 0.0 {
            anyhow::bail!("speed must not be negative (got {}).", speed);
        }
        if noise_amplitude < 0.0 {
            anyhow::bail!("noise_amplitude must not be negative (got {}).", noise_amplitude);
        }

        if obstacle.x_min >= obstacle.x_max {
            anyhow::bail!(
                "Obstacle is degenerate: x_min ({}) must be less than x_max ({}).",
                obstacle.x_min,
                obstacle.x_max
            );
        }
        if obstacle.y_min >= obstacle.y_max {
            anyhow::bail!(
                "Obstacle is degenerate: y_min ({}) must be less than y_max ({}).",
                obstacle.y_min,
                obstacle.y_max
            );
        }
        if obstacle.x_min < 0.0
            || obstacle.y_min < 0.0
            || obstacle.x_max > box_size
            || obstacle.y_max > box_size
        {
            anyhow::bail!(
                "Obstacle [{}, {}] x [{}, {}] exceeds the box [0, {}].",
                obstacle.x_min,
                obstacle.x_max,
                obstacle.y_min,
                obstacle.y_max,
                box_size
            );
        }

        Ok(Domain {
            box_size,
            particle_count,
            interaction_radius,
            speed,
            timestep,
            noise_amplitude,
            obstacle,
        })
    }

    pub fn box_size(&self) -> f64 {
        self.box_size
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn noise_amplitude(&self) -> f64 {
        self.noise_amplitude
    }

    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    /// Distance a particle covers in one unobstructed tick.
    pub fn step_length(&self) -> f64 {
        self.speed * self.timestep
    }

    /// Area of the box not covered by the obstacle.
    pub fn free_area(&self) -> f64 {
        self.box_size * self.box_size - self.obstacle.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obstacle() -> Obstacle {
        Obstacle::new(3.0, 7.0, 3.0, 7.0)
    }

    fn build(box_size: f64, count: usize, radius: f64, timestep: f64, obstacle: Obstacle) -> Result<Domain> {
        Domain::new(box_size, count, radius, 0.5, timestep, 0.15, obstacle)
    }

    #[test]
    fn accepts_reference_parameters() {
        let domain = build(10.0, 100, 1.0, 1.0, obstacle()).unwrap();
        assert_eq!(domain.particle_count(), 100);
        assert_eq!(domain.step_length(), 0.5);
        assert_eq!(domain.free_area(), 84.0);
    }

    #[test]
    fn rejects_non_positive_scalars() {
        assert!(build(0.0, 10, 1.0, 1.0, obstacle()).is_err());
        assert!(build(10.0, 0, 1.0, 1.0, obstacle()).is_err());
        assert!(build(10.0, 10, 0.0, 1.0, obstacle()).is_err());
        assert!(build(10.0, 10, 1.0, -1.0, obstacle()).is_err());
        assert!(Domain::new(10.0, 10, 1.0, -0.5, 1.0, 0.1, obstacle()).is_err());
        assert!(Domain::new(10.0, 10, 1.0, 0.5, 1.0, -0.1, obstacle()).is_err());
        assert!(Domain::new(10.0, 10, f64::NAN, 0.5, 1.0, 0.1, obstacle()).is_err());
    }

    #[test]
    fn interior_excludes_edges() {
        let o = obstacle();
        assert!(o.contains(Vec2::new(3.0, 5.0)));
        assert!(!o.interior_contains(Vec2::new(3.0, 5.0)));
        assert!(o.interior_contains(Vec2::new(3.001, 6.999)));
        assert!(!o.interior_contains(Vec2::new(2.99, 5.0)));
    }

    #[test]
    fn rejects_degenerate_obstacle() {
        let err = build(10.0, 10, 1.0, 1.0, Obstacle::new(7.0, 3.0, 3.0, 7.0)).unwrap_err();
        assert!(err.to_string().contains("x_min"), "unexpected message: {}", err);
        let err = build(10.0, 10, 1.0, 1.0, Obstacle::new(3.0, 7.0, 5.0, 5.0)).unwrap_err();
        assert!(err.to_string().contains("y_min"), "unexpected message: {}", err);
    }

    #[test]
    fn rejects_obstacle_outside_box() {
        let err = build(10.0, 10, 1.0, 1.0, Obstacle::new(3.0, 11.0, 3.0, 7.0)).unwrap_err();
        assert!(err.to_string().contains("exceeds the box"));
        assert!(build(10.0, 10, 1.0, 1.0, Obstacle::new(-1.0, 7.0, 3.0, 7.0)).is_err());
        // Touching the box edge is allowed.
        assert!(build(10.0, 10, 1.0, 1.0, Obstacle::new(0.0, 10.0, 3.0, 7.0)).is_ok());
    }

    #[test]
    fn obstacle_contains_is_closed() {
        let o = obstacle();
        assert!(o.contains(Vec2::new(3.0, 3.0)));
        assert!(o.contains(Vec2::new(7.0, 5.0)));
        assert!(o.contains(Vec2::new(5.0, 5.0)));
        assert!(!o.contains(Vec2::new(2.999, 5.0)));
        assert!(!o.contains(Vec2::new(5.0, 7.001)));
    }

    #[test]
    fn covers_box_only_when_full() {
        assert!(Obstacle::new(0.0, 10.0, 0.0, 10.0).covers_box(10.0));
        assert!(!Obstacle::new(0.0, 10.0, 0.0, 9.5).covers_box(10.0));
    }
}
