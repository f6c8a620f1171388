//! Synthetic movement for the demo client

use rand::Rng;
use shared::Position;

pub const WORLD_HALF_EXTENT: f32 = 100.0;
pub const MAX_STEP: f32 = 1.5;

/// Bounded random walk on the ground plane
pub struct RandomWalk {
    position: Position,
    max_step: f32,
}

impl RandomWalk {
    pub fn new(start: Position) -> Self {
        Self {
            position: clamp(start),
            max_step: MAX_STEP,
        }
    }

    /// Starts somewhere random inside the world bounds
    pub fn random_start() -> Self {
        let mut rng = rand::thread_rng();
        Self::new(Position::new(
            rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
            0.0,
            rng.gen_range(-WORLD_HALF_EXTENT..WORLD_HALF_EXTENT),
        ))
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn step(&mut self) -> Position {
        let mut rng = rand::thread_rng();
        self.step_with(&mut rng)
    }

    pub fn step_with<R: Rng>(&mut self, rng: &mut R) -> Position {
        let next = Position::new(
            self.position.x + rng.gen_range(-self.max_step..=self.max_step),
            self.position.y,
            self.position.z + rng.gen_range(-self.max_step..=self.max_step),
        );
        self.position = clamp(next);
        self.position
    }
}

fn clamp(position: Position) -> Position {
    Position::new(
        position.x.clamp(-WORLD_HALF_EXTENT, WORLD_HALF_EXTENT),
        position.y,
        position.z.clamp(-WORLD_HALF_EXTENT, WORLD_HALF_EXTENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_start_is_clamped() {
        let walk = RandomWalk::new(Position::new(500.0, 3.0, -500.0));
        assert_approx_eq!(walk.position().x, WORLD_HALF_EXTENT);
        assert_approx_eq!(walk.position().y, 3.0);
        assert_approx_eq!(walk.position().z, -WORLD_HALF_EXTENT);
    }

    #[test]
    fn test_steps_are_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut walk = RandomWalk::new(Position::default());

        for _ in 0..1000 {
            let before = walk.position();
            let after = walk.step_with(&mut rng);

            assert!((after.x - before.x).abs() <= MAX_STEP + f32::EPSILON);
            assert!((after.z - before.z).abs() <= MAX_STEP + f32::EPSILON);
            assert!(after.x.abs() <= WORLD_HALF_EXTENT);
            assert!(after.z.abs() <= WORLD_HALF_EXTENT);
            assert_approx_eq!(after.y, 0.0);
        }
    }

    #[test]
    fn test_random_start_in_bounds() {
        for _ in 0..100 {
            let p = RandomWalk::random_start().position();
            assert!(p.x.abs() <= WORLD_HALF_EXTENT);
            assert!(p.z.abs() <= WORLD_HALF_EXTENT);
        }
    }
}
