use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::trajectory::{
    euler_step, landing_point, landing_point_with_drag, DEFAULT_MAX_TIME, DEFAULT_TIME_STEP,
};

/// Kinematic state of a fired projectile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BallisticProjectile {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Linear drag coefficient, `0` for a vacuum.
    pub drag: f32,
    pub elapsed: f32,
}

impl BallisticProjectile {
    pub fn new(position: Vec3, velocity: Vec3, drag: f32) -> Self {
        Self {
            position,
            velocity,
            drag: drag.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Moves the projectile forward by `dt` seconds with the same step the
    /// drag solver uses. Non-positive `dt` is ignored.
    pub fn advance(&mut self, dt: f32, gravity: Vec3) {
        if dt <= 0.0 {
            return;
        }
        (self.position, self.velocity) =
            euler_step(self.position, self.velocity, self.drag, gravity, dt);
        self.elapsed += dt;
    }

    pub fn is_below(&self, ground: f32) -> bool {
        self.position.y <= ground
    }

    /// Landing point from the current state, closed form without drag and
    /// simulated with it.
    pub fn predicted_landing(&self, gravity: Vec3, ground: f32) -> Option<Vec3> {
        if self.drag > 0.0 {
            landing_point_with_drag(
                self.position,
                self.velocity,
                self.drag,
                gravity,
                ground,
                DEFAULT_MAX_TIME,
                DEFAULT_TIME_STEP,
            )
        } else {
            landing_point(self.position, self.velocity, gravity, ground)
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::BallisticProjectile;
    use crate::trajectory::DEFAULT_TIME_STEP;

    const G: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    #[test]
    fn stepping_reaches_the_predicted_landing() {
        let mut projectile =
            BallisticProjectile::new(Vec3::new(0.0, 25.0, 0.0), Vec3::new(8.0, 4.0, 2.0), 0.0);
        let predicted = projectile.predicted_landing(G, 0.0).expect("lands");

        while !projectile.is_below(0.0) {
            projectile.advance(DEFAULT_TIME_STEP, G);
            assert!(projectile.elapsed < 60.0);
        }
        let horizontal = Vec3::new(projectile.position.x, 0.0, projectile.position.z);
        assert!((horizontal - predicted).length() < 0.25);
    }

    #[test]
    fn drag_bleeds_speed() {
        let mut projectile = BallisticProjectile::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0);
        projectile.advance(0.1, Vec3::ZERO);
        assert!((projectile.velocity.x - 9.0).abs() < 1e-5);
        assert!((projectile.position.x - 0.9).abs() < 1e-5);
    }

    #[test]
    fn zero_step_is_ignored() {
        let mut projectile = BallisticProjectile::new(Vec3::Y, Vec3::X, -2.0);
        assert_eq!(projectile.drag, 0.0);
        projectile.advance(0.0, G);
        projectile.advance(-1.0, G);
        assert_eq!(projectile.position, Vec3::Y);
        assert_eq!(projectile.elapsed, 0.0);
    }

    #[test]
    fn dragged_prediction_uses_the_simulation() {
        let projectile =
            BallisticProjectile::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(10.0, 0.0, 0.0), 0.8);
        let vacuum = BallisticProjectile { drag: 0.0, ..projectile };
        let dragged = projectile.predicted_landing(G, 0.0).expect("lands");
        let free = vacuum.predicted_landing(G, 0.0).expect("lands");
        assert!(dragged.x < free.x);
    }
}
