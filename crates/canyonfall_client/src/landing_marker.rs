use canyonfall_shared::projectile::BallisticProjectile;
use canyonfall_shared::trajectory::{
    landing_point_fast, landing_point_with_drag, DEFAULT_MAX_TIME, DEFAULT_TIME_STEP,
};
use glam::Vec3;

pub const STANDARD_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingMarkerSettings {
    /// Seconds between recomputations; `0` recomputes on every update.
    pub update_interval: f32,
    pub ground_level: f32,
    /// Linear drag; when set the landing point is simulated instead of solved.
    pub drag: Option<f32>,
    pub gravity: Vec3,
}

impl Default for LandingMarkerSettings {
    fn default() -> Self {
        Self {
            update_interval: 0.1,
            ground_level: 0.0,
            drag: None,
            gravity: STANDARD_GRAVITY,
        }
    }
}

/// Aiming marker that follows a projectile's predicted landing point.
///
/// When no landing exists the marker hides but remembers the last point it
/// showed.
#[derive(Debug, Clone)]
pub struct LandingMarker {
    settings: LandingMarkerSettings,
    position: Vec3,
    velocity: Vec3,
    since_update: f32,
    last_landing: Option<Vec3>,
    visible: bool,
}

impl LandingMarker {
    pub fn new(settings: LandingMarkerSettings) -> Self {
        Self {
            since_update: settings.update_interval.max(0.0),
            settings,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            last_landing: None,
            visible: false,
        }
    }

    pub fn set_projectile_state(&mut self, position: Vec3, velocity: Vec3) {
        self.position = position;
        self.velocity = velocity;
        if self.settings.update_interval <= 0.0 {
            self.force_update();
        }
    }

    pub fn track(&mut self, projectile: &BallisticProjectile) {
        self.set_projectile_state(projectile.position, projectile.velocity);
    }

    /// Advances the marker clock by `dt` and recomputes once the interval
    /// has elapsed.
    pub fn update(&mut self, dt: f32) {
        self.since_update += dt.max(0.0);
        if self.since_update >= self.settings.update_interval {
            self.force_update();
        }
    }

    pub fn force_update(&mut self) {
        self.since_update = 0.0;
        let landing = match self.settings.drag {
            Some(drag) if drag > 0.0 => landing_point_with_drag(
                self.position,
                self.velocity,
                drag,
                self.settings.gravity,
                self.settings.ground_level,
                DEFAULT_MAX_TIME,
                DEFAULT_TIME_STEP,
            ),
            _ if self.settings.gravity.y < 0.0 => landing_point_fast(
                self.position,
                self.velocity,
                self.settings.gravity.y,
                self.settings.ground_level,
            ),
            _ => None,
        };

        self.visible = landing.is_some();
        if landing.is_some() {
            self.last_landing = landing;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Most recent valid landing point, kept while the marker is hidden.
    pub fn landing_point(&self) -> Option<Vec3> {
        self.last_landing
    }
}
