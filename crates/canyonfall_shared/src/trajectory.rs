//! Landing-point prediction for ballistic projectiles.
//!
//! Every function is pure. "No landing" is `None`, never an error: callers
//! such as the landing marker hide themselves on `None`.

use glam::Vec3;

/// Simulation horizon used by [`landing_point_with_drag`] callers that have no
/// better bound.
pub const DEFAULT_MAX_TIME: f32 = 60.0;
/// Euler step used by [`landing_point_with_drag`] callers by default.
pub const DEFAULT_TIME_STEP: f32 = 0.01;
/// Upper bound on Euler steps per simulation; tinier steps are widened so
/// the whole `max_time` horizon still fits.
pub const MAX_SIMULATION_STEPS: u32 = 1_000_000;

/// Larger root of `0.5 * g * t^2 + v * t + (y0 - ground) = 0`.
fn larger_root(start_y: f32, velocity_y: f32, gravity_y: f32, ground: f32) -> Option<f32> {
    let a = 0.5 * gravity_y;
    let b = velocity_y;
    let c = start_y - ground;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t1 = (-b + sqrt_d) / (2.0 * a);
    let t2 = (-b - sqrt_d) / (2.0 * a);
    let t = t1.max(t2);
    (t >= 0.0).then_some(t)
}

/// Flight time until the projectile reaches `ground`, without drag.
pub fn time_to_land(start: Vec3, velocity: Vec3, gravity: Vec3, ground: f32) -> Option<f32> {
    if gravity.y >= 0.0 {
        return None;
    }
    larger_root(start.y, velocity.y, gravity.y, ground)
}

/// Where the projectile crosses `ground`, without drag. The returned point
/// has `y == ground`.
pub fn landing_point(start: Vec3, velocity: Vec3, gravity: Vec3, ground: f32) -> Option<Vec3> {
    let t = time_to_land(start, velocity, gravity, ground)?;
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    let mut point = start + horizontal * t;
    point.y = ground;
    Some(point)
}

/// Per-frame variant of [`landing_point`] taking only the vertical gravity
/// component. Assumes `gravity_y < 0`; with downward gravity it returns the
/// same point as [`landing_point`].
pub fn landing_point_fast(start: Vec3, velocity: Vec3, gravity_y: f32, ground: f32) -> Option<Vec3> {
    let t = larger_root(start.y, velocity.y, gravity_y, ground)?;
    Some(Vec3::new(
        start.x + velocity.x * t,
        ground,
        start.z + velocity.z * t,
    ))
}

/// One explicit Euler step with linear drag: damp, accelerate, move.
pub fn euler_step(position: Vec3, velocity: Vec3, drag: f32, gravity: Vec3, dt: f32) -> (Vec3, Vec3) {
    let velocity = velocity * (1.0 - drag * dt) + gravity * dt;
    (position + velocity * dt, velocity)
}

/// Simulates the flight with linear drag and returns the interpolated point
/// where it first crosses `ground`.
///
/// `None` when `max_time` runs out first, when `time_step` is not positive,
/// or as soon as the projectile is rising (or hovering) with no downward
/// gravity to bring it back. Runs at most [`MAX_SIMULATION_STEPS`] steps.
pub fn landing_point_with_drag(
    start: Vec3,
    velocity: Vec3,
    drag: f32,
    gravity: Vec3,
    ground: f32,
    max_time: f32,
    time_step: f32,
) -> Option<Vec3> {
    if !(time_step > 0.0) || !(max_time > 0.0) || !max_time.is_finite() {
        return None;
    }

    let time_step = time_step.max(max_time / MAX_SIMULATION_STEPS as f32);
    let steps = ((max_time / time_step).ceil() as u32).min(MAX_SIMULATION_STEPS);
    let mut position = start;
    let mut velocity = velocity;

    for _ in 0..steps {
        let previous = position;
        (position, velocity) = euler_step(position, velocity, drag, gravity, time_step);

        if position.y <= ground {
            let fall = previous.y - position.y;
            let t = if fall > f32::EPSILON {
                ((previous.y - ground) / fall).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let mut point = previous.lerp(position, t);
            point.y = ground;
            return Some(point);
        }

        if gravity.y >= 0.0 && velocity.y >= 0.0 {
            return None;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{
        landing_point, landing_point_fast, landing_point_with_drag, time_to_land,
        DEFAULT_MAX_TIME, DEFAULT_TIME_STEP, MAX_SIMULATION_STEPS,
    };

    const G: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    #[test]
    fn horizontal_throw_lands_at_the_analytic_distance() {
        let point = landing_point(Vec3::new(0.0, 10.0, 0.0), Vec3::new(5.0, 0.0, 0.0), G, 0.0)
            .expect("falls");
        let expected = 5.0 * (2.0_f32 * 10.0 / 9.81).sqrt();
        assert!((point.x - expected).abs() < 1e-4);
        assert!((point.x - 7.14).abs() < 0.01);
        assert_eq!(point.y, 0.0);
        assert_eq!(point.z, 0.0);
    }

    #[test]
    fn no_downward_gravity_never_lands() {
        let start = Vec3::new(0.0, 10.0, 0.0);
        let velocity = Vec3::new(1.0, -1.0, 0.0);
        assert!(landing_point(start, velocity, Vec3::ZERO, 0.0).is_none());
        assert!(time_to_land(start, velocity, Vec3::ZERO, 0.0).is_none());
        assert!(landing_point(start, velocity, Vec3::new(0.0, 9.81, 0.0), 0.0).is_none());
    }

    #[test]
    fn below_ground_heading_down_has_no_negative_time() {
        let start = Vec3::new(0.0, -5.0, 0.0);
        let velocity = Vec3::new(2.0, -3.0, 0.0);
        if let Some(t) = time_to_land(start, velocity, G, 0.0) {
            assert!(t >= 0.0);
        }
        assert!(landing_point(start, velocity, G, 0.0).is_none());
    }

    #[test]
    fn ground_above_apex_is_unreachable() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let velocity = Vec3::new(0.0, 1.0, 0.0);
        assert!(landing_point(start, velocity, G, 100.0).is_none());
    }

    #[test]
    fn upward_throw_takes_the_later_root() {
        let start = Vec3::ZERO;
        let velocity = Vec3::new(3.0, 9.81, -1.0);
        let t = time_to_land(start, velocity, G, 0.0).expect("lands");
        assert!((t - 2.0).abs() < 1e-4);
        let point = landing_point(start, velocity, G, 0.0).expect("lands");
        assert!((point.x - 6.0).abs() < 1e-3);
        assert!((point.z + 2.0).abs() < 1e-3);
    }

    #[test]
    fn fast_variant_agrees_with_the_checked_one() {
        let cases = [
            (Vec3::new(0.0, 10.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 0.0),
            (Vec3::new(3.0, 40.0, -2.0), Vec3::new(-4.0, 12.0, 7.0), 5.0),
            (Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -20.0, 1.0), -3.0),
        ];
        for (start, velocity, ground) in cases {
            let checked = landing_point(start, velocity, G, ground).expect("lands");
            let fast = landing_point_fast(start, velocity, G.y, ground).expect("lands");
            assert!((checked - fast).length() < 1e-5);
        }
    }

    #[test]
    fn dragless_simulation_matches_closed_form() {
        let cases = [
            (Vec3::new(0.0, 10.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 0.0),
            (Vec3::new(-2.0, 50.0, 4.0), Vec3::new(10.0, 15.0, -3.0), 0.0),
            (Vec3::new(0.0, 30.0, 0.0), Vec3::new(0.0, -4.0, 8.0), 12.0),
        ];
        for (start, velocity, ground) in cases {
            let exact = landing_point(start, velocity, G, ground).expect("lands");
            let simulated = landing_point_with_drag(
                start,
                velocity,
                0.0,
                G,
                ground,
                DEFAULT_MAX_TIME,
                DEFAULT_TIME_STEP,
            )
            .expect("lands");
            let fall = start.y - ground;
            assert_eq!(simulated.y, ground);
            assert!(
                (exact - simulated).length() <= 0.01 * fall,
                "exact {exact:?} simulated {simulated:?}"
            );
        }
    }

    #[test]
    fn drag_shortens_the_flight() {
        let start = Vec3::new(0.0, 20.0, 0.0);
        let velocity = Vec3::new(20.0, 5.0, 0.0);
        let free = landing_point_with_drag(start, velocity, 0.0, G, 0.0, 60.0, 0.01).expect("lands");
        let dragged = landing_point_with_drag(start, velocity, 0.5, G, 0.0, 60.0, 0.01).expect("lands");
        assert!(dragged.x < free.x);
    }

    #[test]
    fn simulation_gives_up_without_a_landing() {
        let start = Vec3::new(0.0, 10.0, 0.0);
        assert!(landing_point_with_drag(start, Vec3::Y, 0.0, Vec3::ZERO, 0.0, 60.0, 0.01).is_none());
        assert!(landing_point_with_drag(start, Vec3::ZERO, 0.0, G, 0.0, 0.5, 0.01).is_none());
        assert!(landing_point_with_drag(start, Vec3::ZERO, 0.0, G, 0.0, 60.0, 0.0).is_none());
    }

    #[test]
    fn subnormal_time_step_stays_bounded() {
        let tiny = f32::from_bits(1);
        let start = Vec3::new(0.0, 1.0, 0.0);

        let point = landing_point_with_drag(start, Vec3::X, 0.0, G, 0.0, 1.0, tiny).expect("lands");
        let exact = landing_point(start, Vec3::X, G, 0.0).expect("lands");
        assert!((point.x - exact.x).abs() < 0.05, "simulated {point:?} exact {exact:?}");
        assert_eq!(point.y, 0.0);

        let high = Vec3::new(0.0, 100.0, 0.0);
        assert!(landing_point_with_drag(high, Vec3::ZERO, 0.0, G, 0.0, 1.0, tiny).is_none());
        assert!(landing_point_with_drag(start, Vec3::ZERO, 0.0, G, 0.0, f32::INFINITY, 0.01).is_none());
        assert!(MAX_SIMULATION_STEPS as f32 * DEFAULT_TIME_STEP > DEFAULT_MAX_TIME);
    }
}
