use glam::Vec3;

use sumo_core::input::DirectionalInput;

use crate::config::PhysicsConfig;
use crate::fighter::Fighter;

/// Clamp a host frame time into `[0, max_dt]`. Non-finite or negative steps become zero.
pub fn sanitize_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        if dt != 0.0 {
            tracing::debug!(dt, "Discarded invalid frame time");
        }
        return 0.0;
    }
    dt.min(max_dt)
}

/// Height of the platform surface under `fighter` this frame, or `None` when
/// the fighter is past the rim or a sinkhole removed the floor.
fn floor_height(fighter: &Fighter, platform_radius: f32) -> Option<f32> {
    if fighter.surface.floorless || fighter.distance_from_center() > platform_radius {
        return None;
    }
    Some(fighter.radius - fighter.surface.floor_drop)
}

/// Advance one fighter by `dt` seconds from held input, gravity, drag, and friction.
pub fn integrate(
    fighter: &mut Fighter,
    input: DirectionalInput,
    dt: f32,
    platform_radius: f32,
    config: &PhysicsConfig,
) {
    if !fighter.alive || dt <= 0.0 {
        return;
    }

    let mut force = Vec3::new(0.0, -fighter.mass * config.gravity, 0.0);

    let (ax, az) = input.axis();
    let mut drive = Vec3::new(ax, 0.0, az).normalize_or_zero() * fighter.move_force;
    if fighter.hitstun > 0.0 {
        drive *= config.hitstun_input_multiplier;
    }
    force += drive;

    let acceleration = force / fighter.mass;
    let mut velocity = (fighter.velocity + acceleration * dt) * config.air_resistance;

    let floor = floor_height(fighter, platform_radius);
    let grounded = floor.is_some_and(|h| {
        let y = fighter.position.y;
        y <= h + config.ground_epsilon && y >= h - fighter.radius
    });

    if grounded {
        let loss = if fighter.surface.on_ice {
            fighter.surface.ice_friction
        } else {
            config.ground_friction
        };
        let keep = (1.0 - loss).clamp(0.0, 1.0);
        velocity.x *= keep;
        velocity.z *= keep;
    }

    discard_non_finite(fighter, &mut velocity);

    let mut position = fighter.position + velocity * dt;
    for axis in 0..3 {
        if !position[axis].is_finite() {
            position[axis] = fighter.position[axis];
            velocity[axis] = 0.0;
        }
    }

    if grounded
        && let Some(h) = floor
        && position.y <= h
    {
        position.y = h;
        if velocity.y < 0.0 {
            let bounce = -velocity.y * config.restitution;
            velocity.y = if bounce < config.rest_speed { 0.0 } else { bounce };
        }
    }

    let horizontal_speed = Vec3::new(velocity.x, 0.0, velocity.z).length();
    fighter.roll_angle = (fighter.roll_angle + horizontal_speed * dt / fighter.radius)
        % std::f32::consts::TAU;

    fighter.position = position;
    fighter.velocity = velocity;
    fighter.on_ground = grounded;
    fighter.hitstun = (fighter.hitstun - dt).max(0.0);
}

fn discard_non_finite(fighter: &Fighter, velocity: &mut Vec3) {
    for axis in 0..3 {
        if !velocity[axis].is_finite() {
            tracing::debug!(
                player_id = fighter.id,
                axis,
                "Discarded non-finite velocity component"
            );
            velocity[axis] = 0.0;
        }
    }
}
