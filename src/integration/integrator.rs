use crate::common::Settings;
use crate::objects::PhysicsObject;

/// Integrates the body's state forward in time using Semi-Implicit Euler.
pub fn integrate(object: &mut PhysicsObject, settings: &Settings, dt: f32) {
    if object.is_static() {
        // Static object, do not integrate
        return;
    }

    let keep = 1.0 - settings.damping;

    // --- Linear Motion --- //
    let linear_acceleration = object.acceleration + settings.gravity.acceleration_at(object.position);
    object.velocity += linear_acceleration * dt;
    object.velocity *= keep;
    object.position += object.velocity * dt;

    // --- Angular Motion --- //
    object.angular_velocity *= keep;
    object.angle = wrap_angle(object.angle + object.angular_velocity * dt);

    object.update_bounding_box();
}

/// Integrates the body unless it was already integrated during `tick`.
/// Bodies spanning several leaves are visited once per leaf, so the stamp
/// keeps them from moving more than once per tick. Returns true if the body
/// was integrated.
pub fn integrate_once(object: &mut PhysicsObject, settings: &Settings, dt: f32, tick: u64) -> bool {
    if object.last_update == tick {
        return false;
    }
    object.last_update = tick;
    integrate(object, settings, dt);
    true
}

/// Wraps an angle in radians to the range [-PI, PI].
fn wrap_angle(angle: f32) -> f32 {
    angle.sin().atan2(angle.cos())
}
