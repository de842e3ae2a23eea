//! Impulse resolution with positional separation and Coulomb friction.

use tracing::trace;

use crate::collision::border::Border;
use crate::collision::contacts::{border_contact_points, find_contact_points};
use crate::collision::info::CollisionInfo;
use crate::common::Settings;
use crate::math::vec2::Vec2;
use crate::objects::PhysicsObject;

/// Separates two colliding bodies and applies restitution and friction impulses.
pub fn solve_collision(a: &mut PhysicsObject, b: &mut PhysicsObject, info: &CollisionInfo) {
    if !info.has_collision() || (a.is_static() && b.is_static()) {
        return;
    }

    separate(a, b, info);

    let contacts = find_contact_points(a, b, info);
    if contacts.is_empty() {
        trace!(a = %a.id(), b = %b.id(), "no contact points after separation");
        return;
    }

    let restitution = a.material().combined_restitution(b.material());
    let (static_friction, dynamic_friction) = a.material().combined_friction(b.material());
    apply_impulses(
        a,
        Some(b),
        info.normal,
        &contacts,
        restitution,
        static_friction,
        dynamic_friction,
    );
}

/// Moves the bodies apart along the normal: half each, or all of it for the
/// only dynamic one.
fn separate(a: &mut PhysicsObject, b: &mut PhysicsObject, info: &CollisionInfo) {
    let correction = info.normal * info.depth;
    match (a.is_static(), b.is_static()) {
        (false, false) => {
            a.position -= correction * 0.5;
            b.position += correction * 0.5;
        }
        (false, true) => a.position -= correction,
        (true, false) => b.position += correction,
        (true, true) => return,
    }
    a.update_bounding_box();
    b.update_bounding_box();
}

/// Keeps a body inside the world, bouncing it off every edge it crossed.
pub fn handle_border_collisions(object: &mut PhysicsObject, border: &Border, settings: &Settings) {
    if object.is_static() {
        return;
    }
    let border_material = settings.border_material();
    for edge in &border.edges {
        let info = edge.test_collision(object);
        if !info.has_collision() {
            continue;
        }

        object.position -= edge.normal * info.depth;
        object.update_bounding_box();

        let contacts = border_contact_points(object, edge);
        if contacts.is_empty() {
            continue;
        }
        let restitution = object.material().combined_restitution(&border_material);
        let (static_friction, dynamic_friction) = object.material().combined_friction(&border_material);
        apply_impulses(
            object,
            None,
            edge.normal,
            &contacts,
            restitution,
            static_friction,
            dynamic_friction,
        );
    }
}

/// Velocity of a point on the body, including the spin contribution.
fn velocity_at(object: &PhysicsObject, r: Vec2) -> Vec2 {
    object.velocity + r.cross_scalar(object.angular_velocity)
}

/// Inverse mass and inverse inertia of a body, zero for an immovable one.
fn inverse_mass(object: Option<&PhysicsObject>) -> (f32, f32) {
    object.map_or((0.0, 0.0), |o| (o.inv_mass(), o.inv_inertia()))
}

/// Applies the normal and friction impulse at every contact. `b == None`
/// stands for an immovable body at rest, such as a border edge.
fn apply_impulses(
    a: &mut PhysicsObject,
    mut b: Option<&mut PhysicsObject>,
    normal: Vec2,
    contacts: &[Vec2],
    restitution: f32,
    static_friction: f32,
    dynamic_friction: f32,
) {
    let contact_count = contacts.len() as f32;
    let (inv_mass_a, inv_inertia_a) = inverse_mass(Some(&*a));
    let (inv_mass_b, inv_inertia_b) = inverse_mass(b.as_deref());

    for &contact in contacts {
        let r_a = contact - a.position;
        let r_b = b.as_deref().map_or(Vec2::ZERO, |b| contact - b.position);

        let relative_velocity = relative_velocity_at(a, b.as_deref(), r_a, r_b);
        let relative_velocity_normal = relative_velocity.dot(normal);
        if relative_velocity_normal > 0.0 {
            continue;
        }

        let ra_perp_dot_n = r_a.perpendicular().dot(normal);
        let rb_perp_dot_n = r_b.perpendicular().dot(normal);
        let effective_mass_normal = inv_mass_a
            + inv_mass_b
            + ra_perp_dot_n * ra_perp_dot_n * inv_inertia_a
            + rb_perp_dot_n * rb_perp_dot_n * inv_inertia_b;
        if effective_mass_normal <= 0.0 {
            continue;
        }

        let j = -(1.0 + restitution) * relative_velocity_normal / effective_mass_normal / contact_count;
        let impulse = normal * j;
        a.apply_impulse(-impulse, contact);
        if let Some(b) = b.as_deref_mut() {
            b.apply_impulse(impulse, contact);
        }

        // Friction acts on the velocity left after the normal impulse
        let relative_velocity = relative_velocity_at(a, b.as_deref(), r_a, r_b);
        let tangent = (relative_velocity - normal * relative_velocity.dot(normal)).normalize();
        if tangent == Vec2::ZERO {
            continue;
        }

        let ra_perp_dot_t = r_a.perpendicular().dot(tangent);
        let rb_perp_dot_t = r_b.perpendicular().dot(tangent);
        let effective_mass_tangent = inv_mass_a
            + inv_mass_b
            + ra_perp_dot_t * ra_perp_dot_t * inv_inertia_a
            + rb_perp_dot_t * rb_perp_dot_t * inv_inertia_b;
        if effective_mass_tangent <= 0.0 {
            continue;
        }

        let jt = -relative_velocity.dot(tangent) / effective_mass_tangent / contact_count;
        let friction_impulse = if jt.abs() <= j * static_friction {
            tangent * jt
        } else {
            tangent * (-j * dynamic_friction)
        };
        a.apply_impulse(-friction_impulse, contact);
        if let Some(b) = b.as_deref_mut() {
            b.apply_impulse(friction_impulse, contact);
        }
    }
}

fn relative_velocity_at(a: &PhysicsObject, b: Option<&PhysicsObject>, r_a: Vec2, r_b: Vec2) -> Vec2 {
    let v_b = b.map_or(Vec2::ZERO, |b| velocity_at(b, r_b));
    v_b - velocity_at(a, r_a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::detection::test_collision;
    use crate::common::Material;
    use crate::math::BoundingBox;
    use crate::objects::ObjectFactory;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-3;

    fn elastic() -> ObjectFactory {
        ObjectFactory::new(Material::new(1.0, 0.0, 0.0))
    }

    fn ball(factory: &ObjectFactory, position: Vec2, mass: f32, velocity: Vec2) -> PhysicsObject {
        let mut ball = factory.circle(position, 5.0).unwrap();
        ball.set_mass(mass).unwrap();
        ball.velocity = velocity;
        ball
    }

    #[test]
    fn test_head_on_elastic_circles_swap_velocities() {
        let factory = elastic();
        let mut a = ball(&factory, Vec2::new(60.5, 50.0), 2.0, Vec2::new(10.0, 0.0));
        let mut b = ball(&factory, Vec2::new(70.0, 50.0), 2.0, Vec2::new(-10.0, 0.0));

        let info = test_collision(&a, &b);
        solve_collision(&mut a, &mut b, &info);

        assert_relative_eq!(a.velocity.x, -10.0, epsilon = EPSILON);
        assert_relative_eq!(b.velocity.x, 10.0, epsilon = EPSILON);
        assert_relative_eq!(a.angular_velocity, 0.0, epsilon = EPSILON);
        assert_relative_eq!(b.angular_velocity, 0.0, epsilon = EPSILON);
        // Separated to exactly touching
        assert_relative_eq!((a.position - b.position).magnitude(), 10.0, epsilon = EPSILON);
    }

    #[test]
    fn test_unequal_masses_conserve_momentum() {
        let factory = elastic();
        let mut a = ball(&factory, Vec2::new(60.5, 50.0), 4.0, Vec2::new(10.0, 0.0));
        let mut b = ball(&factory, Vec2::new(70.0, 50.0), 2.0, Vec2::new(-10.0, 0.0));

        let info = test_collision(&a, &b);
        solve_collision(&mut a, &mut b, &info);

        assert_relative_eq!(a.velocity.x, -10.0 / 3.0, epsilon = EPSILON);
        assert_relative_eq!(b.velocity.x, 50.0 / 3.0, epsilon = EPSILON);
        let momentum = a.mass() * a.velocity.x + b.mass() * b.velocity.x;
        assert_relative_eq!(momentum, 20.0, epsilon = EPSILON);
    }

    #[test]
    fn test_circle_transfers_velocity_to_resting_rectangle() {
        let factory = elastic();
        let mut circle = ball(&factory, Vec2::new(60.5, 50.0), 2.0, Vec2::new(10.0, 0.0));
        let mut rect = factory.rectangle(Vec2::new(70.0, 50.0), 10.0, 5.0, 0.0).unwrap();
        rect.set_mass(2.0).unwrap();

        let info = test_collision(&circle, &rect);
        solve_collision(&mut circle, &mut rect, &info);

        assert_relative_eq!(circle.velocity.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(rect.velocity.x, 10.0, epsilon = EPSILON);
        assert_relative_eq!(rect.angular_velocity, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_static_body_absorbs_separation() {
        let factory = elastic();
        let mut wall = factory.rectangle(Vec2::new(70.0, 50.0), 10.0, 40.0, 0.0).unwrap();
        wall.set_static(true);
        let mut a = ball(&factory, Vec2::new(60.5, 50.0), 2.0, Vec2::new(10.0, 0.0));

        let info = test_collision(&a, &wall);
        solve_collision(&mut a, &mut wall, &info);

        assert_eq!(wall.position, Vec2::new(70.0, 50.0));
        assert_eq!(wall.velocity, Vec2::ZERO);
        assert_relative_eq!(a.position.x, 60.0, epsilon = EPSILON);
        assert_relative_eq!(a.velocity.x, -10.0, epsilon = EPSILON);
    }

    #[test]
    fn test_two_static_bodies_are_left_alone() {
        let factory = elastic();
        let mut a = factory.circle(Vec2::new(0.0, 0.0), 1.0).unwrap();
        let mut b = factory.circle(Vec2::new(1.0, 0.0), 1.0).unwrap();
        a.set_static(true);
        b.set_static(true);
        let info = test_collision(&a, &b);
        solve_collision(&mut a, &mut b, &info);
        assert_eq!(a.position, Vec2::new(0.0, 0.0));
        assert_eq!(b.position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let factory = elastic();
        let mut a = ball(&factory, Vec2::new(60.5, 50.0), 2.0, Vec2::new(-1.0, 0.0));
        let mut b = ball(&factory, Vec2::new(70.0, 50.0), 2.0, Vec2::new(1.0, 0.0));
        let info = test_collision(&a, &b);
        solve_collision(&mut a, &mut b, &info);
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_friction_slows_sliding_contact() {
        let factory = ObjectFactory::new(Material::new(0.0, 0.5, 0.4));
        let mut floor = factory.rectangle(Vec2::new(0.0, 0.0), 20.0, 2.0, 0.0).unwrap();
        floor.set_static(true);
        let mut block = factory.rectangle(Vec2::new(0.0, 1.9), 2.0, 2.0, 0.0).unwrap();
        block.velocity = Vec2::new(5.0, -2.0);

        let info = test_collision(&block, &floor);
        solve_collision(&mut block, &mut floor, &info);

        assert_relative_eq!(block.position.y, 2.0, epsilon = EPSILON);
        assert!(block.velocity.y > -2.0);
        assert!(block.velocity.x < 5.0);
        assert!(block.velocity.x > 4.0);
    }

    #[test]
    fn test_border_bounces_ball_back() {
        let mut settings = Settings::default();
        settings.border_restitution = 1.0;
        settings.border_static_friction = 0.0;
        settings.border_dynamic_friction = 0.0;
        let border = Border::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        let factory = elastic();
        let mut ball = factory.circle(Vec2::new(50.0, 0.5), 1.0).unwrap();
        ball.velocity = Vec2::new(0.0, -4.0);

        handle_border_collisions(&mut ball, &border, &settings);

        assert_relative_eq!(ball.position.y, 1.0, epsilon = EPSILON);
        assert_relative_eq!(ball.velocity.y, 4.0, epsilon = EPSILON);
        assert_relative_eq!(ball.velocity.x, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_border_restitution_uses_smaller_value() {
        let settings = Settings::default();
        let border = Border::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        let mut ball = elastic().circle(Vec2::new(99.5, 50.0), 1.0).unwrap();
        ball.velocity = Vec2::new(2.0, 0.0);

        handle_border_collisions(&mut ball, &border, &settings);

        assert_relative_eq!(ball.position.x, 99.0, epsilon = EPSILON);
        assert_relative_eq!(ball.velocity.x, -settings.border_restitution * 2.0, epsilon = EPSILON);
    }
}
