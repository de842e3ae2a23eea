//! Defines physical material properties.

use serde::{Deserialize, Serialize};

/// Represents the physical properties of a body affecting collisions.
/// Every coefficient is kept in [0, 1]; the setters clamp out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMaterial")]
pub struct Material {
    /// Coefficient of restitution (bounciness).
    /// 0 = perfectly inelastic (no bounce), 1 = perfectly elastic.
    restitution: f32,
    /// Friction coefficient that holds a resting contact in place.
    static_friction: f32,
    /// Friction coefficient applied once the contact slides.
    dynamic_friction: f32,
}

impl Material {
    /// Creates a new material, clamping every coefficient to [0, 1].
    pub fn new(restitution: f32, static_friction: f32, dynamic_friction: f32) -> Self {
        Material {
            restitution: clamp_unit(restitution),
            static_friction: clamp_unit(static_friction),
            dynamic_friction: clamp_unit(dynamic_friction),
        }
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    pub fn set_restitution(&mut self, value: f32) {
        self.restitution = clamp_unit(value);
    }

    pub fn set_static_friction(&mut self, value: f32) {
        self.static_friction = clamp_unit(value);
    }

    pub fn set_dynamic_friction(&mut self, value: f32) {
        self.dynamic_friction = clamp_unit(value);
    }

    /// Restitution used when two materials meet: the less bouncy one wins.
    pub fn combined_restitution(&self, other: &Material) -> f32 {
        self.restitution.min(other.restitution)
    }

    /// Static and dynamic friction used when two materials meet (arithmetic mean).
    pub fn combined_friction(&self, other: &Material) -> (f32, f32) {
        (
            (self.static_friction + other.static_friction) * 0.5,
            (self.dynamic_friction + other.dynamic_friction) * 0.5,
        )
    }
}

impl Default for Material {
    /// Default material properties (moderate restitution, moderate friction).
    fn default() -> Self {
        Material {
            restitution: 0.5,
            static_friction: 0.5,
            dynamic_friction: 0.35,
        }
    }
}

// Deserialized values go through the same clamping as the setters
#[derive(Deserialize)]
struct RawMaterial {
    restitution: f32,
    static_friction: f32,
    dynamic_friction: f32,
}

impl From<RawMaterial> for Material {
    fn from(raw: RawMaterial) -> Self {
        Material::new(raw.restitution, raw.static_friction, raw.dynamic_friction)
    }
}

// NaN maps to 0
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
