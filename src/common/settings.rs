//! Runtime-tunable simulation parameters.

use serde::{Deserialize, Serialize};

use crate::common::error::{PhysicsError, Result};
use crate::common::material::Material;
use crate::math::vec2::Vec2;

/// How gravity acts on every dynamic body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gravity {
    /// Constant acceleration in one direction.
    Directional { direction: Vec2 },
    /// Acceleration of fixed magnitude towards a point.
    TowardsPoint { point: Vec2, strength: f32 },
}

impl Gravity {
    /// Acceleration a body at `position` receives.
    pub fn acceleration_at(&self, position: Vec2) -> Vec2 {
        match *self {
            Gravity::Directional { direction } => direction,
            Gravity::TowardsPoint { point, strength } => (point - position).normalize() * strength,
        }
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::Directional {
            direction: Vec2::new(0.0, -10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gravity: Gravity,
    /// Fraction of linear and angular velocity removed per integration step.
    pub damping: f32,
    /// Factor applied to every time step handed to the world.
    pub time_scale: f32,
    /// Number of sub-steps one world step is split into.
    pub sub_steps: u32,
    pub border_restitution: f32,
    pub border_static_friction: f32,
    pub border_dynamic_friction: f32,
    /// Elements a quadtree leaf may hold before it splits.
    pub capacity: usize,
    /// Leaves whose smaller side is at or below this size never split.
    pub min_node_size: f32,
    /// Material given to newly created objects.
    pub default_material: Material,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gravity: Gravity::default(),
            damping: 0.0,
            time_scale: 1.0,
            sub_steps: 1,
            border_restitution: 0.5,
            border_static_friction: 0.5,
            border_dynamic_friction: 0.45,
            capacity: 8,
            min_node_size: 2.0,
            default_material: Material::default(),
        }
    }
}

impl Settings {
    /// Parses settings from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 1 {
            return Err(invalid("capacity", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(invalid("damping", "must lie in [0, 1]"));
        }
        if !(self.time_scale >= 0.0) {
            return Err(invalid("time_scale", "must not be negative"));
        }
        if self.sub_steps == 0 {
            return Err(invalid("sub_steps", "must be at least 1"));
        }
        if !(self.min_node_size > 0.0) {
            return Err(invalid("min_node_size", "must be positive"));
        }
        for (field, value) in [
            ("border_restitution", self.border_restitution),
            ("border_static_friction", self.border_static_friction),
            ("border_dynamic_friction", self.border_dynamic_friction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must lie in [0, 1]"));
            }
        }
        Ok(())
    }

    /// Material describing the world border.
    pub fn border_material(&self) -> Material {
        Material::new(
            self.border_restitution,
            self.border_static_friction,
            self.border_dynamic_friction,
        )
    }
}

fn invalid(field: &'static str, reason: &str) -> PhysicsError {
    PhysicsError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}
