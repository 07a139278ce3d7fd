//! Sphere-shaped kinematic body that walks on the terrain surface.

use engine_core::{Quat, Transform, Vec3};

use crate::collision::{CollisionSurface, Contact};
use crate::gravity::SphericalGravity;

/// Default number of collision substeps per tick.
pub const DEFAULT_SUBSTEPS: u32 = 5;

/// How a body loses velocity when it touches the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResponse {
    /// 0 removes the inward normal velocity, 1 reflects it fully.
    pub restitution: f32,
    /// Per-second velocity damping applied on every contacting substep.
    pub drag: f32,
}

impl Default for ContactResponse {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            drag: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Airborne,
    Grounded,
}

/// Position, velocity, and orientation of the walking body.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    /// Radius of the collision sphere.
    pub radius: f32,
    on_surface: bool,
}

impl SurfaceBody {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            radius,
            on_surface: false,
        }
    }

    /// True only if a contact was resolved during the most recent step.
    pub fn on_surface(&self) -> bool {
        self.on_surface
    }

    pub fn state(&self) -> BodyState {
        if self.on_surface {
            BodyState::Grounded
        } else {
            BodyState::Airborne
        }
    }

    /// Teleport, discarding velocity and contact state.
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.on_surface = false;
    }

    pub fn apply_gravity(&mut self, gravity: &SphericalGravity, dt: f32) {
        self.velocity += gravity.acceleration_at(self.position) * dt;
    }

    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Push the body out of the terrain and remove (or reflect) its inward velocity.
    pub fn resolve_contact(&mut self, contact: &Contact, response: &ContactResponse, dt: f32) {
        self.position += contact.normal * contact.penetration_depth;

        let normal_speed = self.velocity.dot(contact.normal);
        if normal_speed < 0.0 {
            self.velocity -= contact.normal * normal_speed * (1.0 + response.restitution);
        }

        self.velocity *= (1.0 - response.drag * dt).max(0.0);
    }

    /// Advance `dt` seconds in `substeps` equal slices of gravity, integration,
    /// and contact resolution. `on_contact` sees every resolved contact.
    pub fn step<F>(
        &mut self,
        surface: &CollisionSurface,
        gravity: &SphericalGravity,
        response: &ContactResponse,
        dt: f32,
        substeps: u32,
        mut on_contact: F,
    ) -> BodyState
    where
        F: FnMut(&Contact),
    {
        let substeps = substeps.max(1);
        let sub_dt = dt / substeps as f32;
        let mut touched = false;

        for _ in 0..substeps {
            self.apply_gravity(gravity, sub_dt);
            self.integrate(sub_dt);

            if let Some(contact) = surface.query(self.position, self.radius) {
                self.resolve_contact(&contact, response, sub_dt);
                on_contact(&contact);
                touched = true;
            }
        }

        self.on_surface = touched;
        self.state()
    }

    pub fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.orientation)
    }
}
