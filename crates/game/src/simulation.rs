//! Top-level simulation context: owns the terrain, its collision surface, and the walking body.

use anyhow::{Context, Result};
use engine_core::{clamp_frame_delta, Transform, Vec3};
use input::InputState;
use physics::{BodyState, CollisionSurface, Contact, ContactResponse, SphericalGravity, SurfaceBody};
use procgen::{DirtyBuffers, GenerationChange, Planet, TerrainGenerator, TerrainPalette, TerrainParams};
use rand::Rng;

use crate::config::SimConfig;
use crate::player::LocomotionController;
use crate::spawn::{random_direction, spawn_point};

/// Callbacks invoked synchronously from [`Simulation::frame`].
pub trait SimulationHooks {
    /// Called once at the end of every tick with the clamped delta.
    fn on_tick(&mut self, _delta_time: f32) {}

    /// Called for every contact resolved during the tick's substeps.
    fn on_contact(&mut self, _contact: &Contact) {}
}

impl SimulationHooks for () {}

/// Owns one planet, one collision surface, and one body. Every tick reads and
/// writes only through this context.
pub struct Simulation {
    config: SimConfig,
    generator: TerrainGenerator,
    surface: CollisionSurface,
    gravity: SphericalGravity,
    response: ContactResponse,
    body: SurfaceBody,
    controller: LocomotionController,
    input: InputState,
}

fn build_surface(planet: &Planet) -> Result<CollisionSurface> {
    CollisionSurface::build(planet.positions(), planet.indices(), Planet::CENTER)
        .context("building collision surface")
}

impl Simulation {
    /// Generate the planet, index it, and place the body `spawn_margin` above
    /// the terrain over +Z.
    pub fn new(config: SimConfig) -> Result<Self> {
        let mut generator = TerrainGenerator::new(
            config.radius,
            config.width_segments,
            config.height_segments,
            config.terrain,
        )
        .context("generating terrain")?;
        generator.color_by_height_and_slope(config.palette);
        let surface = build_surface(generator.planet())?;

        let gravity = SphericalGravity::new(Planet::CENTER, config.gravity);
        let response = ContactResponse {
            restitution: config.restitution,
            drag: config.drag,
        };
        let controller = LocomotionController::new(
            config.move_speed,
            config.jump_speed,
            config.yaw_sensitivity,
        );
        let body = SurfaceBody::new(Planet::CENTER, config.body_radius);

        let mut simulation = Self {
            config,
            generator,
            surface,
            gravity,
            response,
            body,
            controller,
            input: InputState::new(),
        };
        let start = Vec3::Z * simulation.spawn_distance();
        simulation.spawn_at(start);
        Ok(simulation)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn planet(&self) -> &Planet {
        self.generator.planet()
    }

    /// Recolor the terrain. Geometry and the collision surface are untouched.
    pub fn set_palette(&mut self, palette: TerrainPalette) {
        self.generator.color_by_height_and_slope(palette);
    }

    /// Buffers changed since the last call, for the renderer to re-upload.
    pub fn take_dirty(&mut self) -> DirtyBuffers {
        self.generator.take_dirty()
    }

    pub fn surface(&self) -> &CollisionSurface {
        &self.surface
    }

    pub fn gravity(&self) -> &SphericalGravity {
        &self.gravity
    }

    pub fn body(&self) -> &SurfaceBody {
        &self.body
    }

    pub fn controller(&self) -> &LocomotionController {
        &self.controller
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Body position and orientation for the renderer.
    pub fn transform(&self) -> Transform {
        self.body.transform()
    }

    /// Height of the body center above the undisplaced sphere.
    pub fn altitude(&self) -> f32 {
        self.gravity.height_above(self.body.position, self.generator.planet().radius())
    }

    /// Run one tick of `delta_time` seconds, clamped to the configured maximum.
    pub fn frame<H: SimulationHooks>(&mut self, delta_time: f32, hooks: &mut H) -> BodyState {
        let dt = clamp_frame_delta(delta_time, self.config.max_frame_delta);

        self.controller
            .apply_input(&mut self.body, &self.input, &self.gravity);
        let state = self.body.step(
            &self.surface,
            &self.gravity,
            &self.response,
            dt,
            self.config.physics_substeps,
            |contact| hooks.on_contact(contact),
        );
        self.controller.orient(&mut self.body, &self.gravity);

        hooks.on_tick(dt);
        self.input.end_tick();
        state
    }

    /// Place the body above the terrain below `point` and stop it.
    pub fn spawn_at(&mut self, point: Vec3) -> Vec3 {
        let position = spawn_point(&self.surface, point, self.config.spawn_margin);
        self.body.place(position);
        self.controller.orient(&mut self.body, &self.gravity);
        log::info!("Spawned body at {:?}", position);
        position
    }

    /// Distance from the center that spawn rays start at: `spawn_distance_factor`
    /// radii, pushed out past the highest terrain if that lies further.
    fn spawn_distance(&self) -> f32 {
        let planet = self.generator.planet();
        let (_, highest) = planet.displacement_range();
        let above_terrain = planet.radius() + highest.max(0.0) + self.config.spawn_margin;
        (planet.radius() * self.config.spawn_distance_factor).max(above_terrain)
    }

    /// Spawn from a uniformly random direction, `spawn_distance_factor` radii out.
    pub fn random_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec3 {
        let point = Planet::CENTER + random_direction(rng) * self.spawn_distance();
        self.spawn_at(point)
    }

    /// Regenerate or rescale the terrain and swap in a rebuilt collision surface.
    ///
    /// Either both the planet and surface change, or neither does. When the
    /// geometry changed the body is re-placed above the new terrain along its
    /// current radial direction.
    pub fn apply_terrain(&mut self, params: TerrainParams, radius: f32) -> Result<GenerationChange> {
        let mut generator = self.generator.clone();
        let change = generator
            .apply(params, radius)
            .map_err(|err| {
                log::warn!("Rejected terrain change: {}", err);
                err
            })
            .context("applying terrain parameters")?;

        if change.geometry_changed() {
            let surface = build_surface(generator.planet()).map_err(|err| {
                log::warn!("Keeping previous terrain: {:#}", err);
                err
            })?;
            self.surface = surface;
            log::info!(
                "Rebuilt collision surface ({:?}): {} triangles",
                change,
                self.surface.triangle_count()
            );
        }

        self.generator = generator;
        self.config.radius = radius;
        self.config.terrain = *self.generator.planet().params();

        if change.geometry_changed() {
            let direction = self.gravity.up_at(self.body.position);
            self.spawn_at(Planet::CENTER + direction * self.spawn_distance());
        }
        Ok(change)
    }
}
