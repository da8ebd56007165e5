//! The flight demo: a glider circling a textured earth sphere.
//!
//! [`FlightState`] is the whole simulation; it owns every angle, the
//! altitude and the derived matrices, and is advanced once per frame from
//! the held-key [`InputState`]. [`FlightScene`] owns the scene-graph wiring
//! of the plane parts and the earth, and copies the per-frame matrices into
//! the graph with [`FlightScene::sync`].

pub mod controls;

use anyhow::{Result, anyhow};
use futures::future::join_all;

use crate::context::Context;
use crate::data_structures::mesh::MeshBuffers;
use crate::data_structures::scene_graph::{MeshNode, NodeIndex, SceneGraph};
use crate::renderer::Renderer;
use crate::resources::{load_mesh_obj, load_texture_or_fallback};
use crate::transform::{
    Mat4, Vec3, Vec4, look_at, rotate_x, rotate_y, rotate_z, scalem, translate,
};

use controls::InputState;

// Control-surface pivot points, measured in the plane model's local frame.
const LEFT_AILERON_PIVOT: Vec3 = Vec3::new(2.0116, 0.042162, -0.54629);
const RIGHT_AILERON_PIVOT: Vec3 = Vec3::new(-2.0031, 0.044753, -0.54652);
const LEFT_ELEVATOR_PIVOT: Vec3 = Vec3::new(1.0151, 0.048431, -4.0851);
const RIGHT_ELEVATOR_PIVOT: Vec3 = Vec3::new(-1.0459, 0.047272, -4.0859);
const RUDDER_PIVOT: Vec3 = Vec3::new(0.009496, 0.59494, -4.2548);

pub const SPHERE_RADIUS: f32 = 20.0;
const GROUND_BUFFER: f32 = 0.15;
const PLANE_SCALE: f32 = 0.03;

const MIN_SPEED: f32 = 0.001;
const MAX_SPEED: f32 = 0.2;
const THROTTLE_RATE: f32 = 0.05;

const MAX_DEFLECTION: f32 = 25.0;
const SURFACE_RATE: f32 = 100.0;
const RETURN_RATE: f32 = 80.0;

const YAW_RATE: f32 = 15.0;
const BANK_RATE: f32 = 20.0;
const PITCH_RATE: f32 = 20.0;
const YAW_LIMIT: f32 = 45.0;
const BANK_LIMIT: f32 = 60.0;
const PITCH_DOWN_LIMIT: f32 = -60.0;
const PITCH_UP_LIMIT: f32 = 6.0;

const GLIDE_BASE: f32 = 2.0;
const MAX_PITCH_DEG: f32 = 30.0;
const TURN_GAIN: f32 = 200.0;

const FOLLOW_HEIGHT: f32 = 0.2;
const FOLLOW_DISTANCE: f32 = -0.3;

// Sun direction in the earth's rest frame, so the light stays fixed to the
// ground while the earth rotates under the plane.
const SUN_FIXED_TO_EARTH: Vec4 = Vec4::new(0.2, 1.0, 0.2, 0.0);

/// Rotation about a pivot point: move the pivot to the origin, rotate,
/// move back.
fn pivot_rotation(pivot: Vec3, rotation: Mat4) -> Mat4 {
    translate(pivot.x, -pivot.y, pivot.z) * rotation * translate(-pivot.x, pivot.y, -pivot.z)
}

/// Moves `angle` toward the held deflection at `SURFACE_RATE`, or back
/// toward 0 at `RETURN_RATE` when neither key is held. `positive` and
/// `negative` name the keys deflecting toward +/- limits.
fn deflect(angle: f32, positive: bool, negative: bool, dt: f32) -> f32 {
    let step = SURFACE_RATE * dt;
    let back = RETURN_RATE * dt;
    if negative {
        (angle - step).max(-MAX_DEFLECTION)
    } else if positive {
        (angle + step).min(MAX_DEFLECTION)
    } else if angle > 0.0 {
        (angle - back).max(0.0)
    } else if angle < 0.0 {
        (angle + back).min(0.0)
    } else {
        angle
    }
}

/// Complete flight simulation state. Everything the renderer needs each
/// frame (model, view, light) is a pure function of these fields and is
/// recomputed by [`update`](Self::update).
#[derive(Clone, Copy, Debug)]
pub struct FlightState {
    pub speed: f32,
    pub yaw: f32,
    pub bank: f32,
    pub pitch: f32,
    pub altitude: f32,

    pub aileron_angle: f32,
    pub elevator_angle: f32,
    pub rudder_angle: f32,

    earth_rotation: Mat4,

    pub sphere_model: Mat4,
    pub plane_model: Mat4,
    pub view: Mat4,
    pub light_dir: [f32; 4],
}

impl FlightState {
    pub fn new() -> Self {
        let mut state = Self {
            speed: 0.05,
            yaw: 0.0,
            bank: 0.0,
            pitch: 0.0,
            altitude: 25.0,
            aileron_angle: 0.0,
            elevator_angle: 0.0,
            rudder_angle: 0.0,
            earth_rotation: Mat4::identity(),
            sphere_model: Mat4::identity(),
            plane_model: Mat4::identity(),
            view: Mat4::identity(),
            light_dir: [0.0, 1.0, 0.0, 0.0],
        };
        state.refresh_derived();
        state
    }

    /// Advances the simulation by `dt` seconds of held input plus one frame
    /// of forward motion, then recomputes the derived matrices.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        // Throttle.
        if input.throttle_up {
            self.speed = (self.speed + THROTTLE_RATE * dt).min(MAX_SPEED);
        }
        if input.throttle_down {
            self.speed = (self.speed - THROTTLE_RATE * dt).max(MIN_SPEED);
        }

        // Control surfaces. Left bank raises the left aileron (negative)
        // and swings the rudder the other way; elevators go up (negative)
        // when pitching up.
        self.aileron_angle = deflect(self.aileron_angle, input.right, input.left, dt);
        self.elevator_angle = deflect(self.elevator_angle, input.down, input.up, dt);
        self.rudder_angle = deflect(self.rudder_angle, input.left, input.right, dt);

        // Attitude. Angles hold their value when the keys are released.
        if input.left {
            self.yaw = (self.yaw - YAW_RATE * dt).max(-YAW_LIMIT);
            self.bank = (self.bank + BANK_RATE * dt).min(BANK_LIMIT);
        }
        if input.right {
            self.yaw = (self.yaw + YAW_RATE * dt).min(YAW_LIMIT);
            self.bank = (self.bank - BANK_RATE * dt).max(-BANK_LIMIT);
        }
        if input.up {
            self.pitch = (self.pitch - PITCH_RATE * dt).max(PITCH_DOWN_LIMIT);
        }
        if input.down {
            self.pitch = (self.pitch + PITCH_RATE * dt).min(PITCH_UP_LIMIT);
        }

        // Altitude from pitch.
        let pitch_factor = (self.pitch.abs() / MAX_PITCH_DEG).min(1.0);
        if pitch_factor > 0.0 {
            let glide = GLIDE_BASE * pitch_factor * dt;
            if self.pitch < 0.0 {
                self.altitude -= glide;
            } else {
                self.altitude += glide;
            }
        }

        // Ground contact: sit on the sphere and level a nose-down attitude.
        if self.altitude < SPHERE_RADIUS + GROUND_BUFFER {
            self.altitude = SPHERE_RADIUS + GROUND_BUFFER;
            if self.pitch < 0.0 {
                self.pitch = 0.0;
            }
        }

        // The plane stays put; the earth turns underneath it. Banking turns
        // the earth about Y, the throttle rolls it forward one frame step.
        let turn_rate = TURN_GAIN * self.speed * self.bank.to_radians().sin();
        self.earth_rotation = rotate_y(-turn_rate * dt) * self.earth_rotation;
        self.earth_rotation = rotate_x(self.speed) * self.earth_rotation;

        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        // Visual tilt of the earth from the plane's attitude, on top of the
        // accumulated rotation.
        let x_tilt = self.pitch / 6.0 * self.speed;
        let z_tilt = self.bank / 6.0 * self.speed;
        self.sphere_model = rotate_x(-x_tilt) * rotate_z(-z_tilt) * self.earth_rotation;

        // The sun rides on the ground, so only the earth's rotation moves it.
        let world_light = (self.sphere_model * SUN_FIXED_TO_EARTH).truncate().normalize();
        self.light_dir = [world_light.x, world_light.y, world_light.z, 0.0];

        self.plane_model = translate(0.0, 0.0, -self.altitude)
            * rotate_x(90.0 + self.pitch)
            * rotate_y(self.yaw)
            * rotate_z(self.bank)
            * scalem(PLANE_SCALE, PLANE_SCALE, PLANE_SCALE);

        // Chase camera: behind and above the plane, following yaw but not
        // bank so the horizon stays steady.
        let plane_rotation = rotate_x(90.0) * rotate_y(self.yaw);
        let offset = (plane_rotation
            * Vec4::direction(Vec3::new(0.0, FOLLOW_HEIGHT, FOLLOW_DISTANCE)))
        .truncate();
        let plane_pos = Vec3::new(0.0, 0.0, -self.altitude);
        let eye = plane_pos + offset;
        let up = (plane_rotation * Vec4::direction(Vec3::new(0.0, 1.0, 0.0))).truncate();
        self.view = look_at(eye, plane_pos, up);
    }

    pub fn left_aileron_matrix(&self) -> Mat4 {
        pivot_rotation(LEFT_AILERON_PIVOT, rotate_x(self.aileron_angle))
    }

    /// The right aileron mirrors the left one.
    pub fn right_aileron_matrix(&self) -> Mat4 {
        pivot_rotation(RIGHT_AILERON_PIVOT, rotate_x(-self.aileron_angle))
    }

    pub fn left_elevator_matrix(&self) -> Mat4 {
        pivot_rotation(LEFT_ELEVATOR_PIVOT, rotate_x(self.elevator_angle))
    }

    pub fn right_elevator_matrix(&self) -> Mat4 {
        pivot_rotation(RIGHT_ELEVATOR_PIVOT, rotate_x(self.elevator_angle))
    }

    pub fn rudder_matrix(&self) -> Mat4 {
        pivot_rotation(RUDDER_PIVOT, rotate_y(-self.rudder_angle))
    }
}

impl Default for FlightState {
    fn default() -> Self {
        Self::new()
    }
}

const PLANE_PART_FILES: [&str; 6] = [
    "blender-models/plane-parts/planebody.obj",
    "blender-models/plane-parts/rudder.obj",
    "blender-models/plane-parts/leftaileron.obj",
    "blender-models/plane-parts/rightaileron.obj",
    "blender-models/plane-parts/leftelevator.obj",
    "blender-models/plane-parts/rightelevator.obj",
];

const EARTH_TEXTURE_FILE: &str = "textures/earth.jpg";

/// The assembled scene: plane body as root, rudder as the body's child,
/// the remaining control surfaces chained as the rudder's siblings, and the
/// earth sphere as the body's sibling.
pub struct FlightScene {
    pub graph: SceneGraph<MeshNode>,
    pub plane: NodeIndex,
    pub rudder: NodeIndex,
    pub left_aileron: NodeIndex,
    pub right_aileron: NodeIndex,
    pub left_elevator: NodeIndex,
    pub right_elevator: NodeIndex,
    pub earth: NodeIndex,
}

impl FlightScene {
    /// Loads the plane-part meshes concurrently, builds the earth sphere
    /// and wires the node tree. Mesh failures abort the load; a missing
    /// earth texture degrades to the white fallback.
    pub async fn load(ctx: &Context, renderer: &Renderer) -> Result<Self> {
        let meshes = join_all(PLANE_PART_FILES.iter().map(|f| load_mesh_obj(f)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        let [body, rudder_mesh, left_a, right_a, left_e, right_e]: [MeshBuffers; 6] = meshes
            .try_into()
            .map_err(|_| anyhow!("expected {} plane part meshes", PLANE_PART_FILES.len()))?;

        let earth_texture =
            load_texture_or_fallback(EARTH_TEXTURE_FILE, &ctx.device, &ctx.queue).await;
        let earth_mesh = MeshBuffers::uv_sphere(SPHERE_RADIUS, 128, 256);

        let layout = renderer.node_layout();
        let sampler = renderer.sampler();
        let white = &renderer.fallback_texture().view;

        let mut graph = SceneGraph::new();
        let node = |mesh: MeshBuffers, view: &wgpu::TextureView, label: &str| {
            MeshNode::new(&ctx.device, mesh, layout, sampler, view, label)
        };

        let plane = graph.insert(Mat4::identity(), node(body, white, "plane body"));
        let rudder = graph.insert(Mat4::identity(), node(rudder_mesh, white, "rudder"));
        let left_aileron = graph.insert(Mat4::identity(), node(left_a, white, "left aileron"));
        let right_aileron = graph.insert(Mat4::identity(), node(right_a, white, "right aileron"));
        let left_elevator = graph.insert(Mat4::identity(), node(left_e, white, "left elevator"));
        let right_elevator = graph.insert(Mat4::identity(), node(right_e, white, "right elevator"));
        let earth = graph.insert(
            Mat4::identity(),
            node(earth_mesh, &earth_texture.view, "earth"),
        );

        // Control surfaces inherit the body transform as one sibling chain
        // under the body's child slot; the earth is the body's peer.
        graph.add_child(plane, rudder);
        graph.add_sibling(rudder, left_aileron);
        graph.add_sibling(left_aileron, right_aileron);
        graph.add_sibling(right_aileron, left_elevator);
        graph.add_sibling(left_elevator, right_elevator);
        graph.add_sibling(plane, earth);

        Ok(Self {
            graph,
            plane,
            rudder,
            left_aileron,
            right_aileron,
            left_elevator,
            right_elevator,
            earth,
        })
    }

    /// Writes the frame's local matrices into the graph. Call after
    /// [`FlightState::update`] and before rendering.
    pub fn sync(&mut self, state: &FlightState) {
        self.graph.set_local(self.plane, state.plane_model);
        self.graph.set_local(self.rudder, state.rudder_matrix());
        self.graph
            .set_local(self.left_aileron, state.left_aileron_matrix());
        self.graph
            .set_local(self.right_aileron, state.right_aileron_matrix());
        self.graph
            .set_local(self.left_elevator, state.left_elevator_matrix());
        self.graph
            .set_local(self.right_elevator, state.right_elevator_matrix());
        self.graph.set_local(self.earth, state.sphere_model);
    }
}
