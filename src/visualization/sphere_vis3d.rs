use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::math::primitives::Sphere;
use bevy::pbr::{FogFalloff, FogSettings};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simulation::picking::Ray as PickRay;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::NVec3;

/// Component tagging each sphere with its body index into Scenario.system.bodies
#[derive(Component)]
struct BodyIndex(pub usize);

/// Orbit state of the scene camera
#[derive(Component)]
struct OrbitCamera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
}

/// Distance of the camera from the layout centre along +Z
const CAMERA_DISTANCE: f32 = 2000.0;

/// Radians per pixel of mouse drag
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Fraction of the distance covered per wheel line
const ZOOM_SPEED: f32 = 0.1;

/// Entrypoint: open a window and drive the scenario once per frame
pub fn run_3d(scenario: Scenario) {
    App::new()
        .insert_resource(scenario)
        .insert_resource(AmbientLight {
            color: Color::srgb(0.9, 0.95, 1.0),
            brightness: 400.0,
        })
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "spheresim".into(),
                    ..default()
                }),
                ..default()
            }),
            FrameTimeDiagnosticsPlugin,
            LogDiagnosticsPlugin::default(),
        ))
        .add_systems(Startup, setup_3d)
        .add_systems(
            Update,
            (physics_step_3d, sync_transforms_3d, pick_body_3d, orbit_camera_3d).chain(),
        )
        .run();
}

/// Startup system: spawn camera, lights, and one sphere per body
fn setup_3d(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scenario: Res<Scenario>,
) {
    info!("setup_3d: spawning {} spheres", scenario.system.bodies.len());

    let target = to_vec3(&scenario.layout.center());

    // Perspective camera in front of the layout, fog fades distant spheres
    commands.spawn((
        Camera3dBundle {
            projection: PerspectiveProjection {
                fov: 45.0_f32.to_radians(),
                near: 1.0,
                far: 10_000.0,
                ..default()
            }
            .into(),
            transform: Transform::from_translation(target + Vec3::Z * CAMERA_DISTANCE)
                .looking_at(target, Vec3::Y),
            ..default()
        },
        FogSettings {
            color: Color::WHITE,
            falloff: FogFalloff::Linear {
                start: 1000.0,
                end: 10_000.0,
            },
            ..default()
        },
        OrbitCamera {
            target,
            distance: CAMERA_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
        },
    ));

    // Green key light from above and behind
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            color: Color::srgb_u8(0x14, 0xbc, 0x22),
            illuminance: 8_000.0,
            ..default()
        },
        transform: Transform::from_xyz(100.0, 100.0, -100.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    // Random but reproducible colours per sphere
    let mut rng = StdRng::seed_from_u64(scenario.seed.wrapping_add(1));

    for (i, b) in scenario.system.bodies.iter().enumerate() {
        let color = Color::srgb(rng.gen(), rng.gen(), rng.gen());

        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Sphere::new(b.radius as f32).mesh().uv(20, 20)),
                material: materials.add(StandardMaterial {
                    base_color: color,
                    perceptual_roughness: 1.0,
                    ..default()
                }),
                transform: Transform::from_translation(to_vec3(&b.x)),
                ..default()
            },
            BodyIndex(i),
        ));
    }
}

/// Per-frame layout tick and collision pass
fn physics_step_3d(mut scenario: ResMut<Scenario>) {
    scenario.step();
}

fn sync_transforms_3d(scenario: Res<Scenario>, mut query: Query<(&BodyIndex, &mut Transform)>) {
    for (BodyIndex(i), mut transform) in &mut query {
        if let Some(b) = scenario.system.bodies.get(*i) {
            transform.translation = to_vec3(&b.x);
        }
    }
}

/// Cast the cursor ray; the nearest sphere under it pins the root
fn pick_body_3d(
    mut scenario: ResMut<Scenario>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Some(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let Some(ray) = PickRay::new(to_nvec3(ray.origin), to_nvec3(*ray.direction)) else {
        return;
    };
    let hit = scenario.raycast(&ray);
    scenario.pick(hit);
}

/// Left drag orbits around the layout centre, the wheel zooms
fn orbit_camera_3d(
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let scroll: f32 = wheel.read().map(|w| w.y).sum();

    for (mut orbit, mut transform) in &mut cameras {
        if buttons.pressed(MouseButton::Left) {
            orbit.yaw -= drag.x * ORBIT_SENSITIVITY;
            orbit.pitch = (orbit.pitch - drag.y * ORBIT_SENSITIVITY).clamp(-1.5, 1.5);
        }
        if scroll != 0.0 {
            orbit.distance = (orbit.distance * (1.0 - scroll * ZOOM_SPEED)).clamp(100.0, 9_000.0);
        }

        let rotation = Quat::from_euler(EulerRot::YXZ, orbit.yaw, orbit.pitch, 0.0);
        transform.translation = orbit.target + rotation * Vec3::Z * orbit.distance;
        transform.look_at(orbit.target, Vec3::Y);
    }
}

fn to_vec3(v: &NVec3) -> Vec3 {
    Vec3::new(v.x as f32, v.y as f32, v.z as f32)
}

fn to_nvec3(v: Vec3) -> NVec3 {
    NVec3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z))
}
