//! d3-viewer: interactive window around the software renderer
//!
//! Renders the scene into the CPU framebuffer and blits it to the window
//! each frame. WASD flies the camera, arrow keys look around, Space/C
//! rise and sink, Tab toggles wireframe, F5 saves the current config.
//!
//! Usage: d3-viewer [mesh.obj]

use std::path::Path;

use d3_rasterizer::config::{load_config, save_config, RenderConfig};
use d3_rasterizer::rasterizer::{self as raster, Texture, Transform};
use d3_rasterizer::{ObjectId, Renderer};
use macroquad::prelude::*;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const CONFIG_PATH: &str = "assets/config.ron";

/// Units per second
const MOVE_SPEED: f32 = 2.0;
/// Radians per second
const TURN_SPEED: f32 = 1.5;
const SPIN_SPEED: f32 = 0.6;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("d3-viewer v{}", VERSION),
        window_width: raster::WIDTH as i32 * 2,
        window_height: raster::HEIGHT as i32 * 2,
        window_resizable: true,
        ..Default::default()
    }
}

/// Keyboard state sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
struct FrameInput {
    /// -1..1 along local +Z
    forward: f32,
    /// -1..1 along local +X
    strafe: f32,
    /// -1..1 along local +Y
    rise: f32,
    yaw: f32,
    pitch: f32,
    toggle_wireframe: bool,
    save_config: bool,
    quit: bool,
}

fn axis(positive: KeyCode, negative: KeyCode) -> f32 {
    let mut value = 0.0;
    if is_key_down(positive) {
        value += 1.0;
    }
    if is_key_down(negative) {
        value -= 1.0;
    }
    value
}

impl FrameInput {
    fn gather() -> Self {
        Self {
            forward: axis(KeyCode::W, KeyCode::S),
            strafe: axis(KeyCode::D, KeyCode::A),
            rise: axis(KeyCode::Space, KeyCode::C),
            yaw: axis(KeyCode::Right, KeyCode::Left),
            pitch: axis(KeyCode::Down, KeyCode::Up),
            toggle_wireframe: is_key_pressed(KeyCode::Tab),
            save_config: is_key_pressed(KeyCode::F5),
            quit: is_key_pressed(KeyCode::Escape),
        }
    }
}

fn load_or_default(path: &Path) -> RenderConfig {
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return RenderConfig::default();
    }
    match load_config(path) {
        Ok(config) => {
            log::info!("loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("failed to load {}: {}, using defaults", path.display(), e);
            RenderConfig::default()
        }
    }
}

/// Demo scene: a ring of checkered cubes plus an optional OBJ mesh
fn build_scene(renderer: &mut Renderer, obj_path: Option<&str>) -> Vec<ObjectId> {
    let checker = renderer.push_texture(Texture::checkerboard(
        64,
        64,
        8,
        raster::Color::WHITE,
        raster::Color::new(200, 40, 40),
    ));

    let mut spinning = vec![
        renderer.push_cube(1.0, Transform::at(raster::Vec3::new(0.0, 0.0, 3.0)), Some(checker)),
        renderer.push_cube(0.6, Transform::at(raster::Vec3::new(-1.8, 0.4, 4.5)), Some(checker)),
        renderer.push_cube(0.6, Transform::at(raster::Vec3::new(1.8, -0.4, 4.5)), None),
    ];

    if let Some(path) = obj_path {
        match renderer.load_obj(path, Transform::at(raster::Vec3::new(0.0, 0.0, 6.0)), None) {
            Ok(id) => spinning.push(id),
            Err(e) => log::error!("{}", e),
        }
    }
    spinning
}

fn apply_input(renderer: &mut Renderer, input: &FrameInput, dt: f32) {
    let camera = renderer.scene_mut().camera_mut();
    camera.angles.y += input.yaw * TURN_SPEED * dt;
    camera.angles.x = (camera.angles.x + input.pitch * TURN_SPEED * dt)
        .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);

    let dir = raster::Vec3::new(input.strafe, input.rise, input.forward);
    camera.move_dir(dir, MOVE_SPEED * dt);

    if input.toggle_wireframe {
        renderer.config.wireframe = !renderer.config.wireframe;
    }
    if input.save_config {
        let mut config = renderer.config.clone();
        config.camera = renderer.scene().camera();
        match save_config(&config, CONFIG_PATH) {
            Ok(()) => log::info!("saved config to {}", CONFIG_PATH),
            Err(e) => log::error!("failed to save config: {}", e),
        }
    }
}

/// Blit the framebuffer, letterboxed to keep its aspect ratio
fn present(renderer: &Renderer) {
    let fb = renderer.framebuffer();
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.as_rgba_bytes());
    texture.set_filter(FilterMode::Nearest);

    let scale = (screen_width() / fb.width as f32).min(screen_height() / fb.height as f32);
    let draw_w = fb.width as f32 * scale;
    let draw_h = fb.height as f32 * scale;
    let draw_x = (screen_width() - draw_w) * 0.5;
    let draw_y = (screen_height() - draw_h) * 0.5;

    draw_texture_ex(
        &texture,
        draw_x,
        draw_y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(Vec2::new(draw_w, draw_h)),
            ..Default::default()
        },
    );

    let cam = renderer.scene().camera();
    draw_text(
        &format!(
            "Cam: ({:.1}, {:.1}, {:.1}) | Rot: ({:.2}, {:.2}) | {} fps",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.angles.x,
            cam.angles.y,
            get_fps()
        ),
        draw_x + 5.0,
        draw_y + 16.0,
        16.0,
        Color::from_rgba(200, 200, 200, 255),
    );
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = load_or_default(Path::new(CONFIG_PATH));
    let mut renderer = Renderer::new(config);

    let obj_path = std::env::args().nth(1);
    let spinning = build_scene(&mut renderer, obj_path.as_deref());

    log::info!(
        "=== d3-viewer v{} === {} objects, {} faces",
        VERSION,
        renderer.scene().len(),
        renderer.geometry().faces().len()
    );

    loop {
        let frame_start = get_time();
        let dt = get_frame_time();

        let input = FrameInput::gather();
        if input.quit {
            break;
        }
        apply_input(&mut renderer, &input, dt);

        for &id in &spinning {
            renderer.scene_mut().transform_mut(id).angles.y += SPIN_SPEED * dt;
        }

        if let Err(e) = renderer.render_frame() {
            log::error!("render failed: {}", e);
            break;
        }

        clear_background(Color::from_rgba(30, 30, 35, 255));
        present(&renderer);

        // macroquad only syncs to vblank; cap to the configured rate on desktop
        #[cfg(not(target_arch = "wasm32"))]
        {
            let target_fps = renderer.config.target_fps;
            if target_fps > 0 {
                let budget = 1.0 / target_fps as f64;
                let elapsed = get_time() - frame_start;
                if elapsed < budget {
                    std::thread::sleep(std::time::Duration::from_secs_f64(budget - elapsed));
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        let _ = frame_start;

        next_frame().await;
    }
}
