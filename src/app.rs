//! The viewer: editor session, camera and engine driven by one frame of input
//! at a time.
//!
//! [`Viewer`] has no window of its own, so the same code runs the desktop
//! loop and headless snapshots.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::camera::{OrbitCamera, OrbitCameraController};
use crate::config::ViewerConfig;
use crate::editor::{EditorSession, SessionSettings, ACTIVE_CONTROLLER};
use crate::engine::{Engine, FrameStats};
use crate::math::Vec3;
use crate::panel::{Panel, BINDINGS};
use crate::projection::Projection;
use crate::scene::SceneError;
use crate::window::InputState;

pub struct Viewer {
    session: EditorSession,
    panel: Panel,
    camera: OrbitCamera,
    camera_controller: OrbitCameraController,
    projection: Projection,
    engine: Engine,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Result<Self, SceneError> {
        let (width, height) = (config.window.width, config.window.height);
        let camera_config = &config.camera;

        let mut projection = Projection::from_degrees(
            camera_config.fov_degrees,
            1.0,
            camera_config.near,
            camera_config.far,
        );
        projection.resize(width, height);

        let mut engine = Engine::new(width, height);
        engine.set_background(config.scene.background.0);

        Ok(Self {
            session: EditorSession::new(SessionSettings::from(config))?,
            panel: Panel::new(config.controller.scale_step),
            camera: OrbitCamera::looking_at(
                Vec3::from(camera_config.position),
                Vec3::from(camera_config.target),
            ),
            camera_controller: OrbitCameraController::default(),
            projection,
            engine,
        })
    }

    /// Loads every file as a model. Files that fail to load are reported and
    /// skipped. Returns how many were added.
    pub fn load_files(&mut self, paths: &[PathBuf]) -> usize {
        paths
            .iter()
            .filter(|path| match self.session.load_stl(path) {
                Ok(_) => true,
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    false
                }
            })
            .count()
    }

    pub fn log_bindings(&self) {
        for (key, action) in BINDINGS {
            info!("{key:?}: {action}");
        }
        info!("left mouse: grab, right drag: orbit, wheel: zoom");
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.projection.resize(width, height);
        self.engine.resize(width, height);
    }

    /// Applies one frame of input: camera, pointer ray, selection and panel
    /// keys.
    pub fn handle_input(&mut self, input: &InputState) -> Result<(), SceneError> {
        self.camera_controller.update(&mut self.camera, input);

        let (x, y) = input.mouse_position;
        let width = self.engine.width().max(1) as f32;
        let height = self.engine.height().max(1) as f32;
        let ndc_x = 2.0 * (x as f32 + 0.5) / width - 1.0;
        let ndc_y = 1.0 - 2.0 * (y as f32 + 0.5) / height;
        let ray = self.camera.ray_through(&self.projection, ndc_x, ndc_y);
        self.session.point_controller(ACTIVE_CONTROLLER, &ray);

        if input.select_started {
            self.session.select_start(ACTIVE_CONTROLLER)?;
        }
        for &key in &input.keys_pressed {
            let action = self.panel.action_for_key(key);
            self.panel.apply(&mut self.session, action)?;
        }
        if input.select_ended {
            self.session.select_end(ACTIVE_CONTROLLER)?;
        }
        Ok(())
    }

    /// Runs the per-frame tick and draws the scene.
    pub fn frame(&mut self) -> FrameStats {
        self.session.update_frame();
        self.engine.render(
            self.session.scene(),
            &self.camera,
            &self.projection,
            self.session.lighting(),
        )
    }

    /// Renders one frame and writes it as an image; the format follows the
    /// file extension.
    pub fn save_snapshot(&mut self, path: &Path) -> image::ImageResult<()> {
        self.frame();
        image::save_buffer(
            path,
            &self.engine.to_rgba(),
            self.engine.width(),
            self.engine.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        info!("wrote snapshot {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::Key;

    fn small_config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.window.width = 80;
        config.window.height = 60;
        config
    }

    #[test]
    fn missing_files_are_skipped() {
        let mut viewer = Viewer::new(&small_config()).unwrap();
        let loaded = viewer.load_files(&[PathBuf::from("/nonexistent/part.stl")]);
        assert_eq!(loaded, 0);
        assert!(viewer.session().models().is_empty());
    }

    #[test]
    fn keys_drive_the_panel() {
        let mut viewer = Viewer::new(&small_config()).unwrap();
        let input = InputState {
            keys_pressed: vec![Key::P, Key::C],
            ..InputState::default()
        };
        viewer.handle_input(&input).unwrap();
        assert_eq!(viewer.session().planes().len(), 1);
        assert!(viewer.session().is_clipping());
    }

    #[test]
    fn frame_renders_the_floor() {
        let mut viewer = Viewer::new(&small_config()).unwrap();
        let stats = viewer.frame();
        assert!(stats.meshes >= 1);
        assert!(stats.triangles > 0);
    }

    #[test]
    fn resize_updates_the_engine() {
        let mut viewer = Viewer::new(&small_config()).unwrap();
        viewer.resize(40, 20);
        assert_eq!(viewer.engine().width(), 40);
        viewer.resize(0, 20);
        assert_eq!(viewer.engine().width(), 40);
    }
}
