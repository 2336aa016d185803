//! Editor session.
//!
//! [`EditorSession`] owns everything the viewer mutates: the scene, the
//! `objects` group holding models and plane objects, the clipping state, the
//! controllers and their selections. Panel actions and controller events are
//! methods on the session; nothing lives in globals.

use std::path::Path;
use std::rc::Rc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::clipping::{self, ClipToggleController};
use crate::config::ViewerConfig;
use crate::controller::Controller;
use crate::light::Lighting;
use crate::material::{Material, Side};
use crate::math::Vec3;
use crate::mesh::Geometry;
use crate::raycast;
use crate::scene::{Node, NodeId, NodeRole, Scene, SceneError};
use crate::stl::LoadError;
use crate::transform::Transform;

/// Name of the group holding models and plane objects.
pub const OBJECTS_GROUP_NAME: &str = "objects";
/// Name given to every plane object.
pub const PLANE_NAME: &str = "plane";
/// Range of the scale slider.
pub const SCALE_RANGE: (f32, f32) = (-5.0, 5.0);
/// Index of the controller that picks and grabs.
pub const ACTIVE_CONTROLLER: usize = 1;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Values the session needs from the viewer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub mesh_color: u32,
    pub plane_color: u32,
    pub plane_size: f32,
    pub spawn_position: Vec3,
    pub floor_color: u32,
    pub floor_size: f32,
    pub capping: bool,
    pub cap_size: f32,
    pub ray_length: f32,
}

impl From<&ViewerConfig> for SessionSettings {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            mesh_color: config.scene.mesh_color.0,
            plane_color: config.scene.plane_color.0,
            plane_size: config.scene.plane_size,
            spawn_position: config.scene.spawn_position(),
            floor_color: config.scene.floor_color.0,
            floor_size: config.scene.floor_size,
            capping: config.clipping.capping,
            cap_size: config.clipping.cap_size,
            ray_length: config.controller.ray_length,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

pub struct EditorSession {
    scene: Scene,
    objects: NodeId,
    settings: SessionSettings,
    lighting: Lighting,
    clipping: ClipToggleController,
    caps: Option<NodeId>,
    capping: bool,
    join_mesh: bool,
    object_selected: Option<NodeId>,
    intersected: Vec<NodeId>,
    controllers: [Controller; 2],
}

impl EditorSession {
    /// Builds the initial scene: floor, `objects` group and two controllers.
    pub fn new(settings: SessionSettings) -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        let root = scene.root();

        let mut floor_transform = Transform::new();
        floor_transform.rotate_x(-std::f32::consts::FRAC_PI_2);
        let floor = Node::mesh(
            "floor",
            Rc::new(Geometry::plane(settings.floor_size, settings.floor_size)),
            Material::standard(settings.floor_color, Side::Front),
        )
        .with_role(NodeRole::Helper)
        .with_transform(floor_transform);
        scene.add_child(root, floor)?;

        let objects = scene.add_child(root, Node::group(OBJECTS_GROUP_NAME))?;

        // Only the second controller points; the first one's ray stays hidden.
        let primary = Controller::spawn(&mut scene, "controller1", settings.ray_length)?;
        primary.set_line_visible(&mut scene, false);
        let secondary = Controller::spawn(&mut scene, "controller2", settings.ray_length)?;

        Ok(Self {
            scene,
            objects,
            capping: settings.capping,
            settings,
            lighting: Lighting::default(),
            clipping: ClipToggleController::new(),
            caps: None,
            join_mesh: false,
            object_selected: None,
            intersected: Vec::new(),
            controllers: [primary, secondary],
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn objects(&self) -> NodeId {
        self.objects
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn clipping(&self) -> &ClipToggleController {
        &self.clipping
    }

    pub fn is_clipping(&self) -> bool {
        self.clipping.is_enabled()
    }

    pub fn is_capping(&self) -> bool {
        self.capping
    }

    pub fn is_join_mesh(&self) -> bool {
        self.join_mesh
    }

    /// Container of the current stencil caps, if any.
    pub fn caps(&self) -> Option<NodeId> {
        self.caps
    }

    /// Object the scale slider acts on.
    pub fn object_selected(&self) -> Option<NodeId> {
        self.object_selected
    }

    pub fn controller(&self, index: usize) -> Option<&Controller> {
        self.controllers.get(index)
    }

    /// Nodes highlighted by the last frame's raycast.
    pub fn intersected(&self) -> &[NodeId] {
        &self.intersected
    }

    /// Models currently in the objects group.
    pub fn models(&self) -> Vec<NodeId> {
        clipping::clippable_objects(&self.scene, self.objects)
    }

    /// Plane objects, in creation order.
    pub fn planes(&self) -> Vec<NodeId> {
        clipping::plane_objects(&self.scene, self.objects)
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Reads an STL file and adds it as a model named after the file stem.
    pub fn load_stl(&mut self, path: &Path) -> Result<NodeId, EditorError> {
        let geometry = Geometry::from_stl_file(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".into());
        info!(
            "loaded {} ({} triangles)",
            path.display(),
            geometry.triangle_count()
        );
        Ok(self.add_model(&name, geometry)?)
    }

    /// Adds a double sided model at the spawn position.
    pub fn add_model(&mut self, name: &str, geometry: Geometry) -> Result<NodeId, SceneError> {
        let mut transform = Transform::new();
        transform.set_position(self.settings.spawn_position);
        let node = Node::mesh(
            name,
            Rc::new(geometry),
            Material::standard(self.settings.mesh_color, Side::Double),
        )
        .with_transform(transform);
        self.scene.add_child(self.objects, node)
    }

    /// Adds a square plane object at the spawn position, facing +Z.
    pub fn add_plane(&mut self) -> Result<NodeId, SceneError> {
        let mut transform = Transform::new();
        transform.set_position(self.settings.spawn_position);
        let size = self.settings.plane_size;
        let node = Node::mesh(
            PLANE_NAME,
            Rc::new(Geometry::plane(size, size)),
            Material::standard(self.settings.plane_color, Side::Double),
        )
        .with_role(NodeRole::ClipPlane)
        .with_transform(transform);
        let id = self.scene.add_child(self.objects, node)?;
        info!("added plane ({} total)", self.planes().len());
        Ok(id)
    }

    /// Flips the visibility of every plane object.
    pub fn hide_planes(&mut self) {
        for plane in self.planes() {
            if let Some(node) = self.scene.get_mut(plane) {
                node.visible = !node.visible;
            }
        }
    }

    /// Applies a uniform scale to the selected object.
    ///
    /// The value is clamped to [`SCALE_RANGE`]. Without a selection this is a
    /// no-op and returns false. Caps follow the new size.
    pub fn set_scale(&mut self, value: f32) -> Result<bool, SceneError> {
        let value = value.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        let Some(node) = self.object_selected.and_then(|id| self.scene.get_mut(id)) else {
            warn!("scale {value}: no object selected");
            return Ok(false);
        };
        node.transform.set_scale_uniform(value);
        debug!("scaled {} to {value}", node.name);
        if self.caps.is_some() {
            self.refresh_caps()?;
        }
        Ok(true)
    }

    // =========================================================================
    // Clipping
    // =========================================================================

    /// Toggles clipping of the models by the plane objects.
    pub fn toggle_clipping(&mut self) -> Result<bool, SceneError> {
        let enabled = self.clipping.toggle_clipping(&mut self.scene, self.objects);
        self.refresh_caps()?;
        Ok(enabled)
    }

    /// Swaps the kept and clipped sides of every plane.
    pub fn negate_clipping(&mut self) -> Result<(), SceneError> {
        self.clipping.negate_clipping(&mut self.scene, self.objects);
        self.refresh_caps()
    }

    pub fn toggle_join_mesh(&mut self) -> bool {
        self.join_mesh = !self.join_mesh;
        info!("join mesh {}", if self.join_mesh { "on" } else { "off" });
        self.join_mesh
    }

    pub fn toggle_capping(&mut self) -> Result<bool, SceneError> {
        self.capping = !self.capping;
        info!("capping {}", if self.capping { "on" } else { "off" });
        self.refresh_caps()?;
        Ok(self.capping)
    }

    /// Drops the current caps and builds new ones while clipping and capping
    /// are both on.
    fn refresh_caps(&mut self) -> Result<(), SceneError> {
        if let Some(container) = self.caps.take() {
            self.scene.remove_subtree(container);
        }
        if self.capping && self.clipping.is_enabled() {
            let container =
                clipping::add_caps(&mut self.scene, self.objects, self.settings.cap_size)?;
            self.caps = Some(container);
        }
        Ok(())
    }

    // =========================================================================
    // Controllers
    // =========================================================================

    /// Points a controller along a world-space ray.
    pub fn point_controller(&mut self, index: usize, ray: &raycast::Ray) {
        if let Some(controller) = self.controllers.get(index) {
            controller.set_pose_from_ray(&mut self.scene, ray);
        }
    }

    fn pick(&self, index: usize) -> Option<raycast::Intersection> {
        let controller = self.controllers.get(index)?;
        let ray = controller.ray(&self.scene);
        let candidates = self.scene.children(self.objects);
        raycast::intersect_objects(&self.scene, candidates, &ray)
            .into_iter()
            .next()
    }

    fn set_emissive(&mut self, node: NodeId, apply: impl Fn(&mut Vec3)) {
        if let Some(mesh) = self.scene.mesh_mut(node) {
            apply(&mut mesh.material.emissive);
        }
    }

    /// Starts a grab with a controller.
    ///
    /// Ignored while clipping is on or while the controller already holds
    /// something. The nearest object under the ray is marked and attached to
    /// the controller; with join mesh on the whole objects group is grabbed.
    pub fn select_start(&mut self, index: usize) -> Result<(), SceneError> {
        if self.clipping.is_enabled() {
            debug!("select ignored while clipping");
            return Ok(());
        }
        if self.controllers.get(index).map_or(true, Controller::is_holding) {
            return Ok(());
        }
        let Some(hit) = self.pick(index) else {
            return Ok(());
        };

        let target = if self.join_mesh {
            for child in self.scene.children(self.objects).to_vec() {
                self.set_emissive(child, |e| e.z = 1.0);
            }
            self.objects
        } else {
            self.set_emissive(hit.node, |e| e.z = 1.0);
            self.object_selected = Some(hit.node);
            hit.node
        };

        self.controllers[index].grab(&mut self.scene, target)?;
        debug!("controller {index} grabbed {target:?}");
        Ok(())
    }

    /// Releases whatever the controller holds.
    ///
    /// A single mesh goes back into the objects group; the grabbed objects
    /// group goes back under the scene root. Both keep their world placement.
    pub fn select_end(&mut self, index: usize) -> Result<(), SceneError> {
        let Some(object) = self
            .controllers
            .get_mut(index)
            .and_then(Controller::take_selected)
        else {
            return Ok(());
        };
        let Some(is_mesh) = self.scene.get(object).map(|node| node.is_mesh()) else {
            return Ok(());
        };

        if is_mesh {
            self.set_emissive(object, |e| e.z = 0.0);
            self.scene.attach(object, self.objects)?;
        } else {
            for child in self.scene.children(object).to_vec() {
                self.set_emissive(child, |e| e.z = 0.0);
            }
            let root = self.scene.root();
            self.scene.attach(object, root)?;
        }
        debug!("controller {index} released {object:?}");
        Ok(())
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Per-frame hover feedback, run once before drawing.
    ///
    /// Clears last frame's highlights, then raycasts the active controller
    /// unless it is holding something: the nearest hit is highlighted and the
    /// ray line ends on it, otherwise the line gets its full length.
    pub fn update_frame(&mut self) {
        for node in std::mem::take(&mut self.intersected) {
            self.set_emissive(node, |e| e.x = 0.0);
        }

        let Some(controller) = self.controllers.get(ACTIVE_CONTROLLER) else {
            return;
        };
        if controller.is_holding() {
            return;
        }

        let length = match self.pick(ACTIVE_CONTROLLER) {
            Some(hit) => {
                self.set_emissive(hit.node, |e| e.x = 1.0);
                self.intersected.push(hit.node);
                hit.distance
            }
            None => self.settings.ray_length,
        };
        self.controllers[ACTIVE_CONTROLLER].set_line_length(&mut self.scene, length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;
    use approx::assert_relative_eq;

    fn session_with_cube() -> (EditorSession, NodeId) {
        let mut session = EditorSession::new(SessionSettings::default()).unwrap();
        let cube = session
            .add_model("cube", Geometry::cuboid(1.0, 1.0, 1.0))
            .unwrap();
        (session, cube)
    }

    fn aim_at(session: &mut EditorSession, target: Vec3) {
        let origin = Vec3::new(0.0, 1.0, 2.0);
        session.point_controller(ACTIVE_CONTROLLER, &raycast::Ray::new(origin, target - origin));
    }

    fn emissive(session: &EditorSession, node: NodeId) -> Vec3 {
        session.scene().mesh(node).unwrap().material.emissive
    }

    #[test]
    fn models_spawn_double_sided() {
        let (session, cube) = session_with_cube();
        let node = session.scene().get(cube).unwrap();
        assert_eq!(node.transform.position(), Vec3::new(1.0, 1.0, -1.0));
        assert_eq!(node.as_mesh().unwrap().material.side, Side::Double);
        assert_eq!(session.models(), vec![cube]);
    }

    #[test]
    fn planes_are_not_models() {
        let (mut session, cube) = session_with_cube();
        let plane = session.add_plane().unwrap();
        assert_eq!(session.models(), vec![cube]);
        assert_eq!(session.planes(), vec![plane]);
        assert_eq!(session.scene().get(plane).unwrap().name, PLANE_NAME);
    }

    #[test]
    fn hide_planes_toggles_visibility() {
        let (mut session, _) = session_with_cube();
        let plane = session.add_plane().unwrap();
        session.hide_planes();
        assert!(!session.scene().get(plane).unwrap().visible);
        session.hide_planes();
        assert!(session.scene().get(plane).unwrap().visible);
    }

    #[test]
    fn hover_highlights_and_shortens_ray() {
        let (mut session, cube) = session_with_cube();
        aim_at(&mut session, Vec3::new(1.0, 1.0, -1.0));
        session.update_frame();
        assert_eq!(session.intersected(), &[cube]);
        assert_eq!(emissive(&session, cube).x, 1.0);

        let controller = session.controller(ACTIVE_CONTROLLER).unwrap();
        let length = controller.line_length(session.scene());
        assert!(length < 5.0 && length > 1.0);

        aim_at(&mut session, Vec3::new(-3.0, 1.0, 0.0));
        session.update_frame();
        assert!(session.intersected().is_empty());
        assert_eq!(emissive(&session, cube).x, 0.0);
        let controller = session.controller(ACTIVE_CONTROLLER).unwrap();
        assert_relative_eq!(controller.line_length(session.scene()), 5.0);
    }

    #[test]
    fn grab_and_release_single_object() {
        let (mut session, cube) = session_with_cube();
        aim_at(&mut session, Vec3::new(1.0, 1.0, -1.0));
        session.select_start(ACTIVE_CONTROLLER).unwrap();

        let controller = session.controller(ACTIVE_CONTROLLER).unwrap().node();
        assert_eq!(session.scene().parent(cube), Some(controller));
        assert_eq!(session.object_selected(), Some(cube));
        assert_eq!(emissive(&session, cube).z, 1.0);

        // Turning the controller swings the object around it.
        session
            .scene_mut()
            .get_mut(controller)
            .unwrap()
            .transform
            .set_rotation(Quat::from_rotation_y(0.5));
        let moved = session.scene().world_matrix(cube).translation_part();

        session.select_end(ACTIVE_CONTROLLER).unwrap();
        assert_eq!(session.scene().parent(cube), Some(session.objects()));
        assert_eq!(emissive(&session, cube).z, 0.0);
        let released = session.scene().world_matrix(cube).translation_part();
        assert_relative_eq!(moved.x, released.x, epsilon = 1e-4);
        assert_relative_eq!(moved.z, released.z, epsilon = 1e-4);
    }

    #[test]
    fn join_mesh_grabs_whole_group() {
        let (mut session, cube) = session_with_cube();
        let plane = session.add_plane().unwrap();
        session.toggle_join_mesh();
        aim_at(&mut session, Vec3::new(1.0, 1.0, -1.0));
        session.select_start(ACTIVE_CONTROLLER).unwrap();

        let controller = session.controller(ACTIVE_CONTROLLER).unwrap().node();
        assert_eq!(session.scene().parent(session.objects()), Some(controller));
        assert_eq!(emissive(&session, cube).z, 1.0);
        assert_eq!(emissive(&session, plane).z, 1.0);
        assert_eq!(session.object_selected(), None);

        session.select_end(ACTIVE_CONTROLLER).unwrap();
        let root = session.scene().root();
        assert_eq!(session.scene().parent(session.objects()), Some(root));
        assert_eq!(emissive(&session, plane).z, 0.0);
    }

    #[test]
    fn select_is_ignored_while_clipping() {
        let (mut session, cube) = session_with_cube();
        session.toggle_clipping().unwrap();
        aim_at(&mut session, Vec3::new(1.0, 1.0, -1.0));
        session.select_start(ACTIVE_CONTROLLER).unwrap();
        assert_eq!(session.scene().parent(cube), Some(session.objects()));
        assert!(!session.controller(ACTIVE_CONTROLLER).unwrap().is_holding());
    }

    #[test]
    fn scale_without_selection_is_a_no_op() {
        let (mut session, cube) = session_with_cube();
        assert!(!session.set_scale(2.0).unwrap());
        assert_eq!(session.scene().get(cube).unwrap().transform.scale(), Vec3::ONE);
    }

    #[test]
    fn scale_applies_to_selected_and_clamps() {
        let (mut session, cube) = session_with_cube();
        aim_at(&mut session, Vec3::new(1.0, 1.0, -1.0));
        session.select_start(ACTIVE_CONTROLLER).unwrap();
        session.select_end(ACTIVE_CONTROLLER).unwrap();

        assert!(session.set_scale(9.0).unwrap());
        let scale = session.scene().get(cube).unwrap().transform.scale();
        assert_relative_eq!(scale.x, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn caps_follow_clipping_state() {
        let (mut session, _) = session_with_cube();
        session.add_plane().unwrap();

        session.toggle_clipping().unwrap();
        let first = session.caps().unwrap();
        assert_eq!(session.scene().children(first).len(), 2);

        session.negate_clipping().unwrap();
        let second = session.caps().unwrap();
        assert!(!session.scene().contains(first));

        session.toggle_clipping().unwrap();
        assert!(session.caps().is_none());
        assert!(!session.scene().contains(second));
    }

    #[test]
    fn capping_can_be_switched_off() {
        let (mut session, _) = session_with_cube();
        session.add_plane().unwrap();
        assert!(!session.toggle_capping().unwrap());
        session.toggle_clipping().unwrap();
        assert!(session.caps().is_none());
        assert!(session.toggle_capping().unwrap());
        assert!(session.caps().is_some());
    }
}
