//! Switching clipping on, off and inside out for the editable objects.

use log::info;

use super::registry::PlaneRegistry;
use super::{clippable_objects, plane_objects};
use crate::math::Plane;
use crate::scene::{NodeId, Scene};

/// Clipping state of an editor session.
#[derive(Debug, Clone, Default)]
pub struct ClipToggleController {
    enabled: bool,
    registry: PlaneRegistry,
}

impl ClipToggleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn planes(&self) -> &[Plane] {
        self.registry.planes()
    }

    pub fn registry(&self) -> &PlaneRegistry {
        &self.registry
    }

    /// Flips clipping for the objects of `group` and returns the new state.
    ///
    /// The plane set is rebuilt from the plane objects currently in `group`.
    /// Each clippable mesh toggles on its own: a mesh without planes gets the
    /// full set in union mode, a mesh that already has planes loses them.
    /// An empty plane set is valid and leaves every mesh unclipped.
    pub fn toggle_clipping(&mut self, scene: &mut Scene, group: NodeId) -> bool {
        self.enabled = !self.enabled;

        let planes = plane_objects(scene, group);
        self.registry.rebuild(scene, &planes);
        info!(
            "clipping {} with {} plane(s)",
            if self.enabled { "on" } else { "off" },
            self.registry.len()
        );

        for node in clippable_objects(scene, group) {
            let Some(mesh) = scene.mesh_mut(node) else {
                continue;
            };
            let material = &mut mesh.material;
            if material.clipping_planes.is_empty() {
                material.clipping_planes = self.registry.planes().to_vec();
                material.clip_intersection = false;
            } else {
                material.clipping_planes.clear();
            }
        }

        if !self.enabled {
            self.registry.clear();
        }
        self.enabled
    }

    /// Negates every plane in place and flips each clippable mesh's
    /// intersection mode, switching between the inside and the outside of
    /// the cut without rebuilding the planes.
    ///
    /// Each mesh negates its own list, which may differ from the registry
    /// once the toggle has gone out of step with the meshes.
    pub fn negate_clipping(&mut self, scene: &mut Scene, group: NodeId) {
        self.registry.negate_all();

        for node in clippable_objects(scene, group) {
            let Some(mesh) = scene.mesh_mut(node) else {
                continue;
            };
            let material = &mut mesh.material;
            for plane in &mut material.clipping_planes {
                plane.negate();
            }
            material.clip_intersection = !material.clip_intersection;
        }
        info!("clipping negated");
    }
}
