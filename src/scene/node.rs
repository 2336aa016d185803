//! Scene graph nodes.

use std::rc::Rc;

use crate::material::Material;
use crate::math::Vec3;
use crate::mesh::Geometry;
use crate::transform::Transform;

use super::NodeId;

/// What a mesh stands for in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
    /// A loaded model; clippable.
    #[default]
    Model,
    /// A user-placed plane object that defines a clip plane.
    ClipPlane,
    /// Scene furniture (floor, stencil passes, caps). Never picked or clipped.
    Helper,
}

#[derive(Debug, Clone)]
pub struct MeshData {
    pub geometry: Rc<Geometry>,
    pub material: Material,
    pub role: NodeRole,
    /// Reset the whole stencil buffer right after this mesh is drawn.
    pub clear_stencil_after: bool,
}

/// A line segment in the node's local space, drawn unlit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineData {
    pub start: Vec3,
    pub end: Vec3,
    pub color: u32,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(MeshData),
    Line(LineData),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    /// Hidden nodes hide their whole subtree.
    pub visible: bool,
    /// Draw order key; lower values are drawn first.
    pub render_order: f32,
    pub kind: NodeKind,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            render_order: 0.0,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Rc<Geometry>, material: Material) -> Self {
        Self::with_kind(
            name,
            NodeKind::Mesh(MeshData {
                geometry,
                material,
                role: NodeRole::Model,
                clear_stencil_after: false,
            }),
        )
    }

    pub fn line(name: impl Into<String>, start: Vec3, end: Vec3, color: u32) -> Self {
        Self::with_kind(name, NodeKind::Line(LineData { start, end, color }))
    }

    /// Sets the mesh role; no effect on groups and lines.
    pub fn with_role(mut self, role: NodeRole) -> Self {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            mesh.role = role;
        }
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_render_order(mut self, render_order: f32) -> Self {
        self.render_order = render_order;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    /// Role of a mesh node, `None` for groups and lines.
    pub fn role(&self) -> Option<NodeRole> {
        self.as_mesh().map(|mesh| mesh.role)
    }
}
