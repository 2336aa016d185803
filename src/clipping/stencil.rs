//! Stencil capping of clipped meshes.
//!
//! Cutting a closed mesh with a plane leaves a hole where the interior would
//! show. For every (mesh, plane) pair the hole is filled in two steps:
//!
//! 1. The mesh is drawn twice into the stencil buffer only, clipped by that
//!    single plane: back faces increment the counter, front faces decrement
//!    it. Pixels where the plane cuts through solid material end up non-zero.
//! 2. A large quad lying in the plane is drawn where the counter is non-zero,
//!    clipped by every other plane, in the mesh's color. The stencil buffer is
//!    cleared right after so the next pair starts from zero.

use std::rc::Rc;

use log::debug;

use super::clippable_objects;
use crate::material::{Material, Side, StencilFunc, StencilOp, StencilState};
use crate::math::Plane;
use crate::mesh::Geometry;
use crate::scene::{Node, NodeId, NodeRole, Scene, SceneError};
use crate::transform::Transform;

/// Name of the container owning every stencil group and cap.
pub const CLIPPING_GROUP_NAME: &str = "ClippingGroup";

/// Render order gap between a pair's stencil passes and its cap.
const CAP_ORDER_OFFSET: f32 = 0.1;

fn stencil_pass(side: Side, plane: Plane, op: StencilOp) -> Material {
    Material {
        side,
        clipping_planes: vec![plane],
        stencil: StencilState::with_ops(StencilFunc::Always, 0, op),
        depth_test: false,
        depth_write: false,
        color_write: false,
        lit: false,
        ..Material::default()
    }
}

/// Adds a group named `planeStencilGroup{mesh_name}` under `parent` holding
/// the `back` (increment) and `front` (decrement) stencil passes of
/// `geometry` clipped by `plane`.
///
/// Both passes share `geometry` and are placed with `placement`, which should
/// be the source mesh's world transform when `parent` sits at the origin.
pub fn build_stencil_group(
    scene: &mut Scene,
    parent: NodeId,
    mesh_name: &str,
    placement: Transform,
    geometry: Rc<Geometry>,
    plane: Plane,
    render_order: f32,
) -> Result<NodeId, SceneError> {
    let group = scene.add_child(parent, Node::group(format!("planeStencilGroup{mesh_name}")))?;

    let passes = [
        ("back", Side::Back, StencilOp::IncrementWrap),
        ("front", Side::Front, StencilOp::DecrementWrap),
    ];
    for (name, side, op) in passes {
        let pass = Node::mesh(name, Rc::clone(&geometry), stencil_pass(side, plane, op))
            .with_role(NodeRole::Helper)
            .with_transform(placement)
            .with_render_order(render_order);
        scene.add_child(group, pass)?;
    }
    Ok(group)
}

/// Builds the cap for `planes[index]`, named `Clipping{mesh_name}`.
///
/// The cap is a `size` x `size` square in that plane, centered on the plane's
/// point closest to the origin, with its +Z axis along the inverted normal.
/// It is clipped by all other planes with the given intersection mode and
/// only drawn where the stencil counter is non-zero. Returns `None` when
/// `index` is out of range.
pub fn build_cap_mesh(
    mesh_name: &str,
    planes: &[Plane],
    index: usize,
    color: u32,
    render_order: f32,
    intersection: bool,
    size: f32,
) -> Option<Node> {
    let plane = planes.get(index)?;
    let others = planes
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, other)| *other)
        .collect();

    let material = Material {
        clipping_planes: others,
        clip_intersection: intersection,
        stencil: StencilState::with_ops(StencilFunc::NotEqual, 0, StencilOp::Replace),
        ..Material::standard(color, Side::Double)
    };

    let position = plane.coplanar_point();
    let mut transform = Transform::new();
    transform
        .set_position(position)
        .look_at(position - plane.normal);

    let mut cap = Node::mesh(
        format!("Clipping{mesh_name}"),
        Rc::new(Geometry::plane(size, size)),
        material,
    )
    .with_role(NodeRole::Helper)
    .with_transform(transform)
    .with_render_order(render_order);
    if let Some(mesh) = cap.as_mesh_mut() {
        mesh.clear_stencil_after = true;
    }
    Some(cap)
}

/// Caps every clipped mesh of `group`.
///
/// A `ClippingGroup` container is added to the scene root. Each clippable
/// mesh that currently holds clip planes gets, per plane, a stencil group and
/// a cap built from its own planes and intersection mode. Render orders grow
/// by one per pair so each cap directly follows its own stencil passes.
/// Removing the container is the only teardown needed.
pub fn add_caps(scene: &mut Scene, group: NodeId, cap_size: f32) -> Result<NodeId, SceneError> {
    let container = scene.add_child(scene.root(), Node::group(CLIPPING_GROUP_NAME))?;

    let mut order = 0.0;
    for object in clippable_objects(scene, group) {
        let Some(node) = scene.get(object) else {
            continue;
        };
        let Some(mesh) = node.as_mesh() else {
            continue;
        };
        let name = node.name.clone();
        let geometry = Rc::clone(&mesh.geometry);
        let planes = mesh.material.clipping_planes.clone();
        let intersection = mesh.material.clip_intersection;
        let color = mesh.material.color;
        let placement = scene.world_transform(object);

        for (index, plane) in planes.iter().enumerate() {
            build_stencil_group(
                scene,
                container,
                &name,
                placement,
                Rc::clone(&geometry),
                *plane,
                order,
            )?;
            if let Some(cap) = build_cap_mesh(
                &name,
                &planes,
                index,
                color,
                order + CAP_ORDER_OFFSET,
                intersection,
                cap_size,
            ) {
                scene.add_child(container, cap)?;
            }
            order += 1.0;
        }
    }

    debug!("built {} stencil cap pair(s)", order as usize);
    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use approx::assert_relative_eq;

    fn planes() -> Vec<Plane> {
        vec![
            Plane::new(Vec3::Z, 0.0),
            Plane::new(Vec3::X, -0.25),
            Plane::new(-Vec3::Y, 0.5),
        ]
    }

    #[test]
    fn stencil_group_has_back_and_front_passes() {
        let mut scene = Scene::new();
        let geometry = Rc::new(Geometry::cuboid(1.0, 1.0, 1.0));
        let plane = Plane::new(Vec3::Z, 0.0);
        let root = scene.root();
        let group = build_stencil_group(
            &mut scene,
            root,
            "part",
            Transform::new(),
            Rc::clone(&geometry),
            plane,
            3.0,
        )
        .unwrap();

        assert_eq!(scene.get(group).unwrap().name, "planeStencilGrouppart");
        let children = scene.children(group);
        assert_eq!(children.len(), 2);

        let back = scene.get(children[0]).unwrap();
        let front = scene.get(children[1]).unwrap();
        assert_eq!(back.name, "back");
        assert_eq!(front.name, "front");
        assert_eq!(back.render_order, 3.0);

        for (node, side, op) in [
            (back, Side::Back, StencilOp::IncrementWrap),
            (front, Side::Front, StencilOp::DecrementWrap),
        ] {
            let mesh = node.as_mesh().unwrap();
            assert!(Rc::ptr_eq(&mesh.geometry, &geometry));
            assert_eq!(mesh.material.clipping_planes, vec![plane]);
            assert_eq!(mesh.material.side, side);
            assert_eq!(mesh.material.stencil.z_pass, op);
            assert_eq!(mesh.material.stencil.fail, op);
            assert!(!mesh.material.color_write);
            assert!(!mesh.material.depth_test);
        }
    }

    #[test]
    fn cap_is_clipped_by_the_other_planes() {
        let planes = planes();
        let cap = build_cap_mesh("part", &planes, 1, 0xFFA08A7A, 0.1, true, 2000.0).unwrap();
        let mesh = cap.as_mesh().unwrap();

        assert_eq!(cap.name, "Clippingpart");
        assert_eq!(mesh.material.clipping_planes, vec![planes[0], planes[2]]);
        assert!(mesh.material.clip_intersection);
        assert_eq!(mesh.material.color, 0xFFA08A7A);
        assert_eq!(mesh.material.stencil.func, StencilFunc::NotEqual);
        assert_eq!(mesh.material.stencil.z_pass, StencilOp::Replace);
        assert!(mesh.clear_stencil_after);
    }

    #[test]
    fn cap_lies_in_its_plane() {
        let planes = planes();
        let cap = build_cap_mesh("part", &planes, 2, 0, 0.0, false, 10.0).unwrap();
        let world = cap.transform.to_matrix();
        let mesh = cap.as_mesh().unwrap();

        for &corner in mesh.geometry.positions() {
            let p = world.transform_point(corner);
            assert_relative_eq!(planes[2].distance_to_point(p), 0.0, epsilon = 1e-4);
        }
        let facing = cap.transform.rotation().rotate(Vec3::Z);
        assert_relative_eq!(facing.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn cap_index_out_of_range() {
        assert!(build_cap_mesh("part", &planes(), 3, 0, 0.0, false, 1.0).is_none());
    }

    #[test]
    fn caps_cover_every_clipped_pair() {
        let mut scene = Scene::new();
        let group = scene.add_child(scene.root(), Node::group("objects")).unwrap();
        let mut clipped = Material::default();
        clipped.clipping_planes = planes();
        let geometry = Rc::new(Geometry::cuboid(1.0, 1.0, 1.0));
        scene
            .add_child(group, Node::mesh("a", Rc::clone(&geometry), clipped.clone()))
            .unwrap();
        scene
            .add_child(group, Node::mesh("b", Rc::clone(&geometry), clipped))
            .unwrap();
        scene
            .add_child(group, Node::mesh("c", geometry, Material::default()))
            .unwrap();

        let container = add_caps(&mut scene, group, 2000.0).unwrap();
        assert_eq!(scene.get(container).unwrap().name, CLIPPING_GROUP_NAME);
        // Two clipped meshes with three planes each; "c" has no planes.
        assert_eq!(scene.children(container).len(), 12);

        let orders: Vec<f32> = scene
            .children(container)
            .iter()
            .map(|&id| {
                let node = scene.get(id).unwrap();
                match node.children().first() {
                    Some(&pass) => scene.get(pass).unwrap().render_order,
                    None => node.render_order,
                }
            })
            .collect();
        for (order, expected) in orders.iter().zip([0.0, 0.1, 1.0, 1.1]) {
            assert_relative_eq!(*order, expected);
        }
        assert_relative_eq!(orders[11], 5.1);

        assert_eq!(scene.remove_subtree(container), 1 + 6 * 3 + 6);
        assert!(scene.find_by_name(scene.root(), CLIPPING_GROUP_NAME).is_none());
    }
}
