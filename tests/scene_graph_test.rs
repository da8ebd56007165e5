use glider::data_structures::mesh::MeshBuffers;
use glider::data_structures::scene_graph::SceneGraph;
use glider::renderer::NodeUniform;
use glider::transform::{Mat4, rotate_y, translate};

const TOL: f32 = 1e-5;

fn recording_traverse(
    graph: &SceneGraph<&'static str>,
    root: glider::data_structures::scene_graph::NodeIndex,
    parent: &Mat4,
) -> Vec<(&'static str, Mat4)> {
    let mut visits = Vec::new();
    graph.traverse(root, parent, |_, world, name| {
        visits.push((*name, *world));
    });
    visits
}

#[test]
fn child_world_composes_parent_world_with_child_local() {
    let mut graph = SceneGraph::new();
    let r = translate(0.0, 0.0, -5.0);
    let c = rotate_y(90.0);
    let root = graph.insert(r, "root");
    let child = graph.insert(c, "child");
    graph.add_child(root, child);

    let visits = recording_traverse(&graph, root, &Mat4::identity());
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].0, "root");
    assert!(visits[0].1.approx_eq(&r, TOL));
    assert_eq!(visits[1].0, "child");
    assert!(visits[1].1.approx_eq(&(r * c), TOL));
}

#[test]
fn siblings_share_the_parent_frame_not_each_others() {
    let mut graph = SceneGraph::new();
    let p = translate(1.0, 0.0, 0.0);
    let a = translate(0.0, 2.0, 0.0);
    let b = translate(0.0, 0.0, 3.0);
    let root = graph.insert(p, "root");
    let first = graph.insert(a, "first");
    let second = graph.insert(b, "second");
    graph.add_child(root, first);
    graph.add_sibling(first, second);

    let visits = recording_traverse(&graph, root, &Mat4::identity());
    assert_eq!(
        visits.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
        vec!["root", "first", "second"]
    );
    // The second sibling composes with the root's world, untouched by the
    // first sibling's transform.
    assert!(visits[2].1.approx_eq(&(p * b), TOL));
}

#[test]
fn children_are_visited_in_insertion_order_before_uncles() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Mat4::identity(), "root");
    let child_a = graph.insert(Mat4::identity(), "child_a");
    let child_b = graph.insert(Mat4::identity(), "child_b");
    let grandchild = graph.insert(Mat4::identity(), "grandchild");
    let uncle = graph.insert(Mat4::identity(), "uncle");
    graph.add_child(root, child_a);
    graph.add_child(root, child_b);
    graph.add_child(child_a, grandchild);
    graph.add_sibling(root, uncle);

    let visits = recording_traverse(&graph, root, &Mat4::identity());
    assert_eq!(
        visits.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
        vec!["root", "child_a", "grandchild", "child_b", "uncle"]
    );
}

#[test]
fn root_model_applies_above_the_root_local() {
    let mut graph = SceneGraph::new();
    let local = rotate_y(45.0);
    let root = graph.insert(local, "root");
    let model = translate(0.0, 10.0, 0.0);

    let visits = recording_traverse(&graph, root, &model);
    assert!(visits[0].1.approx_eq(&(model * local), TOL));
}

// End to end at the CPU boundary: a root quad at the origin with a child
// quad one unit along X produces exactly two visits, the first with the
// root's local matrix as its world and the second with the composed one.
#[test]
fn two_quad_tree_packs_exactly_two_uniform_blocks() {
    let mut graph = SceneGraph::new();
    let r = translate(0.0, 0.0, 0.0);
    let c = translate(1.0, 0.0, 0.0);
    let root = graph.insert(r, MeshBuffers::unit_quad());
    let child = graph.insert(c, MeshBuffers::unit_quad());
    graph.add_child(root, child);

    let view = Mat4::identity();
    let proj = Mat4::identity();
    let mut packed = Vec::new();
    graph.traverse(root, &Mat4::identity(), |_, world, mesh| {
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 2, 1]);
        packed.push(NodeUniform::pack(world, &view, &proj, [0.0, 1.0, 0.0, 0.0]));
    });

    assert_eq!(packed.len(), 2);
    // Column-major world matrices: translation sits in the fourth column.
    assert_eq!(packed[0].world[3], [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(packed[1].world[3], [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(packed[0].view, Mat4::identity().to_columns_2d());
}

#[test]
fn set_local_changes_the_next_traversal() {
    let mut graph = SceneGraph::new();
    let root = graph.insert(Mat4::identity(), "root");
    graph.set_local(root, translate(0.0, 5.0, 0.0));

    let visits = recording_traverse(&graph, root, &Mat4::identity());
    assert!(visits[0].1.approx_eq(&translate(0.0, 5.0, 0.0), TOL));
}
