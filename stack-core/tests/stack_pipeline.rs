//! End-to-end tests: scene in, stack container out.

use glam::{Affine3A, Mat3A, Vec3};
use stack_core::{
    config::StackSettings,
    dependency::RevisionTracker,
    mesh::Mesh,
    object::StackObject,
    path::{CubicBezier, PathCurve, Polyline, Spline},
    scene::{NodeKind, Scene},
    types::NodeId,
};

struct World {
    scene: Scene,
    tracker: RevisionTracker,
    stack: StackObject,
}

fn world(settings: StackSettings) -> World {
    let mut scene = Scene::new();
    let op = scene.add_node("stack", NodeKind::Null).unwrap();
    let can = scene
        .add_node("can", NodeKind::Mesh(Mesh::cylinder(4.0, 10.0, 12)))
        .unwrap();
    scene.insert_under_last(op, can).unwrap();

    World {
        scene,
        tracker: RevisionTracker::new(),
        stack: StackObject::with_settings(op, settings),
    }
}

fn evaluate(w: &mut World) -> NodeId {
    w.stack
        .evaluate(&mut w.scene, &mut w.tracker)
        .expect("evaluation failed")
        .expect("no result")
}

fn item_transforms(scene: &Scene, container: NodeId) -> Vec<Affine3A> {
    scene
        .children(container)
        .iter()
        .map(|&c| scene.node(c).unwrap().local)
        .collect()
}

#[test]
fn three_by_three_stack_on_a_baseline() {
    env_logger::try_init().ok();

    let mut w = world(StackSettings {
        base_count: 3,
        row_count: 3,
        base_length: 90.0,
        row_height: 10.0,
        use_instancing: false,
        ..StackSettings::default()
    });
    let container = evaluate(&mut w);

    let rows: Vec<usize> = w.stack.generator().layout().items.rows().map(<[_]>::len).collect();
    assert_eq!(rows, vec![3, 2, 1]);

    let expected = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 30.0),
        Vec3::new(0.0, 0.0, 60.0),
        Vec3::new(0.0, 10.0, 15.0),
        Vec3::new(0.0, 10.0, 45.0),
        Vec3::new(0.0, 20.0, 30.0),
    ];
    let children = w.scene.children(container).to_vec();
    assert_eq!(children.len(), 6);
    for (&child, e) in children.iter().zip(expected) {
        let node = w.scene.node(child).unwrap();
        assert!(matches!(node.kind, NodeKind::Mesh(_)), "expected a deep copy");
        assert!(node.local.matrix3.abs_diff_eq(Mat3A::IDENTITY, 1e-6));
        let pos = Vec3::from(node.local.translation);
        assert!((pos - e).length() < 1e-4, "got {pos:?}, expected {e:?}");
    }
}

#[test]
fn instancing_yields_one_copy_and_five_references() {
    env_logger::try_init().ok();

    let mut w = world(StackSettings::default());
    let container = evaluate(&mut w);

    let children = w.scene.children(container).to_vec();
    assert_eq!(children.len(), 6);

    let copies: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&c| matches!(w.scene.node(c).unwrap().kind, NodeKind::Mesh(_)))
        .collect();
    assert_eq!(copies, vec![children[0]]);

    let targets: Vec<Option<NodeId>> = children[1..]
        .iter()
        .map(|&c| w.scene.instance_target(c))
        .collect();
    assert_eq!(targets, vec![Some(children[0]); 5]);
}

#[test]
fn identical_settings_reproduce_identical_matrices() {
    let settings = StackSettings {
        base_count: 6,
        row_count: 5,
        random_seed: 777,
        random_rotation: 0.4,
        random_offset_lateral: 3.0,
        random_offset_longitudinal: 2.0,
        ..StackSettings::default()
    };

    let mut a = world(settings.clone());
    let first_container = evaluate(&mut a);
    let first = item_transforms(&a.scene, first_container);

    // Force a second full pass on the same object.
    let op = a.stack.node();
    a.scene.touch(op).unwrap();
    let second_container = evaluate(&mut a);
    let second = item_transforms(&a.scene, second_container);
    assert_eq!(a.stack.regenerations(), 2);
    assert_eq!(first, second);

    // And an independent object agrees too.
    let mut b = world(settings);
    let third_container = evaluate(&mut b);
    let third = item_transforms(&b.scene, third_container);
    assert_eq!(first, third);
}

#[test]
fn changing_the_seed_changes_the_jitter() {
    let settings = StackSettings {
        random_offset_lateral: 5.0,
        ..StackSettings::default()
    };
    let mut w = world(settings.clone());
    let first_container = evaluate(&mut w);
    let first = item_transforms(&w.scene, first_container);

    let reseeded = StackSettings {
        random_seed: settings.random_seed + 1,
        ..settings
    };
    w.stack.set_settings(&mut w.scene, reseeded).unwrap();
    let second_container = evaluate(&mut w);
    let second = item_transforms(&w.scene, second_container);

    assert_ne!(first, second);
}

#[test]
fn path_items_are_spaced_by_arc_length() {
    env_logger::try_init().ok();

    let mut w = world(StackSettings {
        base_count: 5,
        row_count: 1,
        use_instancing: true,
        ..StackSettings::default()
    });

    // A straight run along Z whose natural parameter crawls at the start.
    let curve = CubicBezier::new(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(0.0, 0.0, 80.0),
    );
    let path = w
        .scene
        .add_node("path", NodeKind::Spline(Spline::Bezier(curve)))
        .unwrap();
    let settings = StackSettings {
        base_path: Some(path),
        ..w.stack.settings().clone()
    };
    w.stack.set_settings(&mut w.scene, settings).unwrap();

    let container = evaluate(&mut w);
    let positions: Vec<Vec3> = item_transforms(&w.scene, container)
        .iter()
        .map(|m| Vec3::from(m.translation))
        .collect();
    assert_eq!(positions.len(), 5);

    for pair in positions.windows(2) {
        let gap = pair[0].distance(pair[1]);
        assert!((gap - 20.0).abs() < 0.1, "corrected gap {gap}");
    }

    // Without correction the first gap would be far too short.
    let naive_gap = curve.point(0.0).distance(curve.point(0.25));
    assert!((naive_gap - 20.0).abs() > 5.0, "naive gap {naive_gap}");
}

#[test]
fn path_results_are_local_to_a_moved_stack() {
    let mut w = world(StackSettings {
        base_count: 2,
        row_count: 1,
        use_instancing: false,
        ..StackSettings::default()
    });
    let op = w.stack.node();
    w.scene
        .set_local(op, Affine3A::from_translation(Vec3::new(0.0, 0.0, -10.0)))
        .unwrap();

    let line = Polyline::new(vec![Vec3::ZERO, Vec3::Z * 10.0]).unwrap();
    let path = w
        .scene
        .add_node("line", NodeKind::Spline(Spline::Linear(line)))
        .unwrap();
    let settings = StackSettings {
        base_path: Some(path),
        ..w.stack.settings().clone()
    };
    w.stack.set_settings(&mut w.scene, settings).unwrap();

    let container = evaluate(&mut w);
    let z: Vec<f32> = item_transforms(&w.scene, container)
        .iter()
        .map(|m| m.translation.z)
        .collect();

    // World z of 0 and 10, seen from a node sitting at z = -10.
    assert!((z[0] - 10.0).abs() < 1e-4);
    assert!((z[1] - 20.0).abs() < 1e-4);
}

#[test]
fn single_item_stack_on_a_path_starts_at_the_path_start() {
    let mut w = world(StackSettings {
        base_count: 1,
        row_count: 1,
        ..StackSettings::default()
    });
    let curve = CubicBezier::new(
        Vec3::new(5.0, 0.0, 5.0),
        Vec3::new(5.0, 0.0, 20.0),
        Vec3::new(30.0, 0.0, 20.0),
        Vec3::new(30.0, 0.0, 40.0),
    );
    let path = w
        .scene
        .add_node("path", NodeKind::Spline(Spline::Bezier(curve)))
        .unwrap();
    let settings = StackSettings {
        base_path: Some(path),
        ..w.stack.settings().clone()
    };
    w.stack.set_settings(&mut w.scene, settings).unwrap();

    let container = evaluate(&mut w);
    let items = item_transforms(&w.scene, container);
    assert_eq!(items.len(), 1);
    assert!((Vec3::from(items[0].translation) - Vec3::new(5.0, 0.0, 5.0)).length() < 1e-4);
}

#[test]
fn zero_base_count_produces_nothing() {
    let mut w = world(StackSettings {
        base_count: 0,
        ..StackSettings::default()
    });

    assert!(w.stack.evaluate(&mut w.scene, &mut w.tracker).is_err());
    assert!(w.stack.cache().is_none());
    assert!(!w.stack.generator().is_ready());
}

#[test]
fn preset_json_drives_the_stack() {
    let settings: StackSettings =
        serde_json::from_str(r#"{ "base_count": 4, "row_count": 9, "use_instancing": false }"#)
            .unwrap();
    let mut w = world(settings);

    let container = evaluate(&mut w);

    // Rows are clamped to the base count: 4 + 3 + 2 + 1.
    assert_eq!(w.scene.children(container).len(), 10);
    assert_eq!(w.stack.settings().row_count, 4);
}
