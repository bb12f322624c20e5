use super::*;
use crate::report::CollectingReporter;

const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

fn parse(text: &str, options: ObjOptions) -> (Vec<AssembledMesh>, CollectingReporter) {
    let reporter = CollectingReporter::new();
    let meshes = parse_obj(text, "test", options, &reporter).unwrap();
    (meshes, reporter)
}

#[test]
fn test_quad_is_fanned() {
    let (meshes, reporter) = parse(QUAD, ObjOptions::default());
    assert!(reporter.is_empty());
    assert_eq!(meshes.len(), 1);

    let mesh = &meshes[0];
    assert_eq!(mesh.name(), "test");
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.groups()[0].material, "off");
    assert_eq!(mesh.groups()[0].indices, vec![0, 1, 2, 0, 2, 3]);

    let names: Vec<&str> = mesh.attributes().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec![POSITION, NORMAL, TEXTURE]);
    assert_eq!(
        mesh.attribute(TEXTURE).unwrap().vertex(2),
        Some(&[1.0, 1.0][..])
    );
}

#[test]
fn test_negative_indices_and_homogeneous_positions() {
    let text = "\
v 2 2 2 2
v 1 0 0
v 0 1 0
f -3 -2 -1
";
    let (meshes, _) = parse(text, ObjOptions::default());
    let mesh = &meshes[0];
    assert_eq!(mesh.attributes().len(), 1);
    assert_eq!(
        mesh.attribute(POSITION).unwrap().vertex(0),
        Some(&[1.0, 1.0, 1.0][..])
    );
    assert_eq!(mesh.groups()[0].indices, vec![0, 1, 2]);
}

#[test]
fn test_zero_w_keeps_coordinates() {
    let text = "\
v 1 2 3 0
v 1 0 0
v 0 1 0
f 1 2 3
";
    let (meshes, _) = parse(text, ObjOptions::default());
    let position = meshes[0].attribute(POSITION).unwrap().vertex(0).unwrap();
    assert!(position.iter().all(|c| c.is_finite()));
    assert_eq!(position, &[1.0, 2.0, 3.0][..]);
}

#[test]
fn test_comments_and_continuations() {
    let text = "\
v 0 0 0 # origin
v 1 0 \\
  0
v 0 1 0
f 1 2 \\
3
";
    let (meshes, _) = parse(text, ObjOptions::default());
    assert_eq!(meshes[0].triangle_count(), 1);
    assert_eq!(
        meshes[0].attribute(POSITION).unwrap().vertex(1),
        Some(&[1.0, 0.0, 0.0][..])
    );
}

#[test]
fn test_materials_group_faces() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
usemtl stone
f 1 2 3
usemtl unused
usemtl wood
f 3 2 1
usemtl stone
f 1 3 2
";
    let (meshes, _) = parse(text, ObjOptions::default());
    let groups: Vec<(&str, usize)> = meshes[0]
        .groups()
        .iter()
        .map(|g| (g.material.as_str(), g.triangle_count()))
        .collect();
    assert_eq!(groups, vec![("stone", 2), ("wood", 1)]);
}

#[test]
fn test_smoothing_groups_split_unnormaled_corners() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vn 0 0 1
s 2
f 1 2 3
s off
f 2 4 3
";
    let (meshes, _) = parse(text, ObjOptions::default());
    let mesh = &meshes[0];
    // Corners 2 and 3 appear in both smoothing contexts and do not weld
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(
        mesh.attribute(NORMAL).unwrap().vertex(0),
        Some(&[0.0, 0.0, 0.0][..])
    );
}

#[test]
fn test_objects_split_only_in_multiple_mode() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
o first
usemtl red
f 1 2 3
o second
f 3 2 1
";
    let (single, _) = parse(text, ObjOptions::default());
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].triangle_count(), 2);

    let (multiple, _) = parse(
        text,
        ObjOptions {
            multiple_objects: true,
        },
    );
    let names: Vec<&str> = multiple.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["first", "second"]);
    // The second object continues the current material
    assert_eq!(multiple[1].groups()[0].material, "red");
}

#[test]
fn test_points_and_lines_are_reported() {
    let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
l 1 2
p 3
f 1 2 3
";
    let (meshes, reporter) = parse(text, ObjOptions::default());
    assert_eq!(meshes.len(), 1);
    assert_eq!(reporter.warnings().len(), 1);
    assert!(reporter.contains("test", "not supported"));
}

#[test]
fn test_empty_mesh_emits_nothing() {
    let (meshes, _) = parse("v 0 0 0\n", ObjOptions::default());
    assert!(meshes.is_empty());
}

#[test]
fn test_degenerate_face_skips_mesh() {
    let text = "\
v 0 0 0
v 1 0 0
f 1 2
";
    let (meshes, reporter) = parse(text, ObjOptions::default());
    assert!(meshes.is_empty());
    assert!(reporter.contains("test", "at least 3"));
}

#[test]
fn test_invalid_indices_fail() {
    let reporter = CollectingReporter::new();
    assert!(parse_obj("v 0 0 0\nf 0 1 1\n", "bad", ObjOptions::default(), &reporter).is_err());
    assert!(parse_obj("v 0 0 0\nf -2 1 1\n", "bad", ObjOptions::default(), &reporter).is_err());
}
