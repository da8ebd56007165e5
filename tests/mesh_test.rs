use glider::data_structures::mesh::MeshBuffers;

fn tri_positions() -> Vec<[f32; 4]> {
    vec![
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 1.0],
    ]
}

#[test]
fn stream_length_mismatch_is_rejected() {
    let result = MeshBuffers::new(
        tri_positions(),
        vec![[0.0, 0.0, 1.0, 0.0]; 2],
        vec![[1.0; 4]; 3],
        None,
        vec![0, 1, 2],
    );
    assert!(result.unwrap_err().to_string().contains("length mismatch"));
}

#[test]
fn missing_uvs_are_zero_filled() {
    let mesh = MeshBuffers::new(
        tri_positions(),
        vec![[0.0, 0.0, 1.0, 0.0]; 3],
        vec![[1.0; 4]; 3],
        None,
        vec![0, 1, 2],
    )
    .unwrap();
    assert_eq!(mesh.uvs, vec![[0.0, 0.0]; 3]);
}

#[test]
fn partial_triangles_are_rejected() {
    let result = MeshBuffers::new(
        tri_positions(),
        vec![[0.0, 0.0, 1.0, 0.0]; 3],
        vec![[1.0; 4]; 3],
        None,
        vec![0, 1],
    );
    assert!(result.is_err());
}

#[test]
fn out_of_range_indices_are_rejected() {
    let result = MeshBuffers::new(
        tri_positions(),
        vec![[0.0, 0.0, 1.0, 0.0]; 3],
        vec![[1.0; 4]; 3],
        None,
        vec![0, 1, 3],
    );
    assert!(result.unwrap_err().to_string().contains("out of range"));
}

#[test]
fn unit_quad_is_two_triangles_over_four_vertices() {
    let quad = MeshBuffers::unit_quad();
    assert_eq!(quad.vertex_count(), 4);
    assert_eq!(quad.indices, vec![0, 1, 2, 3, 2, 1]);
}

#[test]
fn uv_sphere_has_consistent_streams_and_indices() {
    let (stacks, slices) = (8u32, 16u32);
    let sphere = MeshBuffers::uv_sphere(2.0, stacks, slices);

    let expected_vertices = ((stacks + 1) * (slices + 1)) as usize;
    assert_eq!(sphere.vertex_count(), expected_vertices);
    assert_eq!(sphere.index_count(), (stacks * slices * 6) as usize);

    // Positions sit on the sphere, normals are the unit positions.
    for (p, n) in sphere.positions.iter().zip(&sphere.normals) {
        let radius = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        assert!((radius - 2.0).abs() < 1e-4);
        assert_eq!(p[3], 1.0);
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-4);
        assert_eq!(n[3], 0.0);
    }

    // UVs stay in [0, 1].
    for uv in &sphere.uvs {
        assert!((0.0..=1.0).contains(&uv[0]));
        assert!((0.0..=1.0).contains(&uv[1]));
    }
}
