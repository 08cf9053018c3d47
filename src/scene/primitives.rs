//! Built-in meshes
//!
//! Front faces wind counter-clockwise as seen by a viewer with +X to the
//! right and +Y up, which with the camera looking down +Z means
//! `(p1 - p0) x (p2 - p0)` points into the surface.

use crate::loader::MeshData;
use crate::rasterizer::{Face, IndexRecord, Uv, Vec3};

/// Corner uvs shared by every quad: top-left, top-right, bottom-left, bottom-right
const QUAD_UVS: [Uv; 4] = [
    Uv::new(0.0, 0.0),
    Uv::new(1.0, 0.0),
    Uv::new(0.0, 1.0),
    Uv::new(1.0, 1.0),
];

/// Append one quad to `mesh`. `right` and `up` are the half-extent axes as
/// seen from outside; `right x up` must equal `-normal`.
fn push_quad(mesh: &mut MeshData, center: Vec3, right: Vec3, up: Vec3, normal: Vec3, uv_base: usize) {
    let v = mesh.vertices.len();
    let n = mesh.normals.len();
    mesh.vertices.extend([
        (center - right + up).to_point(),
        (center + right + up).to_point(),
        (center - right - up).to_point(),
        (center + right - up).to_point(),
    ]);
    mesh.normals.push(normal);

    let corner = |i: usize| IndexRecord::new(v + i, uv_base + i, n);
    let (tl, tr, bl, br) = (corner(0), corner(1), corner(2), corner(3));
    mesh.faces.push(Face::new([tl, bl, tr]));
    mesh.faces.push(Face::new([tr, bl, br]));
}

/// Axis-aligned quad in the XY plane, facing -Z
pub fn quad_mesh(width: f32, height: f32) -> MeshData {
    let mut mesh = MeshData {
        uvs: QUAD_UVS.to_vec(),
        ..Default::default()
    };
    push_quad(
        &mut mesh,
        Vec3::ZERO,
        Vec3::new(width * 0.5, 0.0, 0.0),
        Vec3::new(0.0, height * 0.5, 0.0),
        Vec3::new(0.0, 0.0, -1.0),
        0,
    );
    mesh
}

/// Cube of edge length `side` centered on the origin; each face maps the
/// whole texture
pub fn cube_mesh(side: f32) -> MeshData {
    let h = side * 0.5;
    let mut mesh = MeshData {
        uvs: QUAD_UVS.to_vec(),
        ..Default::default()
    };

    let x = Vec3::new(h, 0.0, 0.0);
    let y = Vec3::new(0.0, h, 0.0);
    let z = Vec3::new(0.0, 0.0, h);

    // (outward normal, right, up)
    let sides = [
        (-z, x, y),
        (z, -x, y),
        (x, z, y),
        (-x, -z, y),
        (y, x, z),
        (-y, x, -z),
    ];
    for (out, right, up) in sides {
        push_quad(&mut mesh, out, right, up, out.normalize(), 0);
    }
    mesh
}
