//! Wavefront OBJ mesh loading
//!
//! Supports `v`, `vt`, `vn` and `f` records. Face corners may be written as
//! `v`, `v/vt`, `v//vn` or `v/vt/vn`, with 1-based or negative (relative)
//! indices; polygons are fan-triangulated. Other records are skipped.

use std::path::Path;

use super::{LoadError, MeshData};
use crate::rasterizer::{Face, IndexRecord, Uv, Vec3, Vec4};

/// Corner as written in the file, resolved to 0-based indices
#[derive(Debug, Clone, Copy)]
struct ObjCorner {
    v: usize,
    vt: Option<usize>,
    vn: Option<usize>,
}

/// Read and parse an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<MeshData, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(&text)?;
    log::info!(
        "Loaded mesh {}: {} vertices, {} uvs, {} normals, {} faces",
        path.display(),
        mesh.vertices.len(),
        mesh.uvs.len(),
        mesh.normals.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Parse OBJ text into mesh-local (0-based) data. Faces are untextured.
///
/// Texture `v` is flipped (`1 - v`) because OBJ puts v = 0 at the bottom of
/// the image and the sampler puts it at the top row.
pub fn parse_obj(text: &str) -> Result<MeshData, LoadError> {
    let mut mesh = MeshData::default();
    let mut polygons: Vec<Vec<ObjCorner>> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else { continue };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no)?;
                // optional homogeneous w is folded into the position
                let w = match tokens.next() {
                    Some(t) => parse_float(t, line_no)?,
                    None => 1.0,
                };
                if w == 0.0 || !w.is_finite() {
                    return Err(obj_error(line_no, format!("vertex w must be finite and non-zero, got {}", w)));
                }
                mesh.vertices.push(Vec4::point(x / w, y / w, z / w));
            }
            "vt" => {
                let u = parse_float(next_token(&mut tokens, line_no)?, line_no)?;
                let v = match tokens.next() {
                    Some(t) => parse_float(t, line_no)?,
                    None => 0.0,
                };
                mesh.uvs.push(Uv::new(u, 1.0 - v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no)?;
                mesh.normals.push(Vec3::new(x, y, z));
            }
            "f" => {
                let corners = tokens
                    .map(|t| parse_corner(t, &mesh, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(obj_error(line_no, format!("face needs 3 corners, got {}", corners.len())));
                }
                polygons.push(corners);
            }
            other => {
                log::trace!("obj line {}: skipping '{}'", line_no, other);
            }
        }
    }

    // Corners without uv or normal share one placeholder appended at the end
    let needs_uv = polygons.iter().flatten().any(|c| c.vt.is_none());
    let needs_normal = polygons.iter().flatten().any(|c| c.vn.is_none());
    let fallback_uv = mesh.uvs.len();
    let fallback_normal = mesh.normals.len();
    if needs_uv {
        mesh.uvs.push(Uv::default());
    }
    if needs_normal {
        mesh.normals.push(Vec3::ZERO);
    }

    for corners in &polygons {
        let record = |c: &ObjCorner| {
            IndexRecord::new(c.v, c.vt.unwrap_or(fallback_uv), c.vn.unwrap_or(fallback_normal))
        };
        for i in 1..corners.len() - 1 {
            mesh.faces.push(Face::new([
                record(&corners[0]),
                record(&corners[i]),
                record(&corners[i + 1]),
            ]));
        }
    }

    debug_assert!(mesh.indices_in_bounds());
    Ok(mesh)
}

fn obj_error(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Obj { line, message: message.into() }
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>, line: usize) -> Result<&'a str, LoadError> {
    tokens.next().ok_or_else(|| obj_error(line, "missing value"))
}

fn parse_float(token: &str, line: usize) -> Result<f32, LoadError> {
    token
        .parse::<f32>()
        .map_err(|e| obj_error(line, format!("bad number '{}': {}", token, e)))
}

fn parse_floats<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; N], LoadError> {
    let mut out = [0.0; N];
    for value in &mut out {
        *value = parse_float(next_token(tokens, line)?, line)?;
    }
    Ok(out)
}

/// Resolve a 1-based or negative OBJ index against the current count
fn resolve_index(token: &str, count: usize, what: &str, line: usize) -> Result<usize, LoadError> {
    let raw: i64 = token
        .parse()
        .map_err(|e| obj_error(line, format!("bad {} index '{}': {}", what, token, e)))?;
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        count as i64 + raw
    } else {
        return Err(obj_error(line, format!("{} index 0 is not valid", what)));
    };
    if resolved < 0 || resolved as usize >= count {
        return Err(obj_error(
            line,
            format!("{} index {} out of range ({} defined)", what, raw, count),
        ));
    }
    Ok(resolved as usize)
}

fn parse_corner(token: &str, mesh: &MeshData, line: usize) -> Result<ObjCorner, LoadError> {
    let mut parts = token.split('/');
    let v = resolve_index(parts.next().unwrap_or(""), mesh.vertices.len(), "vertex", line)?;
    let vt = match parts.next() {
        Some("") | None => None,
        Some(t) => Some(resolve_index(t, mesh.uvs.len(), "uv", line)?),
    };
    let vn = match parts.next() {
        Some("") | None => None,
        Some(t) => Some(resolve_index(t, mesh.normals.len(), "normal", line)?),
    };
    Ok(ObjCorner { v, vt, vn })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUAD: &str = "\
# a quad
o quad
v -1 -1 0
v  1 -1 0
v  1  1 0
v -1  1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 -1
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_parse_quad_fan() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.uvs.len(), 4);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[1].corners[0], IndexRecord::new(0, 0, 0));
        assert_eq!(mesh.faces[1].corners[1], IndexRecord::new(2, 2, 0));
        assert_eq!(mesh.faces[1].corners[2], IndexRecord::new(3, 3, 0));
        assert!(mesh.faces.iter().all(|f| f.texture_id.is_none()));
        assert_eq!(mesh.vertices[2].w, 1.0);
    }

    #[test]
    fn test_uv_v_is_flipped() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.uvs[0], Uv::new(0.0, 1.0));
        assert_eq!(mesh.uvs[2], Uv::new(1.0, 0.0));
    }

    #[test]
    fn test_missing_uv_and_normal_use_placeholder() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.uvs.len(), 1);
        assert_eq!(mesh.normals.len(), 1);
        assert!(mesh.indices_in_bounds());

        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.uvs.len(), 1);
        assert_eq!(mesh.faces[0].corners[0].n_index, 0);
    }

    #[test]
    fn test_vertex_w_is_divided_out() {
        let mesh = parse_obj("v 2 4 6 2\nv 1 1 1\n").unwrap();
        assert_eq!(mesh.vertices[0], Vec4::point(1.0, 2.0, 3.0));
        assert_eq!(mesh.vertices[1].w, 1.0);

        let err = parse_obj("v 1 1 1 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Obj { line: 1, .. }));
    }

    #[test]
    fn test_negative_indices() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        let v: Vec<usize> = mesh.faces[0].corners.iter().map(|c| c.v_index).collect();
        assert_eq!(v, vec![0, 1, 2]);
    }

    #[test]
    fn test_errors_report_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, LoadError::Obj { line: 3, .. }));

        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Obj { line: 1, .. }));

        let err = parse_obj("v 0 0 0\nf 1 1\n").unwrap_err();
        assert!(matches!(err, LoadError::Obj { line: 2, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(QUAD.as_bytes()).unwrap();
        let mesh = load_obj(file.path()).unwrap();
        assert_eq!(mesh.faces.len(), 2);
    }
}
