//! Wavefront OBJ subset importer.
//!
//! Only `v`, `vt`, `vn` and triangular `f` lines are read; every other line
//! is skipped. Faces reference attributes with 1-based `pos[/tex[/norm]]`
//! groups, where `tex` may be empty (`1//3`).
//!
//! # Reindexing
//! Output attribute arrays are sized by the position list and keyed by
//! position index. Each face corner writes its texcoord and normal values
//! into the slot of its position, and the position index becomes the draw
//! index. A position shared by faces that disagree on texcoord or normal
//! (a UV seam) keeps whichever value was written last.
//! [`ObjDocument::seam_conflicts`] lists the affected slots.

use crate::AssetError;
use crate::mesh::MeshData;
use std::collections::BTreeMap;
use std::path::Path;

/// One face corner, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexGroup {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// A triangle and the 1-based source line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub groups: [IndexGroup; 3],
    pub line: usize,
}

/// Parsed OBJ content before reindexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjDocument {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
}

/// A position slot referenced with more than one texcoord/normal pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeamConflict {
    pub position: usize,
    /// Distinct `(texcoord, normal)` pairings in first-seen order. The last
    /// face to reference the slot decides which one the mesh keeps.
    pub pairings: Vec<(Option<usize>, Option<usize>)>,
}

fn format_err(line: usize, message: impl Into<String>) -> AssetError {
    AssetError::Format {
        line,
        message: message.into(),
    }
}

fn parse_floats<const N: usize>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    kind: &str,
) -> Result<[f32; N], AssetError> {
    let mut out = [0.0f32; N];
    for slot in out.iter_mut() {
        let token = tokens
            .next()
            .ok_or_else(|| format_err(line, format!("{kind} needs {N} components")))?;
        *slot = token
            .parse()
            .map_err(|_| format_err(line, format!("invalid number {token:?} in {kind}")))?;
    }
    Ok(out)
}

fn parse_index(token: &str, line: usize) -> Result<usize, AssetError> {
    let value: i64 = token
        .parse()
        .map_err(|_| format_err(line, format!("invalid index {token:?}")))?;
    if value < 1 {
        return Err(format_err(line, format!("index {value} is not 1-based")));
    }
    Ok((value - 1) as usize)
}

fn parse_group(token: &str, line: usize) -> Result<IndexGroup, AssetError> {
    let mut parts = token.split('/');
    let position = parse_index(parts.next().unwrap_or_default(), line)?;
    let texcoord = match parts.next() {
        Some("") | None => None,
        Some(t) => Some(parse_index(t, line)?),
    };
    let normal = match parts.next() {
        Some("") | None => None,
        Some(n) => Some(parse_index(n, line)?),
    };
    Ok(IndexGroup {
        position,
        texcoord,
        normal,
    })
}

/// Parse OBJ text into its attribute lists and faces.
pub fn parse_obj(source: &str) -> Result<ObjDocument, AssetError> {
    let mut doc = ObjDocument::default();
    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => doc.positions.push(parse_floats(&mut tokens, line, "v")?),
            Some("vt") => doc.texcoords.push(parse_floats(&mut tokens, line, "vt")?),
            Some("vn") => doc.normals.push(parse_floats(&mut tokens, line, "vn")?),
            Some("f") => {
                let groups: Vec<&str> = tokens.collect();
                if groups.len() < 3 {
                    return Err(format_err(line, "face needs three vertex groups"));
                }
                if groups.len() > 3 {
                    tracing::trace!(line, extra = groups.len() - 3, "ignoring extra face groups");
                }
                doc.faces.push(Face {
                    groups: [
                        parse_group(groups[0], line)?,
                        parse_group(groups[1], line)?,
                        parse_group(groups[2], line)?,
                    ],
                    line,
                });
            }
            Some(other) => tracing::trace!(line, token = other, "skipping line"),
            None => {}
        }
    }
    Ok(doc)
}

impl ObjDocument {
    /// Reindex into a mesh keyed by position index.
    pub fn to_mesh(&self) -> Result<MeshData, AssetError> {
        let slots = self.positions.len();
        let positions: Vec<f32> = self.positions.iter().flatten().copied().collect();
        let mut texcoords = vec![0.0f32; slots * 2];
        let mut normals = vec![0.0f32; slots * 3];
        let mut indices = Vec::with_capacity(self.faces.len() * 3);

        for face in &self.faces {
            for group in &face.groups {
                let p = group.position;
                if p >= slots {
                    return Err(format_err(
                        face.line,
                        format!("position {} out of range ({slots} defined)", p + 1),
                    ));
                }
                let index = u32::try_from(p)
                    .map_err(|_| format_err(face.line, "position index exceeds u32"))?;
                indices.push(index);

                if let Some(t) = group.texcoord {
                    let [u, v] = *self.texcoords.get(t).ok_or_else(|| {
                        format_err(
                            face.line,
                            format!(
                                "texcoord {} out of range ({} defined)",
                                t + 1,
                                self.texcoords.len()
                            ),
                        )
                    })?;
                    texcoords[p * 2] = u;
                    texcoords[p * 2 + 1] = 1.0 - v;
                }
                if let Some(n) = group.normal {
                    let normal = self.normals.get(n).ok_or_else(|| {
                        format_err(
                            face.line,
                            format!(
                                "normal {} out of range ({} defined)",
                                n + 1,
                                self.normals.len()
                            ),
                        )
                    })?;
                    normals[p * 3..p * 3 + 3].copy_from_slice(normal);
                }
            }
        }

        MeshData::new(positions, texcoords, normals, indices)
    }

    /// Position slots whose texcoord/normal data depends on face order.
    pub fn seam_conflicts(&self) -> Vec<SeamConflict> {
        let mut seen: BTreeMap<usize, Vec<(Option<usize>, Option<usize>)>> = BTreeMap::new();
        for group in self.faces.iter().flat_map(|f| f.groups.iter()) {
            let pairing = (group.texcoord, group.normal);
            let entry = seen.entry(group.position).or_default();
            if !entry.contains(&pairing) {
                entry.push(pairing);
            }
        }
        seen.into_iter()
            .filter(|(_, pairings)| pairings.len() > 1)
            .map(|(position, pairings)| SeamConflict { position, pairings })
            .collect()
    }
}

/// Parse and reindex OBJ text.
pub fn load_obj_str(source: &str) -> Result<MeshData, AssetError> {
    let doc = parse_obj(source)?;
    let mesh = doc.to_mesh()?;
    tracing::debug!(
        positions = doc.positions.len(),
        texcoords = doc.texcoords.len(),
        normals = doc.normals.len(),
        faces = doc.faces.len(),
        "imported obj"
    );
    Ok(mesh)
}

/// Read an OBJ file from disk and reindex it.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let source = std::fs::read_to_string(path.as_ref())?;
    load_obj_str(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE: &str = "\
# unit cube
o Cube
v -1 -1 -1
v  1 -1 -1
v  1  1 -1
v -1  1 -1
v -1 -1  1
v  1 -1  1
v  1  1  1
v -1  1  1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
s off
f 5/1/1 6/2/1 7/3/1
f 5/1/1 7/3/1 8/4/1
f 2/1 1/2 4/3
f 2/1 4/3 3/4
f 1/1 5/2 8/3
f 1/1 8/3 4/4
f 6/1 2/2 3/3
f 6/1 3/3 7/4
f 8/1 7/2 3/3
f 8/1 3/3 4/4
f 1/1 2/2 6/3
f 1/1 6/3 5/4
";

    #[test]
    fn cube_has_36_valid_indices() {
        let mesh = load_obj_str(CUBE).unwrap();
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.position_count(), 8);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.position_count()));
        assert_eq!(mesh.texcoords.len(), 16);
        assert_eq!(mesh.normals.len(), 24);
    }

    #[test]
    fn texcoord_v_is_flipped() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25 0.75\nf 1/1 2/1 3/1\n";
        let mesh = load_obj_str(src).unwrap();
        assert_eq!(&mesh.texcoords[0..2], &[0.25, 0.25]);
    }

    #[test]
    fn seam_keeps_last_written_texcoord() {
        // position 1 is used by both faces with different texcoords
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0.1 0.1
vt 0.9 0.9
f 1/1 2/1 3/1
f 1/2 4/2 3/2
";
        let doc = parse_obj(src).unwrap();
        let mesh = doc.to_mesh().unwrap();
        assert!((mesh.texcoords[0] - 0.9).abs() < 1e-6);
        assert!((mesh.texcoords[1] - 0.1).abs() < 1e-6);

        let conflicts = doc.seam_conflicts();
        let slots: Vec<usize> = conflicts.iter().map(|c| c.position).collect();
        assert_eq!(slots, vec![0, 2]);
        assert_eq!(conflicts[0].pairings, vec![(Some(0), None), (Some(1), None)]);
    }

    #[test]
    fn empty_texcoord_segment_means_absent() {
        let doc = parse_obj("f 1//2 2//2 3//2\n").unwrap();
        let g = doc.faces[0].groups[0];
        assert_eq!(g.position, 0);
        assert_eq!(g.texcoord, None);
        assert_eq!(g.normal, Some(1));
    }

    #[test]
    fn position_only_groups_leave_attributes_zeroed() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_str(src).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.texcoords.iter().all(|&t| t == 0.0));
        assert!(mesh.normals.iter().all(|&n| n == 0.0));
    }

    #[test]
    fn normals_are_scattered_by_position() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvn 1 0 0\nf 3//2 1//1 2//1\n";
        let mesh = load_obj_str(src).unwrap();
        assert_eq!(&mesh.normals[6..9], &[1.0, 0.0, 0.0]);
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn malformed_number_reports_line() {
        let err = load_obj_str("v 0 0 0\nv 1 x 0\n").unwrap_err();
        match err {
            AssetError::Format { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_face_index_fails_import() {
        let err = load_obj_str("v 0 0 0\nf 1/a 1 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Format { line: 2, .. }));
    }

    #[test]
    fn out_of_range_index_is_format_error() {
        let err = load_obj_str("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, AssetError::Format { line: 3, .. }));

        let err = load_obj_str("v 0 0 0\nf 0 1 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Format { line: 2, .. }));
    }

    #[test]
    fn dangling_texcoord_and_normal_indices_name_the_count() {
        let err = load_obj_str("v 0 0 0\nvt 0 0\nf 1/2 1/1 1/1\n").unwrap_err();
        let AssetError::Format { line, message } = err else {
            panic!("expected a format error");
        };
        assert_eq!(line, 3);
        assert_eq!(message, "texcoord 2 out of range (1 defined)");

        let err = load_obj_str("v 0 0 0\nf 1//1 1//1 1//1\n").unwrap_err();
        let AssetError::Format { message, .. } = err else {
            panic!("expected a format error");
        };
        assert_eq!(message, "normal 1 out of range (0 defined)");
    }

    #[test]
    fn short_face_is_format_error() {
        let err = load_obj_str("v 0 0 0\nf 1 1\n").unwrap_err();
        assert!(matches!(err, AssetError::Format { line: 2, .. }));
    }

    #[test]
    fn unknown_lines_are_skipped() {
        let src = "mtllib cube.mtl\nusemtl red\ng group\n\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_str(src).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        std::fs::write(&path, CUBE).unwrap();
        let mesh = load_obj(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 36);

        let missing = load_obj(dir.path().join("missing.obj"));
        assert!(matches!(missing, Err(AssetError::Io(_))));
    }
}
