//! Wavefront OBJ + MTL importer.
//!
//! Faces are fan-triangulated, vertices are deduplicated per `v/vt/vn`
//! triple, and `usemtl` or `o`/`g` start a new mesh. Texture coordinates are
//! flipped vertically so image row 0 is the top of the texture.

use std::collections::HashMap;
use std::path::Path;

use crate::io;
use crate::renderer::Vertex;
use crate::scene::data::{generate_normals, MeshData, ModelData, TextureKind, TextureRef};

pub fn load_obj(path: &Path) -> Result<ModelData, String> {
    let source = io::load_text(path)?;
    let directory = io::directory_of(path);
    let parsed = parse_obj(&source).map_err(|err| format!("{:?}: {}", path, err))?;

    let mut materials = HashMap::new();
    for library in &parsed.material_libraries {
        let library_path = io::resolve_uri(&directory, library);
        match io::load_text(&library_path) {
            Ok(text) => materials.extend(parse_mtl(&text)),
            Err(err) => log::warn!("Skipping material library: {}", err),
        }
    }

    let meshes = parsed
        .meshes
        .into_iter()
        .map(|mesh| {
            let textures = match mesh.material.as_deref() {
                Some(name) => match materials.get(name) {
                    Some(material) => material.texture_refs(&directory),
                    None => {
                        log::warn!("Material '{}' not found in any material library", name);
                        Vec::new()
                    }
                },
                None => Vec::new(),
            };
            MeshData {
                name: mesh.name,
                vertices: mesh.vertices,
                indices: mesh.indices,
                textures,
            }
        })
        .collect();

    Ok(ModelData { meshes, directory })
}

#[derive(Clone, Debug, Default)]
pub struct ObjMesh {
    pub name: String,
    pub material: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct ParsedObj {
    pub meshes: Vec<ObjMesh>,
    pub material_libraries: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct Key(usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct MeshBuilder {
    mesh: ObjMesh,
    unique: HashMap<Key, u32>,
    missing_normals: bool,
}

impl MeshBuilder {
    fn named(name: String, material: Option<String>) -> Self {
        Self {
            mesh: ObjMesh {
                name,
                material,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn finish(mut self, meshes: &mut Vec<ObjMesh>) {
        if self.mesh.indices.is_empty() {
            return;
        }
        if self.missing_normals {
            generate_normals(&mut self.mesh.vertices, &self.mesh.indices);
        }
        meshes.push(self.mesh);
    }
}

pub fn parse_obj(source: &str) -> Result<ParsedObj, String> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();

    let mut parsed = ParsedObj::default();
    let mut current = MeshBuilder::named("default".into(), None);

    for (line_no, line) in source.lines().enumerate() {
        let trimmed = strip_comment(line);
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = match parts.next() {
                    Some(token) => parse_f32(Some(token), line_no, "v coordinate")?,
                    None => 0.0,
                };
                texcoords.push([u, 1.0 - v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                normals.push([nx, ny, nz]);
            }
            "f" => {
                let mut face = Vec::new();
                for part in parts {
                    let (vi, vti, vni) = parse_face_vertex(
                        part,
                        positions.len(),
                        texcoords.len(),
                        normals.len(),
                        line_no,
                    )?;
                    let key = Key(vi, vti, vni);
                    let index = match current.unique.get(&key) {
                        Some(&idx) => idx,
                        None => {
                            let uv = vti.map_or([0.0, 0.0], |i| texcoords[i]);
                            let normal = match vni {
                                Some(i) => normals[i],
                                None => {
                                    current.missing_normals = true;
                                    [0.0, 0.0, 0.0]
                                }
                            };
                            let idx = u32::try_from(current.mesh.vertices.len()).map_err(|_| {
                                format!("Too many vertices in OBJ mesh (>{})", u32::MAX)
                            })?;
                            current.mesh.vertices.push(Vertex {
                                pos: positions[vi],
                                normal,
                                uv,
                            });
                            current.unique.insert(key, idx);
                            idx
                        }
                    };
                    face.push(index);
                }

                if face.len() < 3 {
                    log::warn!("Skipping degenerate face on line {}", line_no + 1);
                    continue;
                }
                for tri in 1..(face.len() - 1) {
                    current
                        .mesh
                        .indices
                        .extend_from_slice(&[face[0], face[tri], face[tri + 1]]);
                }
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                if current.mesh.indices.is_empty() {
                    current.mesh.name = name;
                } else {
                    let material = current.mesh.material.clone();
                    std::mem::replace(&mut current, MeshBuilder::named(name, material))
                        .finish(&mut parsed.meshes);
                }
            }
            "usemtl" => {
                let material = parts.next().map(str::to_string);
                if current.mesh.indices.is_empty() {
                    current.mesh.material = material;
                } else if current.mesh.material != material {
                    let name = current.mesh.name.clone();
                    std::mem::replace(&mut current, MeshBuilder::named(name, material))
                        .finish(&mut parsed.meshes);
                }
            }
            "mtllib" => {
                let library = parts.collect::<Vec<_>>().join(" ");
                if !library.is_empty() {
                    parsed.material_libraries.push(library);
                }
            }
            // s, l, p and vendor extensions
            _ => {}
        }
    }

    current.finish(&mut parsed.meshes);

    if parsed.meshes.is_empty() {
        return Err("OBJ contained no triangles".to_string());
    }

    Ok(parsed)
}

/// The line without a trailing `# ...` comment, trimmed.
fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(content, _)| content).trim()
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32, String> {
    let token = value.ok_or_else(|| format!("Missing {} on line {}", what, line_no + 1))?;
    token
        .parse::<f32>()
        .map_err(|err| format!("Failed to parse {} on line {}: {}", what, line_no + 1, err))
}

fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    line_no: usize,
) -> Result<(usize, Option<usize>, Option<usize>), String> {
    let mut split = token.split('/');
    let pos = split
        .next()
        .ok_or_else(|| format!("Malformed face element '{}' on line {}", token, line_no + 1))?;
    let pos_idx = resolve_index(pos, pos_count, line_no)?;

    let tex_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, tex_count, line_no)?),
        _ => None,
    };

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, norm_count, line_no)?),
        _ => None,
    };

    Ok((pos_idx, tex_idx, norm_idx))
}

/// 1-based, or negative relative to the end of what has been declared so far.
fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize, String> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| format!("Invalid index '{}' on line {}", token, line_no + 1))?;
    if raw == 0 {
        return Err(format!(
            "OBJ indices are 1-based; found 0 on line {}",
            line_no + 1
        ));
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };

    if idx < 0 || idx as usize >= len {
        return Err(format!(
            "OBJ index {} resolved out of bounds (len={}) on line {}",
            raw,
            len,
            line_no + 1
        ));
    }

    Ok(idx as usize)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub normal_map: Option<String>,
    pub height_map: Option<String>,
    pub shininess: Option<f32>,
}

impl MtlMaterial {
    pub fn texture_refs(&self, directory: &Path) -> Vec<TextureRef> {
        [
            (TextureKind::Diffuse, &self.diffuse_map),
            (TextureKind::Specular, &self.specular_map),
            (TextureKind::Normal, &self.normal_map),
            (TextureKind::Height, &self.height_map),
        ]
        .into_iter()
        .filter_map(|(kind, map)| {
            map.as_deref()
                .map(|file| TextureRef::file(kind, io::resolve_uri(directory, file)))
        })
        .collect()
    }
}

pub fn parse_mtl(source: &str) -> HashMap<String, MtlMaterial> {
    let mut materials = HashMap::new();
    let mut current: Option<MtlMaterial> = None;

    for line in source.lines() {
        let trimmed = strip_comment(line);
        if trimmed.is_empty() {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        if tag == "newmtl" {
            if let Some(done) = current.take() {
                materials.insert(done.name.clone(), done);
            }
            current = Some(MtlMaterial {
                name: rest.join(" "),
                ..Default::default()
            });
            continue;
        }

        let Some(material) = current.as_mut() else {
            continue;
        };
        match tag {
            "map_Kd" => material.diffuse_map = map_file(&rest),
            "map_Ks" => material.specular_map = map_file(&rest),
            "map_Bump" | "map_bump" | "bump" | "norm" => material.normal_map = map_file(&rest),
            "disp" => material.height_map = map_file(&rest),
            "Ns" => material.shininess = rest.first().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }

    if let Some(done) = current {
        materials.insert(done.name.clone(), done);
    }
    materials
}

// map statements may carry options such as `-bm 1.0` before the file name
fn map_file(tokens: &[&str]) -> Option<String> {
    tokens.last().map(|file| file.replace('\\', "/"))
}
