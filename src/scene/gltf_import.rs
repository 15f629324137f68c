// scene/gltf_import.rs
//
// glTF 2.0 (.gltf and .glb) into `ModelData`. Node transforms are baked into
// the vertices, so every primitive of the default scene becomes one mesh in
// model space.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};

use crate::io;
use crate::renderer::Vertex;
use crate::scene::data::{MeshData, ModelData, TextureKind, TextureRef, TextureSource};

pub fn load_gltf(path: &Path) -> Result<ModelData, String> {
    let bytes = io::load_binary(path)?;
    let directory = io::directory_of(path);

    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(&bytes)
        .map_err(|e| format!("Failed to parse glTF {:?}: {}", path, e))?;

    let buffers = load_buffers(&document, blob, &directory)?;
    let mut images = ImageResolver {
        model_key: path.display().to_string(),
        directory: &directory,
        buffers: &buffers,
        resolved: HashMap::new(),
    };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| format!("glTF {:?} has no scenes", path))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        visit_node(&node, Mat4::IDENTITY, &buffers, &mut images, &mut meshes)?;
    }

    if meshes.is_empty() {
        log::warn!("glTF {:?} contains no triangle meshes", path);
    }

    Ok(ModelData { meshes, directory })
}

fn load_buffers(
    document: &gltf::Document,
    mut blob: Option<Vec<u8>>,
    directory: &Path,
) -> Result<Vec<Vec<u8>>, String> {
    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let mut data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .take()
                .ok_or_else(|| "glTF references a BIN chunk it does not contain".to_string())?,
            gltf::buffer::Source::Uri(uri) => io::load_external_resource(directory, uri)?,
        };

        if data.len() < buffer.length() {
            return Err(format!(
                "glTF buffer {} is {} bytes, expected {}",
                buffer.index(),
                data.len(),
                buffer.length()
            ));
        }
        // accessor reads may touch the 4-byte padding
        while data.len() % 4 != 0 {
            data.push(0);
        }
        buffers.push(data);
    }
    Ok(buffers)
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[Vec<u8>],
    images: &mut ImageResolver,
    meshes: &mut Vec<MeshData>,
) -> Result<(), String> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let base_name = mesh
            .name()
            .or(node.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping {} primitive {}: mode {:?} is not triangles",
                    base_name,
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }

            let name = if mesh.primitives().len() > 1 {
                format!("{}_{}", base_name, primitive.index())
            } else {
                base_name.clone()
            };
            let mut data = read_primitive(&primitive, buffers, world)
                .map_err(|err| format!("{}: {}", name, err))?;
            data.name = name;
            data.textures = material_textures(&primitive.material(), images);
            meshes.push(data);
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, images, meshes)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
    world: Mat4,
) -> Result<MeshData, String> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or("Missing positions")?
        .collect();

    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|n| n.collect())
        .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);

    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|uv| uv.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

    let mut indices: Vec<u32> = reader
        .read_indices()
        .map(|i| i.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(format!(
            "index {} out of range for {} vertices",
            bad,
            positions.len()
        ));
    }

    let vertices = bake_transform(&positions, &normals, &uvs, world);
    if world.determinant() < 0.0 {
        // a mirroring transform flips the winding
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    Ok(MeshData {
        vertices,
        indices,
        ..Default::default()
    })
}

/// Positions through `world`, normals through its inverse transpose.
pub fn bake_transform(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    uvs: &[[f32; 2]],
    world: Mat4,
) -> Vec<Vertex> {
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    positions
        .iter()
        .enumerate()
        .map(|(i, pos)| {
            let normal = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
            Vertex {
                pos: world.transform_point3(Vec3::from(*pos)).to_array(),
                normal: (normal_matrix * Vec3::from(normal))
                    .normalize_or(Vec3::Y)
                    .to_array(),
                uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            }
        })
        .collect()
}

fn material_textures(material: &gltf::Material, images: &mut ImageResolver) -> Vec<TextureRef> {
    let pbr = material.pbr_metallic_roughness();
    let slots = [
        (
            TextureKind::Diffuse,
            pbr.base_color_texture().map(|info| info.texture()),
        ),
        (
            TextureKind::Specular,
            pbr.metallic_roughness_texture().map(|info| info.texture()),
        ),
        (
            TextureKind::Normal,
            material.normal_texture().map(|normal| normal.texture()),
        ),
    ];

    slots
        .into_iter()
        .filter_map(|(kind, texture)| {
            let source = images.resolve(&texture?.source())?;
            Some(TextureRef { kind, source })
        })
        .collect()
}

/// Turns glTF images into texture sources; embedded images are decoded once.
struct ImageResolver<'a> {
    model_key: String,
    directory: &'a Path,
    buffers: &'a [Vec<u8>],
    resolved: HashMap<usize, Option<TextureSource>>,
}

impl ImageResolver<'_> {
    fn resolve(&mut self, image: &gltf::Image) -> Option<TextureSource> {
        if let Some(known) = self.resolved.get(&image.index()) {
            return known.clone();
        }

        let source = match self.decode(image) {
            Ok(source) => Some(source),
            Err(err) => {
                log::error!("Texture failed to load: {}", err);
                None
            }
        };
        self.resolved.insert(image.index(), source.clone());
        source
    }

    fn decode(&self, image: &gltf::Image) -> Result<TextureSource, String> {
        let bytes = match image.source() {
            gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                return Ok(TextureSource::File(io::resolve_uri(self.directory, uri)));
            }
            gltf::image::Source::Uri { uri, .. } => {
                io::load_external_resource(self.directory, uri)?
            }
            gltf::image::Source::View { view, .. } => {
                let start = view.offset();
                let end = start + view.length();
                self.buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..end))
                    .ok_or_else(|| format!("image {} view is out of range", image.index()))?
                    .to_vec()
            }
        };

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| format!("image {}: {}", image.index(), e))?;
        log::debug!(
            "Decoded embedded image {}: {}x{}",
            image.index(),
            decoded.width(),
            decoded.height()
        );

        Ok(TextureSource::Embedded {
            key: format!("{}#image{}", self.model_key, image.index()),
            image: Arc::new(decoded.to_rgba8()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}", std::process::id(), name))
    }

    // one triangle: 3 positions (36 bytes) + 3 u16 indices (6 bytes, padded to 8)
    fn triangle_buffer() -> Vec<u8> {
        let mut bytes = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            bytes.extend_from_slice(bytemuck::cast_slice(&p));
        }
        bytes.extend_from_slice(bytemuck::cast_slice(&[0u16, 1, 2, 0]));
        bytes
    }

    fn triangle_gltf(translation: [f32; 3]) -> String {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            base64::encode(triangle_buffer())
        );
        serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "name": "root", "translation": translation, "children": [1] },
                      { "mesh": 0, "scale": [2.0, 2.0, 2.0] }],
            "meshes": [{ "name": "tri", "primitives": [{
                "attributes": { "POSITION": 0 }, "indices": 1 }] }],
            "buffers": [{ "byteLength": 44, "uri": uri }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
            ],
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                  "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
                { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
            ]
        })
        .to_string()
    }

    #[test]
    fn node_transforms_are_baked_into_positions() {
        let path = temp_path("triangle.gltf");
        std::fs::write(&path, triangle_gltf([0.0, 0.0, -5.0])).unwrap();
        let model = load_gltf(&path);
        std::fs::remove_file(&path).ok();

        let model = model.unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[0].pos, [0.0, 0.0, -5.0]);
        assert_eq!(mesh.vertices[1].pos, [2.0, 0.0, -5.0]);
        assert_eq!(mesh.vertices[2].uv, [0.0, 0.0]);
        assert!(mesh.textures.is_empty());
    }

    #[test]
    fn mirrored_nodes_flip_winding() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = [[0.0, 0.0, 1.0]; 3];
        let mirror = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        let vertices = bake_transform(&positions, &normals, &[], mirror);
        assert_eq!(vertices[1].pos, [-1.0, 0.0, 0.0]);
        assert!(Vec3::from(vertices[0].normal).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(mirror.determinant() < 0.0);
    }

    #[test]
    fn normals_use_inverse_transpose() {
        let positions = [[0.0, 0.0, 0.0]];
        let normals = [[1.0, 1.0, 0.0]];
        let stretch = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let vertices = bake_transform(&positions, &normals, &[], stretch);
        let expected = Vec3::new(0.5, 1.0, 0.0).normalize();
        assert!(Vec3::from(vertices[0].normal).abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn invalid_json_is_reported_with_path() {
        let path = temp_path("broken.gltf");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_gltf(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.starts_with("Failed to parse glTF"));
    }
}
