// scene/data.rs
//
// CPU-side model data, produced by the OBJ and glTF importers and consumed by
// `Model::upload`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec3;
use image::RgbaImage;

use crate::renderer::Vertex;
use crate::scene::{gltf_import, obj};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub fn name(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
            TextureKind::Normal => "texture_normal",
            TextureKind::Height => "texture_height",
        }
    }
}

#[derive(Clone, Debug)]
pub enum TextureSource {
    File(PathBuf),
    Embedded { key: String, image: Arc<RgbaImage> },
}

impl TextureSource {
    /// Identity used to share one GPU texture between meshes.
    pub fn key(&self) -> String {
        match self {
            TextureSource::File(path) => path.display().to_string(),
            TextureSource::Embedded { key, .. } => key.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextureRef {
    pub kind: TextureKind,
    pub source: TextureSource,
}

impl TextureRef {
    pub fn file(kind: TextureKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            source: TextureSource::File(path.into()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub textures: Vec<TextureRef>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        if self.indices.is_empty() {
            self.vertices.len() / 3
        } else {
            self.indices.len() / 3
        }
    }

    pub fn texture_kinds(&self) -> Vec<TextureKind> {
        self.textures.iter().map(|t| t.kind).collect()
    }

    /// One vertex per triangle corner, each carrying its triangle's face
    /// normal, so triangles can be pushed apart along their normals.
    pub fn exploded(&self) -> MeshData {
        let corners: Vec<Vertex> = if self.indices.is_empty() {
            self.vertices.clone()
        } else {
            self.indices
                .iter()
                .filter_map(|&i| self.vertices.get(i as usize).copied())
                .collect()
        };

        let mut vertices = Vec::with_capacity(corners.len());
        for tri in corners.chunks_exact(3) {
            let (a, b, c) = (
                Vec3::from(tri[0].pos),
                Vec3::from(tri[1].pos),
                Vec3::from(tri[2].pos),
            );
            let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
            vertices.extend(tri.iter().map(|v| Vertex { normal, ..*v }));
        }

        MeshData {
            name: format!("{} (exploded)", self.name),
            vertices,
            indices: Vec::new(),
            textures: self.textures.clone(),
        }
    }

    pub fn summary(&self, index: usize) -> String {
        let mut text = format!(
            "Mesh #{} '{}': {} vertices, {} indices, {} textures",
            index,
            self.name,
            self.vertices.len(),
            self.indices.len(),
            self.textures.len()
        );
        for texture in &self.textures {
            let _ = write!(text, "\n    {} <- {}", texture.kind.name(), texture.source.key());
        }
        text
    }
}

#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub directory: PathBuf,
}

impl ModelData {
    /// Imports `.obj` (with its `.mtl`) or `.gltf`/`.glb`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let model = match extension.as_str() {
            "obj" => obj::load_obj(path)?,
            "gltf" | "glb" => gltf_import::load_gltf(path)?,
            other => return Err(format!("Unsupported model format '{}' for {:?}", other, path)),
        };

        log::info!(
            "Loaded {:?}: {} meshes, {} vertices",
            path,
            model.meshes.len(),
            model.vertex_count()
        );
        for (i, mesh) in model.meshes.iter().enumerate() {
            log::debug!("{}", mesh.summary(i));
        }

        Ok(model)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn exploded(&self) -> ModelData {
        ModelData {
            meshes: self.meshes.iter().map(MeshData::exploded).collect(),
            directory: self.directory.clone(),
        }
    }
}

/// Replaces every normal with the area-weighted average of the faces sharing the vertex.
pub fn generate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(vertices[a].pos),
            Vec3::from(vertices[b].pos),
            Vec3::from(vertices[c].pos),
        );
        // unnormalised cross product: length is twice the triangle area
        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    for (vertex, normal) in vertices.iter_mut().zip(accumulated) {
        vertex.normal = normal.normalize_or(Vec3::Y).to_array();
    }
}

/// Where the two material samplers of a model mesh come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotSource {
    Texture(usize),
    White,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSlots {
    pub diffuse: SlotSource,
    pub specular: SlotSource,
}

impl TextureSlots {
    /// First diffuse and first specular texture. A missing one samples
    /// whatever sits in slot 0; a mesh without textures gets white diffuse
    /// and black specular.
    pub fn resolve(kinds: &[TextureKind]) -> Self {
        let find = |wanted: TextureKind| kinds.iter().position(|k| *k == wanted);
        let slot_zero = (!kinds.is_empty()).then_some(SlotSource::Texture(0));

        Self {
            diffuse: find(TextureKind::Diffuse)
                .map(SlotSource::Texture)
                .or(slot_zero)
                .unwrap_or(SlotSource::White),
            specular: find(TextureKind::Specular)
                .map(SlotSource::Texture)
                .or(slot_zero)
                .unwrap_or(SlotSource::Black),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::v;

    fn quad_mesh() -> MeshData {
        MeshData {
            name: "quad".into(),
            vertices: vec![
                v([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0]),
                v([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 1.0]),
                v([1.0, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0]),
                v([0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            textures: vec![TextureRef::file(TextureKind::Diffuse, "wood.png")],
        }
    }

    #[test]
    fn exploded_mesh_is_deindexed_with_face_normals() {
        let exploded = quad_mesh().exploded();
        assert_eq!(exploded.vertices.len(), 6);
        assert!(exploded.indices.is_empty());
        assert_eq!(exploded.triangle_count(), 2);
        for vertex in &exploded.vertices {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
        assert_eq!(exploded.vertices[4].uv, [1.0, 0.0]);
        assert_eq!(exploded.textures.len(), 1);
    }

    #[test]
    fn generated_normals_follow_winding() {
        let mut mesh = quad_mesh();
        generate_normals(&mut mesh.vertices, &mesh.indices);
        for vertex in &mesh.vertices {
            assert!(Vec3::from(vertex.normal).abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn generated_normals_average_shared_faces() {
        // two faces of a cube corner meeting at vertex 0
        let mut vertices = vec![
            v([0.0, 0.0, 0.0], [0.0; 3], [0.0; 2]),
            v([1.0, 0.0, 0.0], [0.0; 3], [0.0; 2]),
            v([0.0, 1.0, 0.0], [0.0; 3], [0.0; 2]),
            v([0.0, 0.0, 1.0], [0.0; 3], [0.0; 2]),
        ];
        let indices = [0, 1, 2, 0, 3, 1];
        generate_normals(&mut vertices, &indices);

        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!(Vec3::from(vertices[0].normal).abs_diff_eq(expected, 1e-6));
        // only used by the first face
        assert!(Vec3::from(vertices[2].normal).abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn summary_lists_counts_and_textures() {
        let text = quad_mesh().summary(3);
        assert!(text.starts_with("Mesh #3 'quad': 4 vertices, 6 indices, 1 textures"));
        assert!(text.contains("texture_diffuse <- wood.png"));
    }

    #[test]
    fn slots_prefer_matching_kinds() {
        let slots = TextureSlots::resolve(&[
            TextureKind::Normal,
            TextureKind::Specular,
            TextureKind::Diffuse,
        ]);
        assert_eq!(slots.diffuse, SlotSource::Texture(2));
        assert_eq!(slots.specular, SlotSource::Texture(1));
    }

    #[test]
    fn missing_specular_samples_slot_zero() {
        let slots = TextureSlots::resolve(&[TextureKind::Diffuse, TextureKind::Normal]);
        assert_eq!(slots.diffuse, SlotSource::Texture(0));
        assert_eq!(slots.specular, SlotSource::Texture(0));
    }

    #[test]
    fn untextured_mesh_gets_defaults() {
        let slots = TextureSlots::resolve(&[]);
        assert_eq!(slots.diffuse, SlotSource::White);
        assert_eq!(slots.specular, SlotSource::Black);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = ModelData::load("models/thing.fbx").unwrap_err();
        assert!(err.contains("Unsupported model format 'fbx'"));
    }
}
