//! Loads small OBJ/MTL files from a scratch directory through `ModelData::load`.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use render_lessons::scene::{ModelData, SlotSource, TextureKind, TextureSlots, TextureSource};

const CRATE_OBJ: &str = "\
# two objects, two materials
mtllib crate.mtl
o Crate
v -0.5 -0.5 0
v 0.5 -0.5 0
v 0.5 0.5 0
v -0.5 0.5 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl wood
f 1/1 2/2 3/3 4/4
o Lid
v 0 1 0
v 1 1 0
v 0 1 1
usemtl metal
f 5 6 7
";

const CRATE_MTL: &str = "\
newmtl wood
Ns 32
map_Kd textures\\wood.png
map_Ks wood_spec.png

newmtl metal
Ns 64
map_Bump metal_normal.png
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "render_lessons_{}_{}",
        name,
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_crate(dir: &Path) -> PathBuf {
    let obj = dir.join("crate.obj");
    fs::write(&obj, CRATE_OBJ).unwrap();
    fs::write(dir.join("crate.mtl"), CRATE_MTL).unwrap();
    obj
}

fn file_source(source: &TextureSource) -> &Path {
    match source {
        TextureSource::File(path) => path,
        TextureSource::Embedded { key, .. } => panic!("expected a file, got embedded {key}"),
    }
}

#[test]
fn obj_objects_become_meshes_with_their_materials() {
    let dir = scratch_dir("objects");
    let model = ModelData::load(write_crate(&dir)).unwrap();

    assert_eq!(model.directory, dir);
    assert_eq!(model.meshes.len(), 2);

    let crate_mesh = &model.meshes[0];
    assert_eq!(crate_mesh.name, "Crate");
    assert_eq!(crate_mesh.vertices.len(), 4);
    assert_eq!(crate_mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(
        crate_mesh.texture_kinds(),
        vec![TextureKind::Diffuse, TextureKind::Specular]
    );
    assert_eq!(
        file_source(&crate_mesh.textures[0].source),
        dir.join("textures").join("wood.png")
    );
    assert_eq!(
        file_source(&crate_mesh.textures[1].source),
        dir.join("wood_spec.png")
    );

    let lid = &model.meshes[1];
    assert_eq!(lid.name, "Lid");
    assert_eq!(lid.texture_kinds(), vec![TextureKind::Normal]);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn obj_texture_coordinates_have_a_top_left_origin() {
    let dir = scratch_dir("uvs");
    let model = ModelData::load(write_crate(&dir)).unwrap();

    let uvs: Vec<[f32; 2]> = model.meshes[0].vertices.iter().map(|v| v.uv).collect();
    assert_eq!(uvs, vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_normals_are_generated_from_faces() {
    let dir = scratch_dir("normals");
    let model = ModelData::load(write_crate(&dir)).unwrap();

    for vertex in &model.meshes[0].vertices {
        assert!(Vec3::from(vertex.normal).abs_diff_eq(Vec3::Z, 1e-5));
    }
    for vertex in &model.meshes[1].vertices {
        assert!(Vec3::from(vertex.normal).abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    fs::remove_dir_all(dir).ok();
}

#[test]
fn material_slots_follow_texture_kinds() {
    let dir = scratch_dir("slots");
    let model = ModelData::load(write_crate(&dir)).unwrap();

    let crate_slots = TextureSlots::resolve(&model.meshes[0].texture_kinds());
    assert_eq!(crate_slots.diffuse, SlotSource::Texture(0));
    assert_eq!(crate_slots.specular, SlotSource::Texture(1));

    // only a normal map: both samplers read it rather than nothing
    let lid_slots = TextureSlots::resolve(&model.meshes[1].texture_kinds());
    assert_eq!(lid_slots.diffuse, SlotSource::Texture(0));
    assert_eq!(lid_slots.specular, SlotSource::Texture(0));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_material_library_still_loads_geometry() {
    let dir = scratch_dir("no_mtl");
    let obj = dir.join("bare.obj");
    fs::write(&obj, CRATE_OBJ).unwrap();

    let model = ModelData::load(&obj).unwrap();
    assert_eq!(model.meshes.len(), 2);
    assert!(model.meshes.iter().all(|mesh| mesh.textures.is_empty()));

    fs::remove_dir_all(dir).ok();
}

#[test]
fn exploded_model_has_three_vertices_per_triangle() {
    let dir = scratch_dir("exploded");
    let model = ModelData::load(write_crate(&dir)).unwrap();
    let exploded = model.exploded();

    assert_eq!(exploded.meshes.len(), model.meshes.len());
    assert_eq!(exploded.meshes[0].vertices.len(), 6);
    assert_eq!(exploded.meshes[1].vertices.len(), 3);
    assert_eq!(exploded.meshes[0].textures.len(), 2);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn missing_file_is_an_error() {
    let err = ModelData::load("no/such/model.obj").unwrap_err();
    assert!(err.contains("model.obj"), "{err}");
}

#[test]
fn unknown_extension_is_rejected() {
    let err = ModelData::load("scene.fbx").unwrap_err();
    assert!(err.starts_with("Unsupported model format 'fbx'"), "{err}");
}
