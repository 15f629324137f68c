//! The lesson shaders parse, validate, and declare every entry point their
//! pipelines ask for.

use render_lessons::renderer::shader::{scan_entry_points, EntryPoint};
use render_lessons::renderer::ShaderStage;

const SHADERS: &[(&str, &str)] = &[
    ("advanced_glsl", include_str!("../demos/shaders/advanced_glsl.wgsl")),
    ("camera", include_str!("../demos/shaders/camera.wgsl")),
    ("colors", include_str!("../demos/shaders/colors.wgsl")),
    ("cubemaps", include_str!("../demos/shaders/cubemaps.wgsl")),
    ("depth_testing", include_str!("../demos/shaders/depth_testing.wgsl")),
    ("flat", include_str!("../demos/shaders/flat.wgsl")),
    ("geometry", include_str!("../demos/shaders/geometry.wgsl")),
    ("instancing", include_str!("../demos/shaders/instancing.wgsl")),
    ("light_casters", include_str!("../demos/shaders/light_casters.wgsl")),
    ("lighting_maps", include_str!("../demos/shaders/lighting_maps.wgsl")),
    ("model", include_str!("../demos/shaders/model.wgsl")),
    ("multiple_lights", include_str!("../demos/shaders/multiple_lights.wgsl")),
    ("screen", include_str!("../demos/shaders/screen.wgsl")),
    ("skybox", include_str!("../demos/shaders/skybox.wgsl")),
    ("textured", include_str!("../demos/shaders/textured.wgsl")),
    ("textures", include_str!("../demos/shaders/textures.wgsl")),
    ("vertex_color", include_str!("../demos/shaders/vertex_color.wgsl")),
];

fn entries(shader: &str) -> Vec<EntryPoint> {
    let (_, source) = SHADERS
        .iter()
        .find(|(name, _)| *name == shader)
        .unwrap_or_else(|| panic!("no shader named {shader}"));
    scan_entry_points(source)
}

fn fragment_names(shader: &str) -> Vec<String> {
    entries(shader)
        .into_iter()
        .filter(|e| e.stage == ShaderStage::Fragment)
        .map(|e| e.name)
        .collect()
}

#[test]
fn every_shader_parses_and_validates() {
    for (name, source) in SHADERS {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|err| panic!("{name}.wgsl:\n{}", err.emit_to_string(source)));

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        );
        if let Err(err) = validator.validate(&module) {
            panic!("{name}.wgsl failed validation: {err:?}");
        }
    }
}

#[test]
fn mistyped_shader_is_rejected() {
    let source = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec3<f32>(1.0); }";
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    let rejected = match naga::front::wgsl::parse_str(source) {
        Ok(module) => validator.validate(&module).is_err(),
        Err(_) => true,
    };
    assert!(rejected, "a vec3 returned as vec4 was accepted");
}

#[test]
fn every_shader_has_the_default_entry_points() {
    for (name, source) in SHADERS {
        let found = scan_entry_points(source);
        assert!(
            found.contains(&EntryPoint {
                stage: ShaderStage::Vertex,
                name: "vs_main".into()
            }),
            "{name}.wgsl has no vs_main"
        );
        assert!(
            found.iter().any(|e| e.stage == ShaderStage::Fragment),
            "{name}.wgsl has no fragment stage"
        );
        assert!(
            found.iter().all(|e| e.stage != ShaderStage::Compute),
            "{name}.wgsl declares a compute entry"
        );
    }
}

#[test]
fn lamp_variants_exist_for_lighting_lessons() {
    assert_eq!(fragment_names("colors"), ["fs_lit", "fs_lamp"]);
    assert_eq!(fragment_names("lighting_maps"), ["fs_main", "fs_lamp"]);
    assert_eq!(fragment_names("multiple_lights"), ["fs_main", "fs_lamp"]);
}

#[test]
fn advanced_glsl_has_one_colour_per_cube() {
    assert_eq!(
        fragment_names("advanced_glsl"),
        ["fs_red", "fs_green", "fs_blue", "fs_yellow"]
    );
}

#[test]
fn alternate_fragment_entries_are_declared() {
    assert!(fragment_names("flat").contains(&"fs_yellow".to_string()));
    assert!(fragment_names("textured").contains(&"fs_cutout".to_string()));
}
