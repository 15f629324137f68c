use glam::Vec3;

use crate::renderer::uniforms::{UniformData, UniformLayout, UniformType};

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

// (range, constant, linear, quadratic)
const RANGE_TABLE: [(f32, f32, f32, f32); 12] = [
    (7.0, 1.0, 0.7, 1.8),
    (13.0, 1.0, 0.35, 0.44),
    (20.0, 1.0, 0.22, 0.20),
    (32.0, 1.0, 0.14, 0.07),
    (50.0, 1.0, 0.09, 0.032),
    (65.0, 1.0, 0.07, 0.017),
    (100.0, 1.0, 0.045, 0.0075),
    (160.0, 1.0, 0.027, 0.0028),
    (200.0, 1.0, 0.022, 0.0019),
    (325.0, 1.0, 0.014, 0.0007),
    (600.0, 1.0, 0.007, 0.0002),
    (3250.0, 1.0, 0.0014, 0.000007),
];

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Smallest tabulated falloff that still covers `distance`.
    pub fn for_range(distance: f32) -> Self {
        let (_, constant, linear, quadratic) = RANGE_TABLE
            .iter()
            .copied()
            .find(|(range, ..)| *range >= distance)
            .unwrap_or(RANGE_TABLE[RANGE_TABLE.len() - 1]);
        Self::new(constant, linear, quadratic)
    }

    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::for_range(7.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phong {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Phong {
    fn write(&self, data: &mut UniformData, prefix: &str) {
        data.set_vec3(&format!("{prefix}.ambient"), self.ambient);
        data.set_vec3(&format!("{prefix}.diffuse"), self.diffuse);
        data.set_vec3(&format!("{prefix}.specular"), self.specular);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirLight {
    pub direction: Vec3,
    pub color: Phong,
}

impl DirLight {
    pub fn write(&self, data: &mut UniformData, prefix: &str) {
        data.set_vec3(&format!("{prefix}.direction"), self.direction);
        self.color.write(data, prefix);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Phong,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn write(&self, data: &mut UniformData, prefix: &str) {
        data.set_vec3(&format!("{prefix}.position"), self.position);
        self.color.write(data, prefix);
        write_attenuation(data, prefix, &self.attenuation);
    }
}

/// A cone light. Cut-offs are half-angles in degrees; between the inner and
/// outer cone the intensity fades linearly in cosine space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub cut_off: f32,
    pub outer_cut_off: f32,
    pub color: Phong,
    pub attenuation: Attenuation,
}

impl SpotLight {
    pub fn intensity(&self, cos_theta: f32) -> f32 {
        let inner = self.cut_off.to_radians().cos();
        let outer = self.outer_cut_off.to_radians().cos();
        let epsilon = inner - outer;
        if epsilon <= f32::EPSILON {
            return if cos_theta >= inner { 1.0 } else { 0.0 };
        }
        ((cos_theta - outer) / epsilon).clamp(0.0, 1.0)
    }

    pub fn write(&self, data: &mut UniformData, prefix: &str) {
        data.set_vec3(&format!("{prefix}.position"), self.position);
        data.set_vec3(&format!("{prefix}.direction"), self.direction);
        data.set_f32(&format!("{prefix}.cut_off"), self.cut_off.to_radians().cos());
        data.set_f32(
            &format!("{prefix}.outer_cut_off"),
            self.outer_cut_off.to_radians().cos(),
        );
        self.color.write(data, prefix);
        write_attenuation(data, prefix, &self.attenuation);
    }
}

fn write_attenuation(data: &mut UniformData, prefix: &str, attenuation: &Attenuation) {
    data.set_f32(&format!("{prefix}.constant_term"), attenuation.constant);
    data.set_f32(&format!("{prefix}.linear_term"), attenuation.linear);
    data.set_f32(&format!("{prefix}.quadratic_term"), attenuation.quadratic);
}

/// `struct DirLight { direction, ambient, diffuse, specular: vec3<f32> }`
pub fn dir_light_layout() -> UniformLayout {
    UniformLayout::builder()
        .field("direction", UniformType::Vec3)
        .field("ambient", UniformType::Vec3)
        .field("diffuse", UniformType::Vec3)
        .field("specular", UniformType::Vec3)
        .build()
}

/// Matches the WGSL
/// `struct PointLight { position: vec3<f32>, constant_term: f32, ambient: vec3<f32>,
/// linear_term: f32, diffuse: vec3<f32>, quadratic_term: f32, specular: vec3<f32> }`.
pub fn point_light_layout() -> UniformLayout {
    UniformLayout::builder()
        .field("position", UniformType::Vec3)
        .field("constant_term", UniformType::F32)
        .field("ambient", UniformType::Vec3)
        .field("linear_term", UniformType::F32)
        .field("diffuse", UniformType::Vec3)
        .field("quadratic_term", UniformType::F32)
        .field("specular", UniformType::Vec3)
        .build()
}

pub fn spot_light_layout() -> UniformLayout {
    UniformLayout::builder()
        .field("position", UniformType::Vec3)
        .field("cut_off", UniformType::F32)
        .field("direction", UniformType::Vec3)
        .field("outer_cut_off", UniformType::F32)
        .field("ambient", UniformType::Vec3)
        .field("constant_term", UniformType::F32)
        .field("diffuse", UniformType::Vec3)
        .field("linear_term", UniformType::F32)
        .field("specular", UniformType::Vec3)
        .field("quadratic_term", UniformType::F32)
        .build()
}

pub struct MultipleLights {
    pub directional: DirLight,
    pub points: [PointLight; 4],
}

/// The light rig of the multiple-lights lesson: one weak sun plus four lamps.
pub fn multiple_lights_scene() -> MultipleLights {
    let lamp = |position: Vec3| PointLight {
        position,
        color: Phong {
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(0.5),
        },
        attenuation: Attenuation::default(),
    };

    MultipleLights {
        directional: DirLight {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            color: Phong {
                ambient: Vec3::splat(0.05),
                diffuse: Vec3::splat(0.4),
                specular: Vec3::splat(0.5),
            },
        },
        points: [
            lamp(Vec3::new(0.7, 0.2, 2.0)),
            lamp(Vec3::new(2.3, -2.7, -4.0)),
            lamp(Vec3::new(-4.0, 2.0, -12.0)),
            lamp(Vec3::new(0.0, 0.0, -3.0)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attenuation_matches_short_range_row() {
        let att = Attenuation::default();
        assert_eq!(att, Attenuation::new(1.0, 0.7, 1.8));
        assert_eq!(att.factor(0.0), 1.0);
        assert!((att.factor(1.0) - 1.0 / 3.5).abs() < 1e-6);
    }

    #[test]
    fn for_range_picks_covering_row() {
        assert_eq!(Attenuation::for_range(50.0), Attenuation::new(1.0, 0.09, 0.032));
        assert_eq!(Attenuation::for_range(51.0), Attenuation::new(1.0, 0.07, 0.017));
        assert_eq!(
            Attenuation::for_range(10_000.0),
            Attenuation::new(1.0, 0.0014, 0.000007)
        );
    }

    #[test]
    fn attenuation_falls_off_monotonically() {
        let att = Attenuation::for_range(32.0);
        let mut previous = att.factor(0.0);
        for step in 1..40 {
            let current = att.factor(step as f32);
            assert!(current < previous);
            previous = current;
        }
    }

    fn flashlight() -> SpotLight {
        SpotLight {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            cut_off: 12.5,
            outer_cut_off: 17.5,
            color: Phong {
                ambient: Vec3::ZERO,
                diffuse: Vec3::ONE,
                specular: Vec3::ONE,
            },
            attenuation: Attenuation::for_range(50.0),
        }
    }

    #[test]
    fn spot_intensity_is_full_inside_and_zero_outside() {
        let light = flashlight();
        assert_eq!(light.intensity(1.0), 1.0);
        assert_eq!(light.intensity(20f32.to_radians().cos()), 0.0);

        let halfway = light.intensity(15f32.to_radians().cos());
        assert!(halfway > 0.0 && halfway < 1.0);
    }

    #[test]
    fn point_light_layout_matches_wgsl_offsets() {
        let layout = point_light_layout();
        let offset = |name: &str| layout.field(name).map(|f| f.offset);
        assert_eq!(offset("position"), Some(0));
        assert_eq!(offset("constant_term"), Some(12));
        assert_eq!(offset("ambient"), Some(16));
        assert_eq!(offset("linear_term"), Some(28));
        assert_eq!(offset("diffuse"), Some(32));
        assert_eq!(offset("quadratic_term"), Some(44));
        assert_eq!(offset("specular"), Some(48));
        assert_eq!(layout.size(), 64);
    }

    #[test]
    fn lights_write_every_field_by_name() {
        let layout = UniformLayout::builder()
            .struct_field("dir_light", &dir_light_layout())
            .struct_array("point_lights", &point_light_layout(), 4)
            .struct_field("spot_light", &spot_light_layout())
            .build();
        let mut data = UniformData::new(layout);

        let scene = multiple_lights_scene();
        scene.directional.write(&mut data, "dir_light");
        for (i, light) in scene.points.iter().enumerate() {
            light.write(&mut data, &format!("point_lights[{i}]"));
        }
        flashlight().write(&mut data, "spot_light");

        assert_eq!(data.get_f32("point_lights[2].linear_term"), Some(0.7));
        assert_eq!(data.get_f32("point_lights[3].quadratic_term"), Some(1.8));
        assert_eq!(data.get_f32("dir_light.diffuse"), Some(0.4));
        let cut_off = data.get_f32("spot_light.cut_off").unwrap();
        assert!((cut_off - 12.5f32.to_radians().cos()).abs() < 1e-6);
    }
}
