use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::settings::InstancingSettings;

/// Parameters for a ring of randomly displaced, scaled and rotated rocks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AsteroidField {
    pub amount: u32,
    pub radius: f32,
    pub offset: f32,
    pub seed: u64,
}

impl AsteroidField {
    /// Small ring meant to be drawn one rock per draw call.
    pub fn naive() -> Self {
        Self {
            amount: 2000,
            radius: 30.0,
            offset: 2.5,
            seed: 0x5eed,
        }
    }

    /// Large ring for a single instanced draw.
    pub fn instanced() -> Self {
        Self {
            amount: 10_000,
            radius: 150.0,
            offset: 25.0,
            seed: 0x5eed,
        }
    }

    pub fn generate(&self) -> Vec<Mat4> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let axis = Vec3::new(0.4, 0.6, 0.8).normalize();
        let amount = self.amount.max(1) as f32;

        (0..self.amount)
            .map(|i| {
                let angle = (i as f32 / amount * 360.0).to_radians();

                let mut displacement = || {
                    if self.offset > 0.0 {
                        rng.gen_range(-self.offset..self.offset)
                    } else {
                        0.0
                    }
                };
                let x = angle.sin() * self.radius + displacement();
                // keep the ring flatter than it is wide
                let y = displacement() * 0.4;
                let z = angle.cos() * self.radius + displacement();

                let scale = rng.gen_range(0.05..0.25);
                let rotation = rng.gen_range(0.0f32..360.0).to_radians();

                Mat4::from_translation(Vec3::new(x, y, z))
                    * Mat4::from_scale(Vec3::splat(scale))
                    * Mat4::from_axis_angle(axis, rotation)
            })
            .collect()
    }
}

/// Where the orbiting camera sits after `elapsed` seconds: `radius` out from
/// the ring's centre, `height` above it, `angle` radians around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraOrbit {
    pub radius: f32,
    pub height: f32,
    pub angle: f32,
}

impl AsteroidField {
    /// A 150-unit ring is circled at 200 units out and 80 up, one radian
    /// every pi seconds; other rings scale the distances with their radius.
    pub fn camera_orbit(&self, elapsed: f32) -> CameraOrbit {
        CameraOrbit {
            radius: self.radius * 4.0 / 3.0,
            height: self.radius * 8.0 / 15.0,
            angle: elapsed / PI,
        }
    }
}

impl From<InstancingSettings> for AsteroidField {
    fn from(settings: InstancingSettings) -> Self {
        Self {
            amount: settings.amount,
            radius: settings.radius,
            offset: settings.offset,
            ..Self::instanced()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_one_matrix_per_rock() {
        let field = AsteroidField {
            amount: 500,
            ..AsteroidField::naive()
        };
        assert_eq!(field.generate().len(), 500);
    }

    #[test]
    fn same_seed_gives_same_field() {
        let field = AsteroidField::naive();
        assert_eq!(field.generate(), field.generate());

        let other = AsteroidField {
            seed: 7,
            ..field
        };
        assert_ne!(field.generate(), other.generate());
    }

    #[test]
    fn rocks_stay_inside_the_ring_band() {
        let field = AsteroidField::naive();
        for model in field.generate() {
            let position = model.w_axis.truncate();
            let planar = Vec3::new(position.x, 0.0, position.z).length();
            let slack = field.offset * 2f32.sqrt();

            assert!(planar >= field.radius - slack - 1e-3);
            assert!(planar <= field.radius + slack + 1e-3);
            assert!(position.y.abs() <= field.offset * 0.4);
        }
    }

    #[test]
    fn rock_scale_is_within_range() {
        for model in AsteroidField::instanced().generate().iter().take(1000) {
            let scale = model.x_axis.truncate().length();
            assert!(scale > 0.05 - 1e-5 && scale < 0.25 + 1e-5, "scale {scale}");
        }
    }

    #[test]
    fn settings_override_everything_but_the_seed() {
        let field = AsteroidField::from(InstancingSettings {
            amount: 12,
            radius: 40.0,
            offset: 3.0,
        });
        assert_eq!(field.amount, 12);
        assert_eq!(field.radius, 40.0);
        assert_eq!(field.offset, 3.0);
        assert_eq!(field.seed, AsteroidField::instanced().seed);
    }

    #[test]
    fn camera_circles_outside_the_ring() {
        let orbit = AsteroidField::instanced().camera_orbit(PI);
        assert!((orbit.radius - 200.0).abs() < 1e-3);
        assert!((orbit.height - 80.0).abs() < 1e-3);
        assert!((orbit.angle - 1.0).abs() < 1e-6);

        let small = AsteroidField::naive().camera_orbit(0.0);
        assert!((small.radius - 40.0).abs() < 1e-3);
        assert!((small.height - 16.0).abs() < 1e-3);
        assert_eq!(small.angle, 0.0);
    }

    #[test]
    fn zero_offset_places_rocks_on_the_circle() {
        let field = AsteroidField {
            amount: 4,
            radius: 10.0,
            offset: 0.0,
            seed: 1,
        };
        let positions: Vec<Vec3> = field
            .generate()
            .iter()
            .map(|m| m.w_axis.truncate())
            .collect();

        assert!(positions[0].abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-4));
        assert!(positions[1].abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-4));
    }
}
