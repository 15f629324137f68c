use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "lessons.json";
const SETTINGS_ENV: &str = "LESSONS_SETTINGS";

/// Options shared by every lesson, read from `lessons.json`. Any field left
/// out of the file keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonSettings {
    pub resolution: Resolution,
    pub present_mode: PresentModeSetting,
    pub asset_root: PathBuf,
    pub capture_cursor: bool,
    pub instancing: InstancingSettings,
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
            asset_root: PathBuf::from("assets"),
            capture_cursor: true,
            instancing: InstancingSettings::default(),
        }
    }
}

impl LessonSettings {
    /// Reads `$LESSONS_SETTINGS`, or `lessons.json` in the working directory.
    pub fn load() -> Self {
        let path = std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
        Self::load_from_path(path)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings at {:?}, using defaults", path);
                Self::default()
            }
            Err(err) => {
                warn!("Could not read settings {:?}: {}. Using defaults", path, err);
                Self::default()
            }
        }
    }

    fn from_json(contents: &str, origin: &Path) -> Self {
        serde_json::from_str::<LessonSettings>(contents)
            .map(|settings| {
                info!("Loaded settings from {:?}", origin);
                settings.validate()
            })
            .unwrap_or_else(|err| {
                warn!("Malformed settings {:?}: {}. Using defaults", origin, err);
                Self::default()
            })
    }

    fn validate(mut self) -> Self {
        let defaults = Self::default();

        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!(
                "Window size {}x{} is empty, using {}x{}",
                self.resolution.width,
                self.resolution.height,
                defaults.resolution.width,
                defaults.resolution.height
            );
            self.resolution = defaults.resolution;
        }

        if self.instancing.amount == 0 {
            warn!(
                "Asteroid count of 0 replaced by {}",
                defaults.instancing.amount
            );
            self.instancing.amount = defaults.instancing.amount;
        }

        if !(self.instancing.radius.is_finite() && self.instancing.radius > 0.0) {
            warn!(
                "Asteroid ring radius {} replaced by {}",
                self.instancing.radius, defaults.instancing.radius
            );
            self.instancing.radius = defaults.instancing.radius;
        }

        // the scatter range is -offset..offset and has to stay finite
        let offset = self.instancing.offset;
        if !(offset.is_finite() && offset >= 0.0) {
            warn!(
                "Asteroid scatter offset {} replaced by {}",
                offset, defaults.instancing.offset
            );
            self.instancing.offset = defaults.instancing.offset.min(self.instancing.radius);
        } else if offset > self.instancing.radius {
            warn!(
                "Asteroid scatter offset {} is wider than the ring, capped at {}",
                offset, self.instancing.radius
            );
            self.instancing.offset = self.instancing.radius;
        }

        self
    }

    /// Path of an asset relative to the configured asset root.
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    /// The configured mode if the surface offers it, else FIFO, else whatever comes first.
    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let wanted = wgpu::PresentMode::from(self.present_mode);
        if available.contains(&wanted) {
            return wanted;
        }

        let fallback = if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available.first().copied().unwrap_or(wgpu::PresentMode::Fifo)
        };
        warn!(
            "Present mode {:?} unsupported by this surface, using {:?}",
            wanted, fallback
        );
        fallback
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// The asteroid ring of the instancing lesson.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InstancingSettings {
    pub amount: u32,
    pub radius: f32,
    pub offset: f32,
}

impl Default for InstancingSettings {
    fn default() -> Self {
        Self {
            amount: 10_000,
            radius: 150.0,
            offset: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl From<PresentModeSetting> for wgpu::PresentMode {
    fn from(setting: PresentModeSetting) -> Self {
        match setting {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailbox() -> LessonSettings {
        LessonSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..LessonSettings::default()
        }
    }

    #[test]
    fn empty_window_and_ring_are_replaced() {
        let settings = LessonSettings {
            resolution: Resolution {
                width: 1280,
                height: 0,
            },
            instancing: InstancingSettings {
                amount: 0,
                radius: f32::NAN,
                offset: 2.5,
            },
            ..LessonSettings::default()
        }
        .validate();

        assert_eq!(settings.resolution.width, 800);
        assert_eq!(settings.resolution.height, 600);
        assert_eq!(settings.instancing.amount, 10_000);
        assert_eq!(settings.instancing.radius, 150.0);
        // offset has no invalid range and is kept
        assert_eq!(settings.instancing.offset, 2.5);
    }

    #[test]
    fn scatter_offset_is_kept_finite_and_inside_the_ring() {
        let ring = |offset: f32| {
            LessonSettings::from_json(
                &format!(
                    r#"{{ "instancing": {{ "amount": 4, "radius": 10.0, "offset": {offset:e} }} }}"#
                ),
                Path::new("inline"),
            )
            .instancing
        };

        assert_eq!(ring(3.0e38).offset, 10.0);
        assert_eq!(ring(-5.0).offset, 10.0);
        assert_eq!(ring(2.5).offset, 2.5);
        assert_eq!(ring(0.0).offset, 0.0);

        let rocks = crate::instancing::AsteroidField::from(ring(3.0e38)).generate();
        assert_eq!(rocks.len(), 4);
        assert!(rocks.iter().all(|m| m.w_axis.is_finite()));

        // a negative offset no longer collapses every rock onto the circle
        let scattered = crate::instancing::AsteroidField::from(ring(-5.0)).generate();
        assert!(scattered
            .iter()
            .any(|m| m.w_axis.y.abs() > 1e-6));
    }

    #[test]
    fn fields_missing_from_the_file_keep_defaults() {
        let settings = LessonSettings::from_json(
            r#"{ "present_mode": "immediate", "instancing": { "amount": 2000 } }"#,
            Path::new("inline"),
        );

        assert_eq!(settings.present_mode, PresentModeSetting::Immediate);
        assert_eq!(settings.resolution.width, 800);
        assert_eq!(settings.asset_root, PathBuf::from("assets"));
        assert!(settings.capture_cursor);
        assert_eq!(settings.instancing.amount, 2000);
        assert_eq!(settings.instancing.radius, 150.0);
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let settings = LessonSettings::from_json(r#"{ "resolution": 3 "#, Path::new("inline"));
        assert_eq!(settings.resolution.width, 800);
        assert_eq!(settings.present_mode, PresentModeSetting::Fifo);
    }

    #[test]
    fn settings_file_on_disk_is_read() {
        let path =
            std::env::temp_dir().join(format!("lessons-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "capture_cursor": false, "asset_root": "data" }"#).unwrap();

        let settings = LessonSettings::load_from_path(&path);
        std::fs::remove_file(&path).ok();

        assert!(!settings.capture_cursor);
        assert_eq!(
            settings.asset("textures/container.jpg"),
            PathBuf::from("data/textures/container.jpg")
        );
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = LessonSettings::load_from_path("no/settings/here/lessons.json");
        assert_eq!(settings.resolution.width, 800);
        assert_eq!(settings.resolution.height, 600);
    }

    #[test]
    fn supported_present_mode_is_kept() {
        let available = [
            wgpu::PresentMode::Fifo,
            wgpu::PresentMode::Mailbox,
            wgpu::PresentMode::Immediate,
        ];
        assert_eq!(mailbox().present_mode(&available), wgpu::PresentMode::Mailbox);
    }

    #[test]
    fn unsupported_present_mode_prefers_fifo() {
        let available = [wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo];
        assert_eq!(mailbox().present_mode(&available), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn without_fifo_the_first_mode_wins() {
        let available = [wgpu::PresentMode::Immediate];
        assert_eq!(mailbox().present_mode(&available), wgpu::PresentMode::Immediate);
    }
}
