// renderer/texture.rs

use std::path::{Path, PathBuf};

use image::RgbaImage;
use rayon::prelude::*;

use crate::renderer::mipmaps;

/// How an image is turned into a sampled texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureOptions {
    pub flip_vertically: bool,
    pub address_mode: wgpu::AddressMode,
    pub srgb: bool,
    pub generate_mipmaps: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            flip_vertically: false,
            address_mode: wgpu::AddressMode::Repeat,
            srgb: false,
            generate_mipmaps: true,
        }
    }
}

impl TextureOptions {
    /// Clamp-to-edge wrapping, for textures with transparent borders.
    pub fn clamped() -> Self {
        Self {
            address_mode: wgpu::AddressMode::ClampToEdge,
            ..Self::default()
        }
    }

    pub fn flipped(mut self) -> Self {
        self.flip_vertically = !self.flip_vertically;
        self
    }

    /// Storage format plus the view format sampled through. sRGB data is
    /// stored linear so the mip blit can render into it.
    fn formats(&self) -> (wgpu::TextureFormat, Option<wgpu::TextureFormat>) {
        let view = self.srgb.then_some(wgpu::TextureFormat::Rgba8UnormSrgb);
        (wgpu::TextureFormat::Rgba8Unorm, view)
    }
}

/// Sampler with linear min/mag filtering and one wrap mode on every axis.
pub(crate) fn linear_sampler(
    device: &wgpu::Device,
    label: &str,
    address_mode: wgpu::AddressMode,
    mipmap_filter: wgpu::FilterMode,
) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter,
        ..Default::default()
    })
}

fn extent(width: u32, height: u32, layers: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: layers,
    }
}

/// A sampled 2D texture: what `glGenTextures` + `glTexImage2D` produce.
#[derive(Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) -> Result<Self, String> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let image = decode_image(path, options.flip_vertically)?;
        let label = path.display().to_string();
        Ok(Self::from_image(device, queue, &image, options, Some(&label)))
    }

    /// Like `from_path`, but a load failure is logged and replaced by a
    /// magenta checkerboard so the lesson keeps running.
    pub fn from_path_or_fallback(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) -> Self {
        let path = path.as_ref();
        Self::from_path(device, queue, path, options).unwrap_or_else(|err| {
            log::error!("Texture failed to load at path {:?}: {}", path, err);
            Self::missing(device, queue)
        })
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        options: TextureOptions,
        label: Option<&str>,
    ) -> Self {
        let (storage_format, view_format) = options.formats();
        let mip_level_count = if options.generate_mipmaps {
            mipmaps::level_count(image.width(), image.height())
        } else {
            1
        };
        let size = extent(image.width(), image.height(), 1);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: storage_format,
            // mip levels are rendered from the level above
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: view_format.as_slice(),
        });

        queue.write_texture(
            texture.as_image_copy(),
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );
        mipmaps::generate(device, queue, &texture, storage_format);

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(view_format.unwrap_or(storage_format)),
            ..Default::default()
        });
        let sampler = linear_sampler(
            device,
            label.unwrap_or("Texture"),
            options.address_mode,
            wgpu::FilterMode::Linear,
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Colour attachment that can later be sampled, for offscreen passes.
    pub fn render_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: Option<&str>,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: extent(width, height, 1),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = linear_sampler(
            device,
            label.unwrap_or("Render Target"),
            wgpu::AddressMode::ClampToEdge,
            wgpu::FilterMode::Nearest,
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// 1x1 texture of a single colour.
    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba(color));
        Self::from_image(device, queue, &image, TextureOptions::default(), label)
    }

    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: u32,
        cell: u32,
        colors: [[u8; 4]; 2],
        label: Option<&str>,
    ) -> Self {
        let image = checkerboard_image(size, cell, colors);
        Self::from_image(device, queue, &image, TextureOptions::default(), label)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Stand-in for a texture that failed to load.
    pub fn missing(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::checkerboard(
            device,
            queue,
            64,
            8,
            [[255, 0, 255, 255], [0, 0, 0, 255]],
            Some("Missing Texture"),
        )
    }

    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_color(device, queue, [255; 4], Some("White"))
    }

    pub fn black(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_color(device, queue, [0, 0, 0, 255], Some("Black"))
    }

    /// `textures` filterable 2D textures at bindings `0..textures`, then one
    /// filtering sampler, all visible to the fragment stage.
    pub fn bind_group_layout(
        device: &wgpu::Device,
        label: &str,
        textures: u32,
    ) -> wgpu::BindGroupLayout {
        let sampler = wgpu::BindGroupLayoutEntry {
            binding: textures,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..textures)
            .map(|binding| texture_entry(binding, wgpu::TextureViewDimension::D2))
            .chain(std::iter::once(sampler))
            .collect();

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &entries,
        })
    }

    /// Bind group for a layout from `bind_group_layout`; the first texture's sampler is used.
    pub fn bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        textures: &[&Texture],
        label: &str,
    ) -> wgpu::BindGroup {
        let views = textures.iter().map(|texture| &texture.view);
        let sampler = textures.first().map(|texture| &texture.sampler);
        let entries: Vec<wgpu::BindGroupEntry> = views
            .map(wgpu::BindingResource::TextureView)
            .chain(sampler.map(wgpu::BindingResource::Sampler))
            .enumerate()
            .map(|(binding, resource)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource,
            })
            .collect();

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }
}

fn texture_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

/// Decodes any supported image file to RGBA8. Grey, grey-alpha and RGB
/// sources are expanded; the source channel count is logged.
pub fn decode_image(path: &Path, flip_vertically: bool) -> Result<RgbaImage, String> {
    let decoded =
        image::open(path).map_err(|err| format!("Failed to load image {:?}: {}", path, err))?;
    log::debug!(
        "Decoded {:?}: {}x{}, {} channel(s)",
        path,
        decoded.width(),
        decoded.height(),
        decoded.color().channel_count()
    );

    let decoded = if flip_vertically {
        decoded.flipv()
    } else {
        decoded
    };
    Ok(decoded.into_rgba8())
}

/// `size`x`size` image of `cell`-wide squares, `colors[0]` in the top-left one.
pub fn checkerboard_image(size: u32, cell: u32, colors: [[u8; 4]; 2]) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        image::Rgba(colors[((x / cell + y / cell) % 2) as usize])
    })
}

/// Cubemap faces in layer order: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Six-layer texture viewed as a cube, for skyboxes and environment lookups.
#[derive(Debug)]
pub struct Cubemap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Cubemap {
    /// `dir/right.ext`, `dir/left.ext`, ... in layer order.
    pub fn face_paths(dir: impl AsRef<Path>, extension: &str) -> [PathBuf; 6] {
        let dir = dir.as_ref();
        CUBE_FACE_NAMES.map(|name| dir.join(format!("{name}.{extension}")))
    }

    pub fn from_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[PathBuf; 6],
    ) -> Result<Self, String> {
        let decoded: Vec<Result<RgbaImage, String>> = faces
            .as_slice()
            .par_iter()
            .map(|path| decode_image(path, false))
            .collect();

        let mut images = Vec::with_capacity(6);
        let mut first_error = None;
        for (path, result) in faces.iter().zip(decoded) {
            match result {
                Ok(image) => images.push(image),
                Err(err) => {
                    log::error!("Cubemap texture failed to load at path {:?}: {}", path, err);
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let size = validate_faces(&images)?;
        Ok(Self::from_images(device, queue, &images, size))
    }

    /// Like `from_faces`, falling back to a flat-coloured cube when a face is unusable.
    pub fn from_faces_or_fallback(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[PathBuf; 6],
    ) -> Self {
        match Self::from_faces(device, queue, faces) {
            Ok(cubemap) => cubemap,
            Err(err) => {
                log::error!("Using fallback cubemap: {}", err);
                let faces: Vec<RgbaImage> = FALLBACK_FACE_COLORS
                    .iter()
                    .map(|color| RgbaImage::from_pixel(1, 1, image::Rgba(*color)))
                    .collect();
                Self::from_images(device, queue, &faces, 1)
            }
        }
    }

    fn from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: &[RgbaImage],
        size: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Cubemap"),
            size: extent(size, size, 6),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, image) in (0u32..).zip(images) {
            let mut target = texture.as_image_copy();
            target.origin.z = layer;
            queue.write_texture(
                target,
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size),
                    rows_per_image: Some(size),
                },
                extent(size, size, 1),
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cubemap"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = linear_sampler(
            device,
            "Cubemap",
            wgpu::AddressMode::ClampToEdge,
            wgpu::FilterMode::Nearest,
        );

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Cube texture at binding 0 and its sampler at binding 1.
    pub fn bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cubemap"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

// sky above, ground below, a different tint per side
const FALLBACK_FACE_COLORS: [[u8; 4]; 6] = [
    [110, 140, 190, 255],
    [100, 130, 180, 255],
    [160, 190, 230, 255],
    [60, 55, 50, 255],
    [120, 150, 200, 255],
    [90, 120, 170, 255],
];

/// Checks that all six faces are square and equally sized; returns the edge length.
pub fn validate_faces(images: &[RgbaImage]) -> Result<u32, String> {
    if images.len() != 6 {
        return Err(format!("A cubemap needs 6 faces, got {}", images.len()));
    }

    let (width, height) = images[0].dimensions();
    if width != height {
        return Err(format!("Cubemap faces must be square, got {}x{}", width, height));
    }

    for (face, image) in CUBE_FACE_NAMES.iter().zip(images) {
        if image.dimensions() != (width, height) {
            let (w, h) = image.dimensions();
            return Err(format!(
                "Cubemap face '{}' is {}x{}, expected {}x{}",
                face, w, h, width, height
            ));
        }
    }

    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_is_a_view_over_linear_storage() {
        let srgb = TextureOptions {
            srgb: true,
            ..Default::default()
        };
        assert_eq!(
            srgb.formats(),
            (
                wgpu::TextureFormat::Rgba8Unorm,
                Some(wgpu::TextureFormat::Rgba8UnormSrgb)
            )
        );
        assert_eq!(
            TextureOptions::default().formats(),
            (wgpu::TextureFormat::Rgba8Unorm, None)
        );
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let a = [255, 0, 255, 255];
        let b = [0, 0, 0, 255];
        let image = checkerboard_image(4, 2, [a, b]);

        assert_eq!(image.get_pixel(0, 0).0, a);
        assert_eq!(image.get_pixel(1, 1).0, a);
        assert_eq!(image.get_pixel(2, 0).0, b);
        assert_eq!(image.get_pixel(0, 2).0, b);
        assert_eq!(image.get_pixel(3, 3).0, a);
    }

    #[test]
    fn options_flip_toggles() {
        let options = TextureOptions::default().flipped();
        assert!(options.flip_vertically);
        assert!(!options.flipped().flip_vertically);
        assert_eq!(
            TextureOptions::clamped().address_mode,
            wgpu::AddressMode::ClampToEdge
        );
    }

    #[test]
    fn face_paths_follow_layer_order() {
        let paths = Cubemap::face_paths("skybox", "jpg");
        assert_eq!(paths[0], PathBuf::from("skybox/right.jpg"));
        assert_eq!(paths[2], PathBuf::from("skybox/top.jpg"));
        assert_eq!(paths[5], PathBuf::from("skybox/back.jpg"));
    }

    #[test]
    fn validate_faces_accepts_matching_squares() {
        let faces = vec![RgbaImage::new(8, 8); 6];
        assert_eq!(validate_faces(&faces), Ok(8));
    }

    #[test]
    fn validate_faces_rejects_bad_input() {
        assert!(validate_faces(&vec![RgbaImage::new(8, 8); 5]).is_err());
        assert!(validate_faces(&vec![RgbaImage::new(8, 4); 6]).is_err());

        let mut faces = vec![RgbaImage::new(8, 8); 6];
        faces[4] = RgbaImage::new(16, 16);
        let err = validate_faces(&faces).unwrap_err();
        assert!(err.contains("front"));
    }

    #[test]
    fn decode_flips_rows_on_request() {
        let path = std::env::temp_dir().join(format!("lesson-flip-{}.png", std::process::id()));
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        image.save(&path).unwrap();

        let upright = decode_image(&path, false).unwrap();
        let flipped = decode_image(&path, true).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(upright.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn grey_images_expand_to_opaque_rgba() {
        let path = std::env::temp_dir().join(format!("lesson-grey-{}.png", std::process::id()));
        image::GrayImage::from_pixel(2, 2, image::Luma([128])).save(&path).unwrap();

        let decoded = decode_image(&path, false).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [128, 128, 128, 255]);
    }

    #[test]
    fn decode_reports_missing_files() {
        let err = decode_image(Path::new("no/such/image.png"), false).unwrap_err();
        assert!(err.contains("no/such/image.png"));
    }
}
