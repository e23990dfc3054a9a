//! GPU textures
//!
//! Only procedural textures are needed: a white placeholder and the ground
//! checkerboard, both generated with the `image` crate.

use image::{Rgba, RgbaImage};
use wgpu::util::DeviceExt;

/// A GPU texture with its view and sampler
#[derive(Debug)]
pub struct Texture {
    /// The GPU texture
    pub texture: wgpu::Texture,
    /// Texture view for binding
    pub view: wgpu::TextureView,
    /// Sampler for texture filtering
    pub sampler: wgpu::Sampler,
    /// Texture dimensions
    pub size: wgpu::Extent3d,
}

impl Texture {
    /// Upload an RGBA8 image
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &RgbaImage,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: img.width(),
            height: img.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            img.as_raw(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size,
        }
    }

    /// Create a 1x1 white texture
    #[must_use]
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        Self::from_image(device, queue, &img, Some("white_texture"))
    }

    /// Two-tone checkerboard, two cells per texture repeat
    #[must_use]
    pub fn checkerboard(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_image(device, queue, &checker_image(64), Some("checker_texture"))
    }

    /// Get texture width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width
    }

    /// Get texture height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height
    }
}

fn checker_image(size: u32) -> RgbaImage {
    let half = (size / 2).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / half + y / half) % 2 == 0 {
            Rgba([230, 230, 230, 255])
        } else {
            Rgba([90, 90, 90, 255])
        }
    })
}
