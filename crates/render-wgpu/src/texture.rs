use skyline_assets::{ImageData, SkyboxImages};
use skyline_common::SkyboxFace;

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A sampled texture and the view shaders bind.
pub struct GpuTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

fn write_layers(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    pixels: &[u8],
    row_bytes: u32,
    (width, height): (u32, u32),
    layers: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(row_bytes),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        },
    );
}

fn create(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    layers: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

impl GpuTexture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &ImageData,
    ) -> Self {
        let texture = create(device, label, image.width, image.height, 1);
        write_layers(
            queue,
            &texture,
            &image.pixels,
            image.row_bytes(),
            (image.width, image.height),
            1,
        );
        let view = texture.create_view(&Default::default());
        Self {
            _texture: texture,
            view,
        }
    }

    /// 1x1 opaque white, bound wherever geometry does not sample a facade.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let image = ImageData {
            width: 1,
            height: 1,
            channels: 4,
            pixels: vec![255; 4],
        };
        Self::from_image(device, queue, "white_texture", &image)
    }

    /// Six square layers viewed as a cube map.
    pub fn cube(device: &wgpu::Device, queue: &wgpu::Queue, skybox: &SkyboxImages) -> Self {
        let size = skybox.size();
        let texture = create(device, "skybox_texture", size, size, 6);
        // Every face shares one size, so any face gives the row pitch.
        let row_bytes = skybox.face(SkyboxFace::Right).row_bytes();
        write_layers(
            queue,
            &texture,
            &skybox.layered_pixels(),
            row_bytes,
            (size, size),
            6,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self {
            _texture: texture,
            view,
        }
    }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
