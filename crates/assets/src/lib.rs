//! Asset loading: decoded RGBA8 images for building facades and the skybox.
//!
//! The renderer never touches files. It receives [`ImageData`] already
//! decoded and validated; any failure here is fatal at startup.
//!
//! # Layout
//! Assets live under one root directory:
//! - `textures/building.jpg`, `textures/building2.jpg` (facades)
//! - `textures/{right,left,top,bottom,back,front}.tga` (skybox)

use skyline_common::{FacadeTexture, SkyboxFace};
use std::path::{Path, PathBuf};

/// Directory under the asset root holding every texture.
pub const TEXTURE_DIR: &str = "textures";

/// A decoded image, always expanded to 8-bit RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file before expansion.
    pub channels: u8,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Bytes per row of the RGBA8 buffer.
    pub fn row_bytes(&self) -> u32 {
        self.width * 4
    }
}

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path} is empty")]
    Empty { path: PathBuf },
    #[error("skybox face {face:?} is {width}x{height}; faces must be square")]
    NotSquare { face: SkyboxFace, width: u32, height: u32 },
    #[error("skybox face {face:?} is {size}px but {expected}px was expected")]
    SizeMismatch {
        face: SkyboxFace,
        size: u32,
        expected: u32,
    },
}

/// Decode an image file into RGBA8.
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData, AssetError> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let channels = decoded.color().channel_count();
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(path = %path.display(), width, height, channels, "loaded image");
    Ok(ImageData {
        width,
        height,
        channels,
        pixels: rgba.into_raw(),
    })
}

/// The two facade images, indexed by [`FacadeTexture`].
#[derive(Debug, Clone)]
pub struct FacadeTextureSet {
    images: [ImageData; 2],
}

impl FacadeTextureSet {
    /// Load `root/textures/<file>` for each facade, in [`FacadeTexture::ALL`] order.
    pub fn load(root: impl AsRef<Path>, files: [&str; 2]) -> Result<Self, AssetError> {
        let dir = root.as_ref().join(TEXTURE_DIR);
        let [a, b] = files;
        Ok(Self {
            images: [load_image(dir.join(a))?, load_image(dir.join(b))?],
        })
    }

    pub fn get(&self, texture: FacadeTexture) -> &ImageData {
        &self.images[texture.index()]
    }
}

/// Six validated skybox faces sharing one square size.
#[derive(Debug, Clone)]
pub struct SkyboxImages {
    size: u32,
    faces: [ImageData; 6],
}

impl SkyboxImages {
    /// Load `root/textures/<face>.<extension>` for every face.
    pub fn load(root: impl AsRef<Path>, extension: &str) -> Result<Self, AssetError> {
        let dir = root.as_ref().join(TEXTURE_DIR);
        let load = |face: SkyboxFace| load_image(dir.join(format!("{}.{extension}", face.stem())));
        let [right, left, top, bottom, back, front] = SkyboxFace::ALL;
        Self::from_faces([
            load(right)?,
            load(left)?,
            load(top)?,
            load(bottom)?,
            load(back)?,
            load(front)?,
        ])
    }

    /// Validate faces given in [`SkyboxFace::ALL`] order.
    pub fn from_faces(faces: [ImageData; 6]) -> Result<Self, AssetError> {
        let expected = faces[0].width;
        for (face, image) in SkyboxFace::ALL.into_iter().zip(&faces) {
            if !image.is_square() {
                return Err(AssetError::NotSquare {
                    face,
                    width: image.width,
                    height: image.height,
                });
            }
            if image.width != expected {
                return Err(AssetError::SizeMismatch {
                    face,
                    size: image.width,
                    expected,
                });
            }
        }
        Ok(Self {
            size: expected,
            faces,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self, face: SkyboxFace) -> &ImageData {
        &self.faces[face.layer() as usize]
    }

    /// All faces concatenated in cube layer order, ready for a single upload.
    pub fn layered_pixels(&self) -> Vec<u8> {
        self.faces.iter().flat_map(|f| f.pixels.iter().copied()).collect()
    }
}

pub fn crate_info() -> &'static str {
    "skyline-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
        RgbaImage::from_pixel(width, height, Rgba(color)).save(path).unwrap();
    }

    fn solid(width: u32, height: u32) -> ImageData {
        ImageData {
            width,
            height,
            channels: 4,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }

    #[test]
    fn load_png_expands_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])).save(&path).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.channels, 3);
        assert_eq!(image.pixels.len(), 3 * 2 * 4);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(image.row_bytes(), 12);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_image(&path), Err(AssetError::Image { .. })));
    }

    #[test]
    fn facade_set_loads_both_textures() {
        let dir = tempfile::tempdir().unwrap();
        let textures = dir.path().join(TEXTURE_DIR);
        std::fs::create_dir(&textures).unwrap();
        write_png(&textures.join("a.png"), 2, 2, [255, 0, 0, 255]);
        write_png(&textures.join("b.png"), 4, 2, [0, 255, 0, 255]);

        let set = FacadeTextureSet::load(dir.path(), ["a.png", "b.png"]).unwrap();
        assert_eq!(set.get(FacadeTexture::A).width, 2);
        assert_eq!(set.get(FacadeTexture::B).width, 4);
    }

    #[test]
    fn skybox_loads_all_faces_in_layer_order() {
        let dir = tempfile::tempdir().unwrap();
        let textures = dir.path().join(TEXTURE_DIR);
        std::fs::create_dir(&textures).unwrap();
        for face in SkyboxFace::ALL {
            let shade = face.layer() as u8 * 40;
            write_png(&textures.join(format!("{}.png", face.stem())), 2, 2, [shade, 0, 0, 255]);
        }

        let skybox = SkyboxImages::load(dir.path(), "png").unwrap();
        assert_eq!(skybox.size(), 2);
        assert_eq!(skybox.face(SkyboxFace::Top).pixels[0], 80);
        let layered = skybox.layered_pixels();
        assert_eq!(layered.len(), 6 * 2 * 2 * 4);
        assert_eq!(layered[5 * 16], 200, "front face is the last layer");
    }

    #[test]
    fn skybox_missing_face_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(TEXTURE_DIR)).unwrap();
        assert!(SkyboxImages::load(dir.path(), "tga").is_err());
    }

    #[test]
    fn skybox_rejects_non_square_faces() {
        let mut faces: [ImageData; 6] = std::array::from_fn(|_| solid(4, 4));
        faces[2] = solid(4, 3);
        let err = SkyboxImages::from_faces(faces).unwrap_err();
        assert!(matches!(
            err,
            AssetError::NotSquare {
                face: SkyboxFace::Top,
                ..
            }
        ));
    }

    #[test]
    fn skybox_rejects_mismatched_sizes() {
        let mut faces: [ImageData; 6] = std::array::from_fn(|_| solid(4, 4));
        faces[5] = solid(8, 8);
        let err = SkyboxImages::from_faces(faces).unwrap_err();
        assert!(matches!(
            err,
            AssetError::SizeMismatch {
                face: SkyboxFace::Front,
                size: 8,
                expected: 4
            }
        ));
    }
}
