use crate::AssetError;
use std::path::Path;

/// Decoded RGBA8 image, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Decode PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path.as_ref())?;
        let texture = Self::decode(&bytes)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            width = texture.width,
            height = texture.height,
            "decoded texture"
        );
        Ok(texture)
    }

    /// Two-tone checkerboard of `size`×`size` pixels with square cells.
    pub fn checkerboard(size: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let light = ((x / cell) + (y / cell)) % 2 == 0;
                let shade = if light { 0xe0 } else { 0x30 };
                rgba.extend_from_slice(&[shade, shade, shade, 0xff]);
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = self.rgba.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_raw(
            2,
            1,
            vec![255, 0, 0, 255, 0, 0, 255, 128],
        )
        .unwrap();
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png() {
        let tex = TextureData::decode(&png_bytes()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(tex.pixel(1, 0), Some([0, 0, 255, 128]));
        assert_eq!(tex.pixel(2, 0), None);
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = TextureData::decode(b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Image(_)));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.png");
        std::fs::write(&path, png_bytes()).unwrap();
        let tex = TextureData::load(&path).unwrap();
        assert_eq!(tex.rgba.len(), 8);
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let tex = TextureData::checkerboard(8, 4);
        assert_eq!(tex.rgba.len(), 8 * 8 * 4);
        assert_eq!(tex.pixel(0, 0), tex.pixel(3, 3));
        assert_ne!(tex.pixel(0, 0), tex.pixel(4, 0));
        assert_eq!(tex.pixel(0, 0), tex.pixel(4, 4));
    }
}
