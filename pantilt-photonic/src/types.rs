//! Tipos de dados fotônicos

use serde::{Deserialize, Serialize};

use crate::error::{PhotonicError, PhotonicResult};

/// Bytes por pixel (BGR)
pub const CHANNELS: usize = 3;

/// Snapshot de imagem BGR (`largura × altura × 3`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Cria frame a partir de bytes BGR, validando o tamanho
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> PhotonicResult<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(PhotonicError::InvalidFrame(format!(
                "expected {} bytes for {}x{} BGR, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Frame preto
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
        }
    }

    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel `(b, g, r)` na posição (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Intensidade média (grayscale)
    pub fn avg_intensity(&self) -> u8 {
        if self.data.is_empty() {
            return 0;
        }
        let sum: u64 = self.data.iter().map(|b| *b as u64).sum();
        (sum / self.data.len() as u64) as u8
    }
}

/// Resolução e orientação pedidas ao dispositivo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub hflip: bool,
    pub vflip: bool,
}

impl CaptureSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            hflip: true,
            vflip: true,
        }
    }

    pub fn validate(&self) -> PhotonicResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PhotonicError::InvalidConfig(
                "Width and height must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_validation() {
        assert!(Frame::from_bgr(2, 2, vec![0; 12]).is_ok());
        assert!(Frame::from_bgr(2, 2, vec![0; 11]).is_err());
    }

    #[test]
    fn test_frame_pixel() {
        let data: Vec<u8> = (0..12).collect();
        let frame = Frame::from_bgr(2, 2, data).unwrap();
        assert_eq!(frame.pixel(1, 0), Some([3, 4, 5]));
        assert_eq!(frame.pixel(0, 1), Some([6, 7, 8]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_black_frame() {
        let frame = Frame::black(4, 3);
        assert_eq!(frame.as_bytes().len(), 36);
        assert_eq!(frame.avg_intensity(), 0);
    }

    #[test]
    fn test_settings_default_flip() {
        let s = CaptureSettings::new(320, 240);
        assert!(s.hflip && s.vflip);
        assert!(s.validate().is_ok());
        assert!(CaptureSettings::new(0, 240).validate().is_err());
    }
}
