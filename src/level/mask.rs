//! Section masks: the pixel grids level sections are authored as
//!
//! Decoding image files is the asset loader's job; a mask is the already
//! decoded RGB grid, stored row-major with row 0 at the top of the image.

use super::LevelError;

/// Decoded RGB pixels of one level section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMask {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
}

impl SectionMask {
    /// Pixel colour of a wall tile
    pub const WALL: [u8; 3] = [0, 0, 0];
    /// Pixel colour of a pickup tile
    pub const POINT: [u8; 3] = [0, 255, 0];
    /// Filler colour for everything else
    pub const BLANK: [u8; 3] = [255, 255, 255];

    /// Build a mask from tightly packed RGB8 bytes
    pub fn from_rgb8(width: usize, height: usize, bytes: &[u8]) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyMask);
        }
        let expected = width * height * 3;
        if bytes.len() != expected {
            return Err(LevelError::MaskSize {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a mask from text art: `#` wall, `o` pickup, anything else empty
    ///
    /// Every line must have the same length. Leading and trailing blank lines
    /// are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, LevelError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| l.is_empty())
            .collect();
        let lines: Vec<&str> = match lines.iter().rposition(|l| !l.is_empty()) {
            Some(last) => lines[..=last].to_vec(),
            None => return Err(LevelError::EmptyMask),
        };

        let width = lines[0].chars().count();
        let mut pixels = Vec::with_capacity(width * lines.len());
        for (line_no, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(LevelError::RaggedMask { line: line_no });
            }
            pixels.extend(line.chars().map(|c| match c {
                '#' => Self::WALL,
                'o' => Self::POINT,
                _ => Self::BLANK,
            }));
        }
        if width == 0 {
            return Err(LevelError::EmptyMask);
        }

        Ok(Self {
            width,
            height: lines.len(),
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Colour at column `x`, image row `y` (row 0 is the top)
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * self.width + x]
    }

    /// Share of cells that are walls; used as the section's difficulty
    pub fn wall_density(&self) -> f32 {
        let walls = self.pixels.iter().filter(|&&p| p == Self::WALL).count();
        walls as f32 / self.pixels.len() as f32
    }
}
