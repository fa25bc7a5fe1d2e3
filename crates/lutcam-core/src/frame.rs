//! Frame buffers for the grading pipeline: strided YUV input planes and the
//! packed RGBA preview output.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GradeError;

/// One read-only image plane with its addressing strides.
///
/// `row_stride` is the byte distance between rows and may exceed the
/// logical width (padded camera buffers). `pixel_stride` is the byte
/// distance between horizontally adjacent samples: 1 for planar chroma,
/// 2 for semi-planar (interleaved UV) chroma.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// A plane whose samples are adjacent bytes.
    pub fn packed(data: &'a [u8], row_stride: usize) -> Self {
        Self::new(data, row_stride, 1)
    }

    /// Sample at logical `(col, row)`. Bounds were checked by [`Plane::check`].
    #[inline]
    pub(crate) fn at(&self, col: usize, row: usize) -> u8 {
        self.data[row * self.row_stride + col * self.pixel_stride]
    }

    /// Smallest buffer that can hold `cols × rows` samples at these strides.
    ///
    /// The last row does not need padding, which matches camera buffers
    /// that end right after the final sample.
    fn required_len(&self, cols: usize, rows: usize) -> Option<usize> {
        let last_row = (rows - 1).checked_mul(self.row_stride)?;
        let last_col = (cols - 1).checked_mul(self.pixel_stride)?;
        last_row.checked_add(last_col)?.checked_add(1)
    }

    fn check(&self, name: PlaneName, cols: usize, rows: usize) -> Result<(), GradeError> {
        if self.pixel_stride == 0 || self.row_stride == 0 {
            return Err(GradeError::invalid_buffer(format!(
                "{name} plane has a zero stride (row {}, pixel {})",
                self.row_stride, self.pixel_stride
            )));
        }
        let needed = self.required_len(cols, rows).ok_or_else(|| {
            GradeError::invalid_buffer(format!("{name} plane strides overflow the address space"))
        })?;
        if self.data.len() < needed {
            return Err(GradeError::invalid_buffer(format!(
                "{name} plane holds {} bytes, {cols}x{rows} samples need {needed}",
                self.data.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum PlaneName {
    Y,
    U,
    V,
}

impl fmt::Display for PlaneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Y => write!(f, "Y"),
            Self::U => write!(f, "U"),
            Self::V => write!(f, "V"),
        }
    }
}

/// A YUV 4:2:0 camera frame as three independently strided planes.
///
/// Chroma planes are subsampled by two on both axes; the sample for pixel
/// `(col, row)` lives at `(col / 2, row / 2)` in the U and V planes.
#[derive(Debug, Clone, Copy)]
pub struct YuvPlanes<'a> {
    pub y: Plane<'a>,
    pub u: Plane<'a>,
    pub v: Plane<'a>,
    pub width: u32,
    pub height: u32,
}

impl YuvPlanes<'_> {
    /// Check dimensions and that every plane is addressable at its strides.
    pub fn validate(&self) -> Result<(), GradeError> {
        check_dimensions(self.width, self.height)?;
        let (w, h) = (self.width as usize, self.height as usize);

        if self.y.pixel_stride != 1 {
            return Err(GradeError::invalid_buffer(format!(
                "Y plane pixel stride must be 1, got {}",
                self.y.pixel_stride
            )));
        }
        if self.y.row_stride < w {
            return Err(GradeError::invalid_buffer(format!(
                "Y row stride {} is smaller than width {w}",
                self.y.row_stride
            )));
        }

        self.y.check(PlaneName::Y, w, h)?;
        self.u.check(PlaneName::U, w / 2, h / 2)?;
        self.v.check(PlaneName::V, w / 2, h / 2)?;
        Ok(())
    }
}

/// Pixel count of a frame, rejecting dimensions the 4:2:0 subsampling
/// cannot represent or whose RGBA buffer size overflows `usize`.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<usize, GradeError> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(GradeError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|pixels| pixels.checked_mul(4).is_some())
        .ok_or(GradeError::InvalidDimensions { width, height })
}

/// Byte length of an NV12 frame: a full Y plane plus a half-height UV plane.
///
/// `None` when the length does not fit in `usize`.
pub fn nv12_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(3)
        .map(|n| n / 2)
}

/// Chroma arrangement of a tightly packed raw YUV 4:2:0 buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromaLayout {
    /// Planar: full U plane, then full V plane.
    I420,
    /// Semi-planar, interleaved U then V.
    Nv12,
    /// Semi-planar, interleaved V then U (Android camera default).
    Nv21,
}

impl fmt::Display for ChromaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I420 => write!(f, "i420"),
            Self::Nv12 => write!(f, "nv12"),
            Self::Nv21 => write!(f, "nv21"),
        }
    }
}

/// Geometry of a tightly packed raw frame, as stored in `.yuv` dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    pub chroma: ChromaLayout,
}

impl FrameLayout {
    /// Bytes per frame. Fails for dimensions [`YuvPlanes::validate`] would reject.
    pub fn frame_len(&self) -> Result<usize, GradeError> {
        check_dimensions(self.width, self.height)?;
        nv12_len(self.width, self.height).ok_or(GradeError::InvalidDimensions {
            width: self.width,
            height: self.height,
        })
    }

    /// Split one packed frame into strided planes.
    pub fn planes<'a>(&self, frame: &'a [u8]) -> Result<YuvPlanes<'a>, GradeError> {
        let luma_len = check_dimensions(self.width, self.height)?;
        let frame_len = self.frame_len()?;
        if frame.len() < frame_len {
            return Err(GradeError::invalid_buffer(format!(
                "{} frame needs {frame_len} bytes, got {}",
                self.chroma,
                frame.len()
            )));
        }

        let w = self.width as usize;
        let (luma, chroma) = frame.split_at(luma_len);
        let y = Plane::packed(luma, w);

        let (u, v) = match self.chroma {
            ChromaLayout::I420 => {
                let quarter = luma_len / 4;
                let (u, rest) = chroma.split_at(quarter);
                (Plane::packed(u, w / 2), Plane::packed(&rest[..quarter], w / 2))
            }
            ChromaLayout::Nv12 => (Plane::new(chroma, w, 2), Plane::new(&chroma[1..], w, 2)),
            ChromaLayout::Nv21 => (Plane::new(&chroma[1..], w, 2), Plane::new(chroma, w, 2)),
        };

        Ok(YuvPlanes {
            y,
            u,
            v,
            width: self.width,
            height: self.height,
        })
    }
}

/// Graded output frame: 8-bit RGBA, row-major, alpha always 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    pixels: Vec<u8>,
}

impl RgbaFrame {
    pub(crate) fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Raw `R, G, B, A` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixels viewed as `[R, G, B, A]` quads.
    pub fn as_pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.as_pixels()
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// Convert into an `image` buffer for saving previews.
    pub fn into_image(self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels)
    }
}
