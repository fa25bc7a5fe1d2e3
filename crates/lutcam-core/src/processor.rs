//! Per-frame orchestration: strided YUV decode, LUT grade, NV12 encode.

use std::sync::Arc;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::color::yuv::{decode_yuv, unit_to_byte};
use crate::error::GradeError;
use crate::frame::{RgbaFrame, YuvPlanes, check_dimensions, nv12_len};
use crate::nv12::write_planes;
use crate::registry::FilterRegistry;
use crate::transform::lut::{self, Lut3D};

/// Grades camera frames through whichever filter the registry has active.
///
/// The active LUT is read once per frame, so every pixel of a frame is
/// graded by the same filter even if another thread calls
/// [`FrameProcessor::select_filter`] mid-frame.
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    registry: Arc<FilterRegistry>,
}

impl FrameProcessor {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Select the filter used for subsequent frames.
    pub fn select_filter(&self, name: &str) -> Result<(), GradeError> {
        self.registry.select(name)
    }

    /// Grade one frame, fill `nv12_out`, and return the RGBA preview.
    pub fn process(
        &self,
        planes: &YuvPlanes<'_>,
        nv12_out: &mut [u8],
    ) -> Result<RgbaFrame, GradeError> {
        let lut = self.registry.active_lut();
        process_frame(planes, lut.as_deref(), nv12_out)
            .inspect_err(|e| tracing::warn!("dropping frame: {e}"))
    }
}

/// Grade one frame with an explicit LUT (`None` = pass-through).
///
/// Validates every plane and `nv12_out` before writing anything. The RGBA
/// buffer is reserved fallibly; on failure `nv12_out` is left untouched.
pub fn process_frame(
    planes: &YuvPlanes<'_>,
    lut: Option<&Lut3D>,
    nv12_out: &mut [u8],
) -> Result<RgbaFrame, GradeError> {
    let (width, height) = (planes.width, planes.height);
    let pixel_count = check_dimensions(width, height)?;
    planes.validate()?;
    let w = width as usize;

    let out_len =
        nv12_len(width, height).ok_or(GradeError::InvalidDimensions { width, height })?;
    if nv12_out.len() < out_len {
        return Err(GradeError::invalid_buffer(format!(
            "NV12 output holds {} bytes, {width}x{height} needs {out_len}",
            nv12_out.len()
        )));
    }

    let rgba_len = pixel_count
        .checked_mul(4)
        .ok_or(GradeError::InvalidDimensions { width, height })?;
    let mut rgba = Vec::new();
    rgba.try_reserve_exact(rgba_len)
        .map_err(|_| GradeError::OutOfMemory { bytes: rgba_len })?;
    rgba.resize(rgba_len, 0u8);

    decode_rows(planes, lut, bytemuck::cast_slice_mut(&mut rgba));

    let pixels: &[[u8; 4]] = bytemuck::cast_slice(&rgba);
    let (y_plane, uv_plane) = nv12_out[..out_len].split_at_mut(pixel_count);
    write_planes(pixels, w, y_plane, uv_plane);

    tracing::trace!(
        "graded {width}x{height} frame ({})",
        if lut.is_some() { "lut" } else { "pass-through" }
    );
    Ok(RgbaFrame::from_raw(width, height, rgba))
}

#[cfg(not(feature = "rayon"))]
fn decode_rows(planes: &YuvPlanes<'_>, lut: Option<&Lut3D>, out: &mut [[u8; 4]]) {
    out.chunks_exact_mut(planes.width as usize)
        .enumerate()
        .for_each(|(row, pixels)| decode_row(planes, lut, row, pixels));
}

#[cfg(feature = "rayon")]
fn decode_rows(planes: &YuvPlanes<'_>, lut: Option<&Lut3D>, out: &mut [[u8; 4]]) {
    out.par_chunks_exact_mut(planes.width as usize)
        .enumerate()
        .for_each(|(row, pixels)| decode_row(planes, lut, row, pixels));
}

#[inline]
fn decode_row(planes: &YuvPlanes<'_>, lut: Option<&Lut3D>, row: usize, out: &mut [[u8; 4]]) {
    let chroma_row = row / 2;
    for (col, px) in out.iter_mut().enumerate() {
        let y = planes.y.at(col, row);
        let u = planes.u.at(col / 2, chroma_row);
        let v = planes.v.at(col / 2, chroma_row);

        let [r, g, b] = lut::sample(lut, decode_yuv(y, u, v));
        *px = [unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), 255];
    }
}
