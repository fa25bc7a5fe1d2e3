//! RGBA → NV12 re-encoding.
//!
//! NV12 is a full-resolution Y plane followed by one half-height plane of
//! interleaved `U, V` pairs. Each 2×2 luma block shares the chroma of its
//! top-left pixel; chroma is not averaged across the block.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::color::yuv::encode_rgb;
use crate::error::GradeError;
use crate::frame::{check_dimensions, nv12_len};

/// Encode a packed RGBA frame into `nv12_out`.
///
/// `nv12_out` must hold at least `width × height × 3 / 2` bytes; any bytes
/// past that are left alone. Nothing is written when validation fails.
pub fn encode_nv12(
    rgba: &[u8],
    width: u32,
    height: u32,
    nv12_out: &mut [u8],
) -> Result<(), GradeError> {
    let pixel_count = check_dimensions(width, height)?;
    let w = width as usize;
    let invalid = || GradeError::InvalidDimensions { width, height };

    let rgba_len = pixel_count.checked_mul(4).ok_or_else(invalid)?;
    if rgba.len() < rgba_len {
        return Err(GradeError::invalid_buffer(format!(
            "RGBA input holds {} bytes, {width}x{height} needs {rgba_len}",
            rgba.len()
        )));
    }
    let out_len = nv12_len(width, height).ok_or_else(invalid)?;
    if nv12_out.len() < out_len {
        return Err(GradeError::invalid_buffer(format!(
            "NV12 output holds {} bytes, {width}x{height} needs {out_len}",
            nv12_out.len()
        )));
    }

    let pixels: &[[u8; 4]] = bytemuck::cast_slice(&rgba[..rgba_len]);
    let (y_plane, uv_plane) = nv12_out[..out_len].split_at_mut(pixel_count);
    write_planes(pixels, w, y_plane, uv_plane);
    Ok(())
}

/// Fill both NV12 planes from validated, exactly sized slices.
///
/// Two luma rows map onto one interleaved chroma row of `width` bytes.
#[cfg(not(feature = "rayon"))]
pub(crate) fn write_planes(
    pixels: &[[u8; 4]],
    width: usize,
    y_plane: &mut [u8],
    uv_plane: &mut [u8],
) {
    pixels
        .chunks_exact(2 * width)
        .zip(y_plane.chunks_exact_mut(2 * width))
        .zip(uv_plane.chunks_exact_mut(width))
        .for_each(|((src, luma), chroma)| encode_row_pair(src, width, luma, chroma));
}

/// Fill both NV12 planes from validated, exactly sized slices, one row pair
/// per rayon task.
#[cfg(feature = "rayon")]
pub(crate) fn write_planes(
    pixels: &[[u8; 4]],
    width: usize,
    y_plane: &mut [u8],
    uv_plane: &mut [u8],
) {
    pixels
        .par_chunks_exact(2 * width)
        .zip(y_plane.par_chunks_exact_mut(2 * width))
        .zip(uv_plane.par_chunks_exact_mut(width))
        .for_each(|((src, luma), chroma)| encode_row_pair(src, width, luma, chroma));
}

fn encode_row_pair(src: &[[u8; 4]], width: usize, luma: &mut [u8], chroma: &mut [u8]) {
    for (i, px) in src.iter().enumerate() {
        let [y, u, v] = encode_rgb(px[0], px[1], px[2]);
        luma[i] = y;

        // Top-left of each 2×2 block: even row (first of the pair), even column.
        if i < width && i & 1 == 0 {
            chroma[i] = u;
            chroma[i + 1] = v;
        }
    }
}
