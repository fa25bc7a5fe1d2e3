//! Studio-range BT.601 YUV ↔ RGB conversion.
//!
//! Both directions use the fixed-point broadcast coefficients (scaled by
//! 256) so results match integer reference decoders bit for bit:
//!
//! ```text
//! decode:  C = Y − 16, D = U − 128, E = V − 128
//!          R = (298C + 409E + 128) / 256
//!          G = (298C − 100D − 208E + 128) / 256
//!          B = (298C + 516D + 128) / 256
//!
//! encode:  Y = ((66R + 129G + 25B + 128) >> 8) + 16
//!          U = ((−38R − 74G + 112B + 128) >> 8) + 128
//!          V = ((112R − 94G − 18B + 128) >> 8) + 128
//! ```

/// Decode one studio-range YUV sample to normalized RGB in `[0, 1]`.
///
/// The matrix is evaluated in `f32` and each channel is divided by 255 and
/// clamped, so super-white and out-of-gamut chroma never escape the unit
/// range.
#[inline]
pub fn decode_yuv(y: u8, u: u8, v: u8) -> [f32; 3] {
    let c = y as f32 - 16.0;
    let d = u as f32 - 128.0;
    let e = v as f32 - 128.0;

    let r = (298.0 * c + 409.0 * e + 128.0) / 256.0;
    let g = (298.0 * c - 100.0 * d - 208.0 * e + 128.0) / 256.0;
    let b = (298.0 * c + 516.0 * d + 128.0) / 256.0;

    [
        (r / 255.0).clamp(0.0, 1.0),
        (g / 255.0).clamp(0.0, 1.0),
        (b / 255.0).clamp(0.0, 1.0),
    ]
}

/// Encode one 8-bit RGB pixel to studio-range YUV.
///
/// Integer arithmetic with an arithmetic right shift, so negative
/// intermediates round toward negative infinity like the reference.
#[inline]
pub fn encode_rgb(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;

    [
        y.clamp(0, 255) as u8,
        u.clamp(0, 255) as u8,
        v.clamp(0, 255) as u8,
    ]
}

/// Quantize a normalized channel to a byte: `round(clamp(v, 0, 1) × 255)`.
///
/// Ties round to even. The decode offset of `+128/256` lands studio black
/// exactly on 0.5, and it must quantize to 0.
#[inline]
pub fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round_ties_even() as u8
}

/// Decode straight to 8-bit RGB, skipping any grading.
pub fn decode_yuv_to_bytes(y: u8, u: u8, v: u8) -> [u8; 3] {
    let [r, g, b] = decode_yuv(y, u, v);
    [unit_to_byte(r), unit_to_byte(g), unit_to_byte(b)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studio_black_decodes_to_zero() {
        assert_eq!(decode_yuv_to_bytes(16, 128, 128), [0, 0, 0]);
    }

    #[test]
    fn test_studio_white_decodes_to_full() {
        assert_eq!(decode_yuv_to_bytes(235, 128, 128), [255, 255, 255]);
    }

    #[test]
    fn test_studio_red_decodes_to_red() {
        assert_eq!(decode_yuv_to_bytes(81, 90, 240), [255, 0, 0]);
    }

    #[test]
    fn test_encode_black_and_white() {
        assert_eq!(encode_rgb(0, 0, 0), [16, 128, 128]);
        assert_eq!(encode_rgb(255, 255, 255), [235, 128, 128]);
    }

    #[test]
    fn test_encode_red_uses_arithmetic_shift() {
        // U intermediate is −9562, which floors to −38 rather than truncating to −37.
        assert_eq!(encode_rgb(255, 0, 0), [82, 90, 240]);
    }

    #[test]
    fn test_decode_stays_in_unit_range() {
        for y in (0..=255u8).step_by(5) {
            for u in (0..=255u8).step_by(15) {
                for v in (0..=255u8).step_by(15) {
                    for c in decode_yuv(y, u, v) {
                        assert!((0.0..=1.0).contains(&c), "yuv({y},{u},{v}) -> {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_unit_to_byte_clamps() {
        assert_eq!(unit_to_byte(-0.5), 0);
        assert_eq!(unit_to_byte(1.5), 255);
        assert_eq!(unit_to_byte(0.5), 128);
    }

    #[test]
    fn test_gray_roundtrip_within_one() {
        for y in 0..=255u8 {
            let [v, _, _] = decode_yuv_to_bytes(y, 128, 128);
            let [y2, u2, v2] = encode_rgb(v, v, v);
            assert_eq!((u2, v2), (128, 128));
            let [back, _, _] = decode_yuv_to_bytes(y2, u2, v2);
            assert!(
                (v as i32 - back as i32).abs() <= 1,
                "y={y}: {v} -> {y2} -> {back}"
            );
        }
    }
}
