//! Pixel-level color conversions.

pub mod yuv;
