//! Color transforms: 3D LUT storage, sampling, and `.cube` file I/O.

pub mod cube;
pub mod lut;
