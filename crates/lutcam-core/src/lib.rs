//! Lutcam Core: camera frame grading pipeline.
//!
//! Decodes strided YUV 4:2:0 camera planes to RGB, grades every pixel
//! through a 3D LUT with trilinear interpolation, and re-encodes the result
//! as NV12. The graded RGBA frame is handed back for preview.

pub mod clock;
pub mod color;
pub mod error;
pub mod frame;
pub mod nv12;
pub mod processor;
pub mod registry;
pub mod transform;

// Re-exports for convenience.
pub use clock::PtsNormalizer;
pub use error::GradeError;
pub use frame::{ChromaLayout, FrameLayout, Plane, RgbaFrame, YuvPlanes};
pub use nv12::encode_nv12;
pub use processor::{FrameProcessor, process_frame};
pub use registry::{FilterEntry, FilterRegistry, NONE_FILTER};
pub use transform::lut::{LUT_DIM, Lut3D};
