//! C ABI for lutcam.
//!
//! Camera hosts (JNI shims, Swift, C++) drive the grading pipeline through
//! these functions. Every failure is recovered at the boundary: calls
//! return `false` or an empty [`LutcamRgba`], and [`lutcam_last_error`]
//! describes what went wrong. Nothing unwinds into the caller.
#![allow(unsafe_code)]
// FFI entry points necessarily take raw pointers.

mod config;
mod context;
mod error;

use std::ffi::{CStr, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lutcam_core::{Plane, RgbaFrame, YuvPlanes};

pub use config::FfiConfig;
pub use error::{FfiError, lutcam_last_error};

use error::{clear_last_error, set_last_error};

/// Graded RGBA frame owned by the library. Release with [`lutcam_rgba_free`].
///
/// A failed call returns an empty value: `data` is null and `len` is zero.
#[repr(C)]
#[derive(Debug)]
pub struct LutcamRgba {
    pub data: *mut u8,
    pub len: usize,
    pub width: u32,
    pub height: u32,
}

impl LutcamRgba {
    fn empty() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
            width: 0,
            height: 0,
        }
    }

    fn from_frame(frame: RgbaFrame) -> Self {
        let (width, height) = (frame.width, frame.height);
        let bytes = frame.into_bytes().into_boxed_slice();
        let len = bytes.len();
        Self {
            data: Box::into_raw(bytes).cast::<u8>(),
            len,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_null()
    }
}

/// Create the library context, loading `.cube` filters from `lut_dir`.
///
/// `lut_dir` may be null to fall back to `LUTCAM_LUT_DIR`. Creating the
/// context also installs a `tracing` subscriber filtered by `LUTCAM_LOG`
/// unless one exists; this happens too when another entry point is called
/// first. Returns `false` if the context was already created.
///
/// # Safety
/// `lut_dir` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lutcam_init(lut_dir: *const c_char) -> bool {
    let dir = if lut_dir.is_null() {
        None
    } else {
        // SAFETY: caller guarantees a valid NUL-terminated string.
        match unsafe { CStr::from_ptr(lut_dir) }.to_str() {
            Ok(dir) => Some(dir),
            Err(e) => {
                set_last_error(FfiError::from(e));
                return false;
            }
        }
    };
    context::init(dir.map(Path::new))
}

/// Activate a named filter for all subsequent frames.
///
/// Unknown names return `false` and keep the previous filter.
///
/// # Safety
/// `name` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lutcam_select_filter(name: *const c_char) -> bool {
    if name.is_null() {
        set_last_error(FfiError::NullPointer("name"));
        return false;
    }
    // SAFETY: caller guarantees a valid NUL-terminated string.
    let result = unsafe { CStr::from_ptr(name) }
        .to_str()
        .map_err(FfiError::from)
        .and_then(|name| {
            context::get()
                .processor
                .select_filter(name)
                .map_err(FfiError::from)
        });

    match result {
        Ok(()) => {
            clear_last_error();
            true
        }
        Err(e) => {
            set_last_error(e);
            false
        }
    }
}

/// Number of filters in the catalog, `"None"` included.
#[unsafe(no_mangle)]
pub extern "C" fn lutcam_filter_count() -> usize {
    context::get().names.len()
}

/// Name of the filter at `index` in sorted order, or null when out of range.
///
/// The string lives for the rest of the process.
#[unsafe(no_mangle)]
pub extern "C" fn lutcam_filter_name(index: usize) -> *const c_char {
    context::get()
        .names
        .get(index)
        .map_or(std::ptr::null(), |name| name.as_ptr())
}

/// Reserved for installing a LUT from raw bytes.
///
/// Always returns `true` and installs nothing; filters come from the
/// `.cube` catalog.
///
/// # Safety
/// `bytes` must be null or point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lutcam_load_lut(bytes: *const u8, len: usize) -> bool {
    let data: &[u8] = if bytes.is_null() {
        &[]
    } else {
        // SAFETY: caller guarantees `len` readable bytes.
        unsafe { std::slice::from_raw_parts(bytes, len) }
    };
    context::get().processor.registry().load_lut(data)
}

/// Grade one camera frame.
///
/// Reads the strided Y, U and V planes, grades them through the active
/// filter, writes NV12 into `nv12_out` (at least `width × height × 3 / 2`
/// bytes) and returns the RGBA preview. On failure nothing is written to
/// `nv12_out` and an empty [`LutcamRgba`] is returned.
///
/// # Safety
/// Each non-null plane pointer must reference `*_len` readable bytes and
/// `nv12_out` must reference `nv12_len` writable bytes that do not overlap
/// any input plane.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn lutcam_process_frame(
    y: *const u8,
    y_len: usize,
    u: *const u8,
    u_len: usize,
    v: *const u8,
    v_len: usize,
    width: i32,
    height: i32,
    y_row_stride: i32,
    u_row_stride: i32,
    v_row_stride: i32,
    u_pixel_stride: i32,
    v_pixel_stride: i32,
    nv12_out: *mut u8,
    nv12_len: usize,
) -> LutcamRgba {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: forwarded caller contract.
        let y = unsafe { input_slice(y, y_len, "Y plane") }?;
        let u = unsafe { input_slice(u, u_len, "U plane") }?;
        let v = unsafe { input_slice(v, v_len, "V plane") }?;
        if nv12_out.is_null() {
            return Err(FfiError::NullPointer("NV12 output"));
        }
        // SAFETY: non-null, caller guarantees `nv12_len` writable, unaliased bytes.
        let nv12 = unsafe { std::slice::from_raw_parts_mut(nv12_out, nv12_len) };

        let planes = YuvPlanes {
            y: Plane::packed(y, to_usize(y_row_stride, "Y row stride")?),
            u: Plane::new(
                u,
                to_usize(u_row_stride, "U row stride")?,
                to_usize(u_pixel_stride, "U pixel stride")?,
            ),
            v: Plane::new(
                v,
                to_usize(v_row_stride, "V row stride")?,
                to_usize(v_pixel_stride, "V pixel stride")?,
            ),
            width: to_usize(width, "width")? as u32,
            height: to_usize(height, "height")? as u32,
        };

        Ok(context::get().processor.process(&planes, nv12)?)
    }));

    match result.unwrap_or(Err(FfiError::Panic)) {
        Ok(frame) => {
            clear_last_error();
            LutcamRgba::from_frame(frame)
        }
        Err(e) => {
            set_last_error(e);
            LutcamRgba::empty()
        }
    }
}

/// Release a frame returned by [`lutcam_process_frame`]. Empty frames are ignored.
///
/// # Safety
/// `rgba` must come from `lutcam_process_frame` and not have been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn lutcam_rgba_free(rgba: LutcamRgba) {
    if rgba.data.is_null() {
        return;
    }
    // SAFETY: `data`/`len` were produced by leaking a boxed slice in `from_frame`.
    drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(rgba.data, rgba.len)) });
}

/// # Safety
/// `ptr` must be null or reference `len` readable bytes.
unsafe fn input_slice<'a>(ptr: *const u8, len: usize, name: &'static str) -> Result<&'a [u8], FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer(name));
    }
    // SAFETY: non-null, caller guarantees `len` readable bytes.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

fn to_usize(value: i32, name: &'static str) -> Result<usize, FfiError> {
    usize::try_from(value).map_err(|_| FfiError::InvalidArgument(name))
}
