use std::cell::RefCell;
use std::ffi::{CString, c_char};
use std::fmt::Display;
use std::str::Utf8Error;

use lutcam_core::GradeError;

#[derive(Debug, thiserror::Error)]
pub enum FfiError {
    #[error("null pointer passed for {0}")]
    NullPointer(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("string is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error("internal panic while processing a frame")]
    Panic,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(err: impl Display) {
    let message = err.to_string().replace('\0', " ");
    tracing::debug!("lutcam call failed: {message}");
    LAST_ERROR.with(|slot| *slot.borrow_mut() = CString::new(message).ok());
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Message describing the most recent failed call on this thread, or null.
///
/// The pointer stays valid until the next lutcam call on the same thread.
#[unsafe(no_mangle)]
pub extern "C" fn lutcam_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}
