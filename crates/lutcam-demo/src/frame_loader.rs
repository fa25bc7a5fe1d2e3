//! Raw YUV dump reading and frame layout sidecars.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use lutcam_core::{FrameLayout, GradeError};

/// Errors that can occur while reading raw frames or their layout.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid layout file: {0}")]
    Layout(#[from] serde_json::Error),
    #[error(transparent)]
    Frame(#[from] GradeError),
    #[error("frame {index} is truncated: expected {expected} bytes, got {got}")]
    Truncated {
        index: u64,
        expected: usize,
        got: usize,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Layout sidecar for a raw file: `clip.yuv` becomes `clip.yuv.json`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Read a [`FrameLayout`] from a JSON file such as
/// `{"width": 1280, "height": 720, "chroma": "nv21"}`.
pub fn load_layout(path: &Path) -> Result<FrameLayout, LoadError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write `layout` as a JSON sidecar.
pub fn save_layout(layout: &FrameLayout, path: &Path) -> Result<(), LoadError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, layout)?;
    writer.flush()?;
    Ok(())
}

/// Sequential reader over a file of back-to-back packed frames.
pub struct FrameReader<R> {
    reader: R,
    buf: Vec<u8>,
    index: u64,
}

impl FrameReader<BufReader<File>> {
    pub fn open(path: &Path, layout: FrameLayout) -> Result<Self, LoadError> {
        Self::new(BufReader::new(File::open(path)?), layout)
    }
}

impl<R: Read> FrameReader<R> {
    /// Fails when `layout` has no valid frame size.
    pub fn new(reader: R, layout: FrameLayout) -> Result<Self, LoadError> {
        Ok(Self {
            reader,
            buf: vec![0; layout.frame_len()?],
            index: 0,
        })
    }

    /// Frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.index
    }

    /// The next frame, or `None` at a clean end of input.
    ///
    /// A partial trailing frame is an error rather than silently dropped.
    pub fn next_frame(&mut self) -> Result<Option<&[u8]>, LoadError> {
        let mut filled = 0;
        while filled < self.buf.len() {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < self.buf.len() {
            return Err(LoadError::Truncated {
                index: self.index,
                expected: self.buf.len(),
                got: filled,
            });
        }
        self.index += 1;
        Ok(Some(&self.buf))
    }
}
