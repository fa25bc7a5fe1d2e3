//! Application configuration for the demo.

use std::path::PathBuf;

use clap::Parser;
use lutcam_core::{ChromaLayout, NONE_FILTER};

/// Default capture rate used to synthesize frame timestamps.
const DEFAULT_FPS: u32 = 30;

/// Command-line flags. Anything left unset falls back to [`AppConfig`].
#[derive(Parser, Debug)]
#[command(name = "lutcam")]
#[command(about = "Grade raw YUV 4:2:0 camera frames through a 3D LUT and re-encode them as NV12")]
pub struct Cli {
    /// Raw input file of tightly packed frames
    #[arg(required_unless_present = "list")]
    pub input: Option<PathBuf>,

    /// Write the graded NV12 stream here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the first graded frame here as PNG
    #[arg(short, long)]
    pub preview: Option<PathBuf>,

    /// Frame width in pixels
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Chroma layout of the input: i420, nv12 or nv21
    #[arg(long, value_parser = parse_chroma)]
    pub chroma: Option<ChromaLayout>,

    /// JSON file describing the frame layout
    #[arg(long, conflicts_with_all = ["width", "height", "chroma"])]
    pub layout: Option<PathBuf>,

    /// Directory of .cube filters [env: LUTCAM_LUT_DIR]
    #[arg(long)]
    pub lut_dir: Option<PathBuf>,

    /// Filter to apply [env: LUTCAM_FILTER]
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Capture rate used for timestamps [env: LUTCAM_FPS]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Print the filter catalog and exit
    #[arg(long)]
    pub list: bool,
}

fn parse_chroma(s: &str) -> Result<ChromaLayout, String> {
    match s.to_ascii_lowercase().as_str() {
        "i420" | "yuv420p" => Ok(ChromaLayout::I420),
        "nv12" => Ok(ChromaLayout::Nv12),
        "nv21" => Ok(ChromaLayout::Nv21),
        other => Err(format!("unknown chroma layout `{other}` (expected i420, nv12 or nv21)")),
    }
}

/// Runtime configuration for the lutcam demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory scanned for `.cube` filters. `None` leaves only the identity.
    pub lut_dir: Option<PathBuf>,
    /// Filter selected before the first frame.
    pub filter: String,
    /// Capture rate used to synthesize timestamps.
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lut_dir: std::env::var_os("LUTCAM_LUT_DIR").map(PathBuf::from),
            filter: std::env::var("LUTCAM_FILTER").unwrap_or_else(|_| NONE_FILTER.to_string()),
            fps: std::env::var("LUTCAM_FPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&fps| fps > 0)
                .unwrap_or(DEFAULT_FPS),
        }
    }
}

impl AppConfig {
    /// Apply command-line overrides.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.lut_dir {
            self.lut_dir = Some(dir.clone());
        }
        if let Some(filter) = &cli.filter {
            self.filter = filter.clone();
        }
        if let Some(fps) = cli.fps {
            self.fps = fps;
        }
        self
    }

    /// Nominal spacing between captured frames.
    pub fn frame_interval_ns(&self) -> i64 {
        1_000_000_000 / i64::from(self.fps.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn base() -> AppConfig {
        AppConfig {
            lut_dir: None,
            filter: NONE_FILTER.to_string(),
            fps: DEFAULT_FPS,
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "lutcam",
            "in.yuv",
            "--lut-dir",
            "/luts",
            "-f",
            "Warm",
            "--fps",
            "60",
        ])
        .unwrap();
        let config = base().with_cli(&cli);
        assert_eq!(config.lut_dir, Some(PathBuf::from("/luts")));
        assert_eq!(config.filter, "Warm");
        assert_eq!(config.fps, 60);
        assert_eq!(config.frame_interval_ns(), 16_666_666);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let cli = Cli::try_parse_from(["lutcam", "in.yuv"]).unwrap();
        assert_eq!(base().with_cli(&cli), base());
    }

    #[test]
    fn test_chroma_flag_parses_case_insensitively() {
        let cli = Cli::try_parse_from([
            "lutcam", "in.yuv", "--width", "4", "--height", "2", "--chroma", "NV21",
        ])
        .unwrap();
        assert_eq!(cli.chroma, Some(ChromaLayout::Nv21));
        assert!(Cli::try_parse_from(["lutcam", "in.yuv", "--chroma", "rgb"]).is_err());
    }

    #[test]
    fn test_input_required_unless_listing() {
        assert!(Cli::try_parse_from(["lutcam"]).is_err());
        assert!(Cli::try_parse_from(["lutcam", "--list"]).unwrap().list);
    }

    #[test]
    fn test_width_requires_height() {
        assert!(Cli::try_parse_from(["lutcam", "in.yuv", "--width", "4"]).is_err());
    }

    #[test]
    fn test_zero_fps_rejected() {
        assert!(Cli::try_parse_from(["lutcam", "in.yuv", "--fps", "0"]).is_err());
    }
}
