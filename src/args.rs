// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use rga_resize::driver::{Interpolation, DEFAULT_LIBRARY};
use std::path::PathBuf;

/// Hardware scaling filter.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum InterpolationSetting {
    /// Nearest neighbour
    Nearest,
    /// Bilinear
    Linear,
    /// Bicubic
    Cubic,
}

impl From<InterpolationSetting> for Interpolation {
    fn from(value: InterpolationSetting) -> Self {
        match value {
            InterpolationSetting::Nearest => Interpolation::Nearest,
            InterpolationSetting::Linear => Interpolation::Linear,
            InterpolationSetting::Cubic => Interpolation::Cubic,
        }
    }
}

/// Command-line arguments for the RGA resize tool.
///
/// Loads a JPEG, resizes it on the RGA and writes the result as a JPEG.
///
/// # Example
///
/// ```bash
/// # Half-size resize
/// rga-resize palace.jpg /tmp/resized.jpg
///
/// # Explicit size, timing 100 frames through a session
/// rga-resize --size "640 360" --iterations 100 palace.jpg /tmp/resized.jpg
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input JPEG
    #[arg(required_unless_present = "info")]
    pub input: Option<PathBuf>,

    /// Output JPEG
    #[arg(required_unless_present = "info")]
    pub output: Option<PathBuf>,

    /// Destination size in pixels (width height), half the input by default
    #[arg(long, env = "RGA_SIZE", value_delimiter = ' ', num_args = 2)]
    pub size: Option<Vec<u32>>,

    /// Scaling filter
    #[arg(long, env = "RGA_INTERPOLATION", default_value = "linear", value_enum)]
    pub interpolation: InterpolationSetting,

    /// RGA driver library to load
    #[arg(long, env = "RGA_LIBRARY", default_value = DEFAULT_LIBRARY)]
    pub library: String,

    /// Resize this many frames through a session and report the mean time
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: u32,

    /// Output JPEG quality
    #[arg(long, env = "JPEG_QUALITY", default_value = "95", value_parser = clap::value_parser!(i32).range(1..=100))]
    pub quality: i32,

    /// Print the RGA driver information report and exit
    #[arg(long)]
    pub info: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Send logs to the systemd journal
    #[arg(long, env = "JOURNALD")]
    pub journald: bool,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["rga-resize", "in.jpg", "out.jpg"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("in.jpg")));
        assert_eq!(args.size, None);
        assert_eq!(args.iterations, 1);
        assert_eq!(args.quality, 95);
        assert_eq!(args.interpolation, InterpolationSetting::Linear);
    }

    #[test]
    fn explicit_size() {
        let args =
            Args::try_parse_from(["rga-resize", "--size", "320 240", "in.jpg", "out.jpg"]).unwrap();
        assert_eq!(args.size, Some(vec![320, 240]));
    }

    #[test]
    fn paths_required_without_info() {
        assert!(Args::try_parse_from(["rga-resize", "in.jpg"]).is_err());
        assert!(Args::try_parse_from(["rga-resize", "--info"]).is_ok());
        assert!(Args::try_parse_from(["rga-resize", "--iterations", "0", "a", "b"]).is_err());
    }
}
