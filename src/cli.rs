//! Command-line argument parsing.

use clap::Parser;

use crate::params::{RecordingConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "heliwave")]
#[command(about = "Helicopter flight over an endless Gerstner-wave ocean", long_about = None)]
pub struct Args {
    /// Number of floating helipads to scatter
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    pub helipads: usize,

    /// Seed for helipad placement (random when omitted)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Steepness multiplier applied to every wave
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub sea_scale: f32,

    /// Start with the ocean drawn as wireframe (F1 toggles at runtime)
    #[arg(long)]
    pub wireframe: bool,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,

    /// Record frames to PNG files (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,
}

impl Args {
    /// Seed to use this run; a fresh one is drawn when none was given.
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..RenderConfig::default()
        }
    }

    /// Recording configuration with its output directories created, when
    /// recording was requested.
    pub fn recording_config(&self) -> std::io::Result<Option<RecordingConfig>> {
        self.record
            .map(|duration| {
                let config = RecordingConfig::new(duration);
                std::fs::create_dir_all(config.frames_dir())?;
                Ok(config)
            })
            .transpose()
    }
}
