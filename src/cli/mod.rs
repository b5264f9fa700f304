// CLI module for label-helper
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// label-helper - reads product labels aloud in plain language
#[derive(Parser, Debug)]
#[command(name = "label-helper", version, about, long_about = None)]
pub struct Args {
    /// Configuration file (default: ~/.label-helper/config.toml)
    #[arg(long, short = 'c', env = "LABEL_HELPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interpret a single image and exit instead of starting the server
    #[arg(long, short = 'i')]
    pub image: Option<PathBuf>,

    /// Where to write the narration MP3 (default: next to the image)
    #[arg(long, short = 'o', requires = "image")]
    pub audio_out: Option<PathBuf>,
}

impl Args {
    /// Narration path for one-shot mode.
    pub fn audio_path(&self) -> Option<PathBuf> {
        let image = self.image.as_ref()?;
        Some(
            self.audio_out
                .clone()
                .unwrap_or_else(|| image.with_extension("mp3")),
        )
    }
}
