use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use image_batch_pool::core::ImageFormat;
use image_batch_pool::pool::DEFAULT_CHANNEL_CAPACITY;

#[derive(Parser, Debug)]
#[command(about, long_about = None, version)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) command: Command,
    /// Enables debug logging (overridden by RUST_LOG).
    #[arg(short, long, default_value_t, global = true)]
    pub(crate) debug: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Writes synthetic JPEGs with backdated modification times.
    Generate {
        /// Number of images to create.
        #[arg(short, long, default_value_t = 100)]
        count: usize,
        /// Directory to write into.
        #[arg(short = 'o', long, default_value = "test_input")]
        dir: PathBuf,
    },
    /// Converts every file in a directory.
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub(crate) struct RunArgs {
    /// Directory with source images.
    #[arg(short, long, default_value = "test_input")]
    pub(crate) input: PathBuf,
    /// Directory for converted images.
    #[arg(short, long, default_value = "test_output")]
    pub(crate) output: PathBuf,
    /// Sequential baseline or the priority worker pool.
    #[arg(short, long, value_enum, default_value_t = Mode::Pool)]
    pub(crate) mode: Mode,
    /// Worker threads (0 = number of CPUs).
    #[arg(short, long, default_value_t = 4)]
    pub(crate) workers: usize,
    /// Bound of the dispatcher-to-worker channel.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub(crate) channel_capacity: usize,
    /// Target format: png, jpeg or webp.
    #[arg(short, long, default_value = "png")]
    pub(crate) format: ImageFormat,
    /// Encoder quality, used by JPEG.
    #[arg(short, long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub(crate) quality: u8,
    /// Generates this many test images into the input directory first.
    #[arg(short, long)]
    pub(crate) generate: Option<usize>,
    /// Prints the final report as JSON.
    #[arg(long, default_value_t)]
    pub(crate) json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Mode {
    /// One file after another on the main thread.
    Sync,
    /// Priority worker pool.
    Pool,
}
