use color_eyre::eyre::{eyre, Result};
use image_folder_batch::{Cpu, FolderLoader, ImageTransform, LoaderConfig, PreprocessConfig};
use std::env;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: image-folder-batch <folder> [preprocess_config.json] [loader_config.json]";

fn main() -> Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let folder = args.next().ok_or_else(|| eyre!(USAGE))?;
    let preprocess_config = match args.next() {
        Some(path) => PreprocessConfig::from_file(path)?,
        None => PreprocessConfig::default(),
    };
    let loader_config = match args.next() {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };

    let transform = ImageTransform::new(preprocess_config)?;
    let loader = FolderLoader::with_config(&folder, loader_config);

    let now = Instant::now();
    let (batch, report) = loader.load_with_report(&transform, &Cpu)?;
    println!(
        "Loaded {}/{} images from {folder} in {:?}",
        report.loaded(),
        report.attempted,
        now.elapsed()
    );
    println!("Batch shape: {:?}", batch.shape());

    Ok(())
}
