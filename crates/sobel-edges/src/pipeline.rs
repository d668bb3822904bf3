use std::path::PathBuf;

use sobel_image::Image;
use sobel_imgproc::{
    color::gray_from_rgb,
    filter::{sobel_edges, GradientMagnitude},
    padding::replicate_border,
    parallel::ExecutionStrategy,
};
use sobel_io::bmp::{read_image_bmp_rgb8, write_image_bmp_mono8, BmpDecodeOptions};

use crate::error::PipelineError;

/// Default cutoff on the gradient magnitude.
pub const DEFAULT_THRESHOLD: u32 = 90;

/// Configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// The BMP file to read.
    pub input_path: PathBuf,
    /// Directory receiving `Output_Sobel_<threshold>.bmp`.
    pub output_dir: PathBuf,
    /// Pixels with a gradient magnitude strictly above this value are edges.
    pub threshold: u32,
    /// How the two gradient components are combined.
    pub magnitude: GradientMagnitude,
    /// Largest accepted padded width or height of the input.
    pub max_dimension: usize,
    /// Row scheduling inside each stage.
    pub strategy: ExecutionStrategy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("input.bmp"),
            output_dir: PathBuf::from("."),
            threshold: DEFAULT_THRESHOLD,
            magnitude: GradientMagnitude::default(),
            max_dimension: BmpDecodeOptions::default().max_dimension,
            strategy: ExecutionStrategy::default(),
        }
    }
}

/// Name of the output file for a given threshold.
///
/// # Example
///
/// ```
/// assert_eq!(sobel_edges::output_file_name(90), "Output_Sobel_90.bmp");
/// ```
pub fn output_file_name(threshold: u32) -> String {
    format!("Output_Sobel_{threshold}.bmp")
}

/// Compute the binary edge map of a color image.
///
/// The image goes through grayscale conversion, Sobel thresholding of the interior pixels
/// and border replication. Each stage completes before the next one starts.
///
/// # Arguments
///
/// * `color` - The input image with channels `[r, g, b]`.
/// * `config` - Threshold, magnitude and row scheduling to use.
///
/// # Returns
///
/// A single channel image of the same size holding only `0` and `255`.
pub fn detect_edges(
    color: &Image<u8, 3>,
    config: &PipelineConfig,
) -> Result<Image<u8, 1>, PipelineError> {
    let mut gray = Image::<i32, 1>::from_size_val(color.size(), 0)?;
    gray_from_rgb(color, &mut gray, config.strategy)?;

    let mut edges = Image::<u8, 1>::from_size_val(color.size(), 0)?;
    sobel_edges(
        &gray,
        &mut edges,
        f64::from(config.threshold),
        config.magnitude,
        config.strategy,
    )?;

    replicate_border(&mut edges);

    Ok(edges)
}

/// Read the input BMP, detect its edges and write the result into the configured output dir.
///
/// The output carries the exact header bytes of the input; only the pixel payload changes.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Any decoding, processing or writing failure, see [`PipelineError`].
pub fn run(config: &PipelineConfig) -> Result<PathBuf, PipelineError> {
    let options = BmpDecodeOptions {
        max_dimension: config.max_dimension,
    };
    let (header, color) = read_image_bmp_rgb8(&config.input_path, &options)?;

    if log::log_enabled!(log::Level::Debug) {
        for line in header.to_string().lines() {
            log::debug!("{line}");
        }
    }
    log::debug!("grid: {}", color.size());

    let edges = detect_edges(&color, config)?;

    let output_path = config.output_dir.join(output_file_name(config.threshold));
    write_image_bmp_mono8(&output_path, &header, &edges)?;

    log::info!(
        "edge map with threshold {} written to {}",
        config.threshold,
        output_path.display()
    );

    Ok(output_path)
}
