use sobel_image::ImageError;
use sobel_io::IoError;

/// An error type for the edge detection pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error while reading or writing a BMP file.
    #[error(transparent)]
    Io(#[from] IoError),

    /// Error while processing the image grids.
    #[error(transparent)]
    Image(#[from] ImageError),
}
