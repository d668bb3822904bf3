/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File does not have a bmp extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open, read or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The file is not an uncompressed 24-bit BMP.
    #[error("Unsupported BMP format: {0}")]
    UnsupportedFormat(String),

    /// The stream ended before all bytes implied by the headers were read.
    #[error("Truncated BMP data: expected {expected} bytes, got {actual}")]
    TruncatedInput {
        /// Number of bytes the headers require.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// The image is larger than the supported maximum.
    #[error("Image {width}x{height} exceeds the maximum dimension {max}")]
    DimensionLimit {
        /// Declared width in pixels.
        width: usize,
        /// Declared height in pixels.
        height: usize,
        /// Largest accepted width or height.
        max: usize,
    },

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] sobel_image::ImageError),
}
