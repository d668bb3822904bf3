/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must share a size do not.
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel coordinate falls outside the image.
    #[error("Pixel index ({0}, {1}) is out of bounds for image {2}x{3}")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a channel index is larger than the number of channels.
    #[error("Channel index {0} is out of bounds for {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),
}
