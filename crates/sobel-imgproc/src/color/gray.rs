use crate::parallel::{self, ExecutionStrategy};
use sobel_image::{Image, ImageError};

/// Define the RGB weights for the grayscale conversion.
const RW: f64 = 0.299;
const GW: f64 = 0.587;
const BW: f64 = 0.114;

/// Luminance of a single RGB8 pixel.
///
/// Y = round(0.299 * R + 0.587 * G + 0.114 * B), rounding half away from zero.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> i32 {
    (RW * r as f64 + GW * g as f64 + BW * b as f64).round() as i32
}

/// Convert an RGB8 image to an integer intensity image using the formula:
///
/// Y = round(0.299 * R + 0.587 * G + 0.114 * B)
///
/// # Arguments
///
/// * `src` - The input RGB image, channels ordered `[r, g, b]`.
/// * `dst` - The output intensity image.
/// * `strategy` - How the rows are visited.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use sobel_image::{Image, ImageSize};
/// use sobel_imgproc::color::gray_from_rgb;
/// use sobel_imgproc::parallel::ExecutionStrategy;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0u8; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let mut gray = Image::<i32, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_rgb(&image, &mut gray, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(gray.num_channels(), 1);
/// assert_eq!(gray.size().width, 4);
/// assert_eq!(gray.size().height, 5);
/// ```
pub fn gray_from_rgb(
    src: &Image<u8, 3>,
    dst: &mut Image<i32, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, strategy, |src_pixel, dst_pixel| {
        dst_pixel[0] = luminance(src_pixel[0], src_pixel[1], src_pixel[2]);
    });

    Ok(())
}
