use sobel_image::{Image, ImageError};

use super::kernels::{self, Kernel3};
use crate::parallel::{self, ExecutionStrategy};

/// Value written for pixels whose gradient magnitude exceeds the threshold.
pub const EDGE_VALUE: u8 = 255;

/// Value written for pixels whose gradient magnitude does not exceed the threshold.
pub const NON_EDGE_VALUE: u8 = 0;

/// How the horizontal and vertical derivatives are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientMagnitude {
    /// `sqrt(gx^2 + gy^2)`
    #[default]
    Euclidean,
    /// `|gx| + |gy|`
    L1,
}

impl GradientMagnitude {
    /// Combine a pair of derivatives into a non-negative magnitude.
    #[inline]
    pub fn compute(&self, gx: i32, gy: i32) -> f64 {
        match self {
            GradientMagnitude::Euclidean => {
                let (gx, gy) = (gx as f64, gy as f64);
                (gx * gx + gy * gy).sqrt()
            }
            GradientMagnitude::L1 => gx.unsigned_abs() as f64 + gy.unsigned_abs() as f64,
        }
    }
}

// convolve the 3x3 neighbourhood centered at (x, y); the caller guarantees it is in bounds
#[inline]
fn gradient_kernel3(
    src_data: &[i32],
    cols: usize,
    kernel_x: &Kernel3,
    kernel_y: &Kernel3,
    x: usize,
    y: usize,
) -> (i32, i32) {
    let mut sum_x = 0;
    let mut sum_y = 0;
    for dy in 0..3 {
        let row_offset = (y + dy - 1) * cols;
        for dx in 0..3 {
            let val = src_data[row_offset + x + dx - 1];
            sum_x += val * kernel_x[dy][dx];
            sum_y += val * kernel_y[dy][dx];
        }
    }
    (sum_x, sum_y)
}

/// Compute the sobel derivatives of a single interior pixel.
///
/// # Arguments
///
/// * `src` - The intensity image.
/// * `x` - The column, must satisfy `1 <= x <= width - 2`.
/// * `y` - The row, must satisfy `1 <= y <= height - 2`.
///
/// # Returns
///
/// The `(gx, gy)` pair.
///
/// # Errors
///
/// Returns [`ImageError::PixelIndexOutOfBounds`] if the pixel has no full 3x3 neighbourhood.
pub fn sobel_gradient_at(src: &Image<i32, 1>, x: usize, y: usize) -> Result<(i32, i32), ImageError> {
    let (cols, rows) = (src.cols(), src.rows());
    if x == 0 || y == 0 || x + 1 >= cols || y + 1 >= rows {
        return Err(ImageError::PixelIndexOutOfBounds(x, y, cols, rows));
    }

    let (kernel_x, kernel_y) = kernels::sobel_kernel3();
    Ok(gradient_kernel3(
        src.as_slice(),
        cols,
        &kernel_x,
        &kernel_y,
        x,
        y,
    ))
}

/// Detect edges with the sobel operator and a fixed threshold.
///
/// Every pixel with a full 3x3 neighbourhood is set to [`EDGE_VALUE`] when its gradient
/// magnitude is strictly greater than `threshold` and to [`NON_EDGE_VALUE`] otherwise.
/// The one pixel frame of `dst` is not written.
///
/// # Arguments
///
/// * `src` - The intensity image with shape (H, W).
/// * `dst` - The edge image with shape (H, W).
/// * `threshold` - The magnitude cutoff.
/// * `magnitude` - How the derivatives are combined.
/// * `strategy` - How the rows are visited.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use sobel_image::{Image, ImageSize};
/// use sobel_imgproc::filter::{sobel_edges, GradientMagnitude};
/// use sobel_imgproc::parallel::ExecutionStrategy;
///
/// let gray = Image::<i32, 1>::from_size_val([4, 4].into(), 128).unwrap();
/// let mut edges = Image::<u8, 1>::from_size_val(gray.size(), 0).unwrap();
///
/// sobel_edges(&gray, &mut edges, 90.0, GradientMagnitude::Euclidean, ExecutionStrategy::Serial).unwrap();
/// assert!(edges.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn sobel_edges(
    src: &Image<i32, 1>,
    dst: &mut Image<u8, 1>,
    threshold: f64,
    magnitude: GradientMagnitude,
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

    let (cols, rows) = (src.cols(), src.rows());
    if cols < 3 || rows < 3 {
        return Ok(());
    }

    let (kernel_x, kernel_y) = kernels::sobel_kernel3();
    let src_data = src.as_slice();

    parallel::iter_rows_mut(dst.as_slice_mut(), cols, strategy, |y, dst_row| {
        if y == 0 || y == rows - 1 {
            return;
        }
        for (x, dst_pixel) in dst_row.iter_mut().enumerate().take(cols - 1).skip(1) {
            let (gx, gy) = gradient_kernel3(src_data, cols, &kernel_x, &kernel_y, x, y);
            *dst_pixel = if magnitude.compute(gx, gy) > threshold {
                EDGE_VALUE
            } else {
                NON_EDGE_VALUE
            };
        }
    });

    Ok(())
}
