use sobel_image::Image;

/// Fill the one pixel frame of an image by replicating its nearest interior values.
///
/// The frame is written in a fixed order:
///
/// 1. rows: row `0` copies row `1` and row `height - 1` copies row `height - 2`;
/// 2. columns: column `0` copies column `1` and column `width - 1` copies column `width - 2`.
///
/// The column pass reads the already replicated rows, so every corner ends up with the value
/// of its diagonal interior neighbour. Images narrower or shorter than 3 pixels have no
/// interior and are left unchanged.
///
/// # Arguments
///
/// * `image` - The image to update in place.
///
/// # Example
///
/// ```
/// use sobel_image::Image;
/// use sobel_imgproc::padding::replicate_border;
///
/// #[rustfmt::skip]
/// let mut image = Image::<u8, 1>::new(
///     [3, 3].into(),
///     vec![
///         0, 0, 0,
///         0, 9, 0,
///         0, 0, 0,
///     ],
/// ).unwrap();
///
/// replicate_border(&mut image);
/// assert!(image.as_slice().iter().all(|&v| v == 9));
/// ```
pub fn replicate_border<T: Copy, const C: usize>(image: &mut Image<T, C>) {
    let (cols, rows) = (image.cols(), image.rows());
    if cols < 3 || rows < 3 {
        return;
    }

    let row_stride = cols * C;
    let data = image.as_slice_mut();

    // top and bottom rows
    data.copy_within(row_stride..2 * row_stride, 0);
    data.copy_within((rows - 2) * row_stride..(rows - 1) * row_stride, (rows - 1) * row_stride);

    // left and right columns, corners included
    for row in data.chunks_exact_mut(row_stride) {
        row.copy_within(C..2 * C, 0);
        row.copy_within((cols - 2) * C..(cols - 1) * C, (cols - 1) * C);
    }
}
