/// A 3x3 integer kernel indexed as `[dy][dx]`.
pub type Kernel3 = [[i32; 3]; 3];

/// Horizontal sobel kernel.
pub const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Vertical sobel kernel.
pub const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Create the 3x3 sobel kernels.
///
/// # Returns
///
/// The horizontal and vertical kernels as a tuple.
pub fn sobel_kernel3() -> (Kernel3, Kernel3) {
    (SOBEL_KERNEL_X, SOBEL_KERNEL_Y)
}
