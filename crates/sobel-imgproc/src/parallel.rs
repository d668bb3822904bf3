use rayon::prelude::*;

use sobel_image::Image;

/// Controls how the rows of an image are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    ///
    /// Every row is written by exactly one task, so the output is identical to
    /// [`ExecutionStrategy::Serial`].
    ParallelRows,
}

/// Apply a function to each pixel of `src` and the matching pixel of `dst`.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    strategy: ExecutionStrategy,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 || src.rows() == 0 {
        return;
    }

    match strategy {
        ExecutionStrategy::Serial => src
            .as_slice()
            .chunks_exact(C1 * cols)
            .zip(dst.as_slice_mut().chunks_exact_mut(C2 * cols))
            .for_each(|(src_chunk, dst_chunk)| {
                iter_row_pixels::<T1, C1, T2, C2, _>(src_chunk, dst_chunk, &f);
            }),
        ExecutionStrategy::ParallelRows => src
            .as_slice()
            .par_chunks_exact(C1 * cols)
            .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
            .for_each(|(src_chunk, dst_chunk)| {
                iter_row_pixels::<T1, C1, T2, C2, _>(src_chunk, dst_chunk, &f);
            }),
    }
}

#[inline]
fn iter_row_pixels<T1, const C1: usize, T2, const C2: usize, F>(
    src_chunk: &[T1],
    dst_chunk: &mut [T2],
    f: &F,
) where
    F: Fn(&[T1], &mut [T2]),
{
    src_chunk
        .chunks_exact(C1)
        .zip(dst_chunk.chunks_exact_mut(C2))
        .for_each(|(src_pixel, dst_pixel)| {
            f(src_pixel, dst_pixel);
        });
}

/// Apply a function to every row of a mutable buffer, passing the row index.
///
/// A `row_len` of zero means there is nothing to visit.
pub fn iter_rows_mut<T: Send>(
    data: &mut [T],
    row_len: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) {
    if row_len == 0 {
        return;
    }

    match strategy {
        ExecutionStrategy::Serial => data
            .chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row)),
        ExecutionStrategy::ParallelRows => data
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row)),
    }
}
