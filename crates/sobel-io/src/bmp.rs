//! Uncompressed 24-bit BMP codec.
//!
//! All multi-byte header fields are little-endian. A file is laid out as:
//!
//! * a 14 byte file header (signature, declared file size, pixel data offset);
//! * a 40 byte info header (dimensions, bit depth, compression, resolution);
//! * optionally more bytes up to the pixel data offset, kept verbatim;
//! * the pixel payload, `height` rows of `padded_width` pixels stored as `[b, g, r]`;
//! * optionally trailing bytes after the payload, also kept verbatim.
//!
//! The row width is rounded up to a multiple of 4 pixels before any grid access, and the
//! rows are kept in the order they are stored on disk (no vertical flip). Decoding and
//! encoding use the same traversal, so an untouched color grid is written back byte for byte.

use std::{
    fs,
    io::{BufWriter, Read, Write},
    path::Path,
};

use sobel_image::{Image, ImageError, ImageSize};

use crate::error::IoError;

/// Size of the file header in bytes.
pub const FILE_HEADER_SIZE: usize = 14;

/// Size of the info header in bytes.
pub const INFO_HEADER_SIZE: usize = 40;

/// The `BM` signature as a little-endian `u16`.
pub const BMP_SIGNATURE: u16 = u16::from_le_bytes(*b"BM");

/// The only supported bit depth.
pub const BITS_PER_PIXEL: u16 = 24;

/// `BI_RGB`, no compression.
pub const COMPRESSION_NONE: u32 = 0;

/// Largest width or height accepted by default.
pub const DEFAULT_MAX_DIMENSION: usize = 2048;

// 72 dpi
const DEFAULT_PELS_PER_METER: i32 = 2835;

#[inline]
fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

#[inline]
fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[inline]
fn read_i32(buf: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Round a width in pixels up to the next multiple of 4.
///
/// # Example
///
/// ```
/// use sobel_io::bmp::padded_width;
///
/// assert_eq!(padded_width(5), 8);
/// assert_eq!(padded_width(8), 8);
/// ```
pub fn padded_width(width: usize) -> usize {
    width + (4 - width % 4) % 4
}

/// The `BITMAPFILEHEADER` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpFileHeader {
    /// Signature, `BM` for Windows bitmaps.
    pub bf_type: u16,
    /// Declared size of the whole file in bytes.
    pub bf_size: u32,
    /// Reserved, carried through.
    pub bf_reserved1: u16,
    /// Reserved, carried through.
    pub bf_reserved2: u16,
    /// Byte offset from the start of the file to the pixel payload.
    pub bf_off_bits: u32,
}

impl From<[u8; FILE_HEADER_SIZE]> for BmpFileHeader {
    fn from(a: [u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            bf_type: read_u16(&a, 0),
            bf_size: read_u32(&a, 2),
            bf_reserved1: read_u16(&a, 6),
            bf_reserved2: read_u16(&a, 8),
            bf_off_bits: read_u32(&a, 10),
        }
    }
}

impl From<BmpFileHeader> for [u8; FILE_HEADER_SIZE] {
    fn from(h: BmpFileHeader) -> Self {
        let mut a = [0; FILE_HEADER_SIZE];
        a[0..2].copy_from_slice(&h.bf_type.to_le_bytes());
        a[2..6].copy_from_slice(&h.bf_size.to_le_bytes());
        a[6..8].copy_from_slice(&h.bf_reserved1.to_le_bytes());
        a[8..10].copy_from_slice(&h.bf_reserved2.to_le_bytes());
        a[10..14].copy_from_slice(&h.bf_off_bits.to_le_bytes());
        a
    }
}

/// The `BITMAPINFOHEADER` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpInfoHeader {
    /// Size of the info header as declared by the file.
    pub bi_size: u32,
    /// Image width in pixels.
    pub bi_width: i32,
    /// Image height in pixels. Negative for top-down files.
    pub bi_height: i32,
    /// Number of color planes.
    pub bi_planes: u16,
    /// Bits per pixel.
    pub bi_bit_count: u16,
    /// Compression mode, `0` for none.
    pub bi_compression: u32,
    /// Declared size of the pixel payload.
    pub bi_size_image: u32,
    /// Horizontal resolution.
    pub bi_x_pels_per_meter: i32,
    /// Vertical resolution.
    pub bi_y_pels_per_meter: i32,
    /// Palette length.
    pub bi_clr_used: u32,
    /// Number of important palette colors.
    pub bi_clr_important: u32,
}

impl From<[u8; INFO_HEADER_SIZE]> for BmpInfoHeader {
    fn from(a: [u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            bi_size: read_u32(&a, 0),
            bi_width: read_i32(&a, 4),
            bi_height: read_i32(&a, 8),
            bi_planes: read_u16(&a, 12),
            bi_bit_count: read_u16(&a, 14),
            bi_compression: read_u32(&a, 16),
            bi_size_image: read_u32(&a, 20),
            bi_x_pels_per_meter: read_i32(&a, 24),
            bi_y_pels_per_meter: read_i32(&a, 28),
            bi_clr_used: read_u32(&a, 32),
            bi_clr_important: read_u32(&a, 36),
        }
    }
}

impl From<BmpInfoHeader> for [u8; INFO_HEADER_SIZE] {
    fn from(h: BmpInfoHeader) -> Self {
        let mut a = [0; INFO_HEADER_SIZE];
        a[0..4].copy_from_slice(&h.bi_size.to_le_bytes());
        a[4..8].copy_from_slice(&h.bi_width.to_le_bytes());
        a[8..12].copy_from_slice(&h.bi_height.to_le_bytes());
        a[12..14].copy_from_slice(&h.bi_planes.to_le_bytes());
        a[14..16].copy_from_slice(&h.bi_bit_count.to_le_bytes());
        a[16..20].copy_from_slice(&h.bi_compression.to_le_bytes());
        a[20..24].copy_from_slice(&h.bi_size_image.to_le_bytes());
        a[24..28].copy_from_slice(&h.bi_x_pels_per_meter.to_le_bytes());
        a[28..32].copy_from_slice(&h.bi_y_pels_per_meter.to_le_bytes());
        a[32..36].copy_from_slice(&h.bi_clr_used.to_le_bytes());
        a[36..40].copy_from_slice(&h.bi_clr_important.to_le_bytes());
        a
    }
}

/// Everything around the pixel payload, carried from input to output unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    /// The file header.
    pub file: BmpFileHeader,
    /// The info header.
    pub info: BmpInfoHeader,
    /// Bytes between the info header and the pixel data offset.
    pub extra: Vec<u8>,
    /// Bytes following the pixel payload.
    pub trailer: Vec<u8>,
}

impl BmpHeader {
    /// Build the headers of a standard 24-bit BMP for a grid of the given size.
    ///
    /// The declared width is `size.width`; the payload holds `padded_width` pixels per row.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnsupportedFormat`] if the size does not fit the header fields.
    pub fn new_rgb24(size: ImageSize) -> Result<Self, IoError> {
        let too_large = || IoError::UnsupportedFormat(format!("{size} does not fit a BMP header"));

        let payload = padded_width(size.width)
            .checked_mul(size.height)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(too_large)?;
        let payload = u32::try_from(payload).map_err(|_| too_large())?;
        let header_len = (FILE_HEADER_SIZE + INFO_HEADER_SIZE) as u32;

        Ok(Self {
            file: BmpFileHeader {
                bf_type: BMP_SIGNATURE,
                bf_size: payload.checked_add(header_len).ok_or_else(too_large)?,
                bf_reserved1: 0,
                bf_reserved2: 0,
                bf_off_bits: header_len,
            },
            info: BmpInfoHeader {
                bi_size: INFO_HEADER_SIZE as u32,
                bi_width: i32::try_from(size.width).map_err(|_| too_large())?,
                bi_height: i32::try_from(size.height).map_err(|_| too_large())?,
                bi_planes: 1,
                bi_bit_count: BITS_PER_PIXEL,
                bi_compression: COMPRESSION_NONE,
                bi_size_image: payload,
                bi_x_pels_per_meter: DEFAULT_PELS_PER_METER,
                bi_y_pels_per_meter: DEFAULT_PELS_PER_METER,
                bi_clr_used: 0,
                bi_clr_important: 0,
            },
            extra: Vec::new(),
            trailer: Vec::new(),
        })
    }

    /// Declared width in pixels. Negative widths are reported as zero.
    pub fn width(&self) -> usize {
        self.info.bi_width.max(0) as usize
    }

    /// Number of pixel rows, regardless of the row order sign.
    pub fn height(&self) -> usize {
        self.info.bi_height.unsigned_abs() as usize
    }

    /// Whether the rows are stored top to bottom.
    pub fn is_top_down(&self) -> bool {
        self.info.bi_height < 0
    }

    /// Width of every grid, rounded up to a multiple of 4 pixels.
    pub fn padded_width(&self) -> usize {
        padded_width(self.width())
    }

    /// Size of the color, intensity and edge grids.
    pub fn grid_size(&self) -> ImageSize {
        ImageSize {
            width: self.padded_width(),
            height: self.height(),
        }
    }

    /// Number of payload bytes implied by the headers.
    pub fn pixel_data_len(&self) -> usize {
        self.grid_size().area() * 3
    }

    /// Total number of bytes written before the payload.
    pub fn byte_len(&self) -> usize {
        FILE_HEADER_SIZE + INFO_HEADER_SIZE + self.extra.len()
    }

    /// Check the headers describe an image this codec can process.
    ///
    /// # Errors
    ///
    /// * [`IoError::UnsupportedFormat`] for a wrong signature, bit depth, compression,
    ///   info header size or a negative width.
    /// * [`IoError::DimensionLimit`] if the padded width or the height exceed `max_dimension`.
    pub fn validate(&self, max_dimension: usize) -> Result<(), IoError> {
        if self.file.bf_type != BMP_SIGNATURE {
            return Err(IoError::UnsupportedFormat(format!(
                "signature {:#06x} is not BM",
                self.file.bf_type
            )));
        }

        if (self.info.bi_size as usize) < INFO_HEADER_SIZE {
            return Err(IoError::UnsupportedFormat(format!(
                "info header of {} bytes",
                self.info.bi_size
            )));
        }

        if self.info.bi_bit_count != BITS_PER_PIXEL {
            return Err(IoError::UnsupportedFormat(format!(
                "{} bits per pixel",
                self.info.bi_bit_count
            )));
        }

        if self.info.bi_compression != COMPRESSION_NONE {
            return Err(IoError::UnsupportedFormat(format!(
                "compression mode {}",
                self.info.bi_compression
            )));
        }

        if self.info.bi_width < 0 {
            return Err(IoError::UnsupportedFormat(format!(
                "negative width {}",
                self.info.bi_width
            )));
        }

        if self.padded_width() > max_dimension || self.height() > max_dimension {
            return Err(IoError::DimensionLimit {
                width: self.width(),
                height: self.height(),
                max: max_dimension,
            });
        }

        Ok(())
    }

    /// Read the file header, the info header and any bytes up to the pixel data offset.
    ///
    /// The fixed headers are validated with [`BmpHeader::validate`] before the pixel data
    /// offset is trusted. The trailer is left empty.
    pub fn read_from<R: Read>(reader: &mut R, max_dimension: usize) -> Result<Self, IoError> {
        let mut file_buf = [0u8; FILE_HEADER_SIZE];
        read_exact_or_truncated(reader, &mut file_buf, 0)?;
        let mut info_buf = [0u8; INFO_HEADER_SIZE];
        read_exact_or_truncated(reader, &mut info_buf, FILE_HEADER_SIZE)?;

        let mut header = Self {
            file: BmpFileHeader::from(file_buf),
            info: BmpInfoHeader::from(info_buf),
            extra: Vec::new(),
            trailer: Vec::new(),
        };
        header.validate(max_dimension)?;

        let extra_len = (header.file.bf_off_bits as usize)
            .saturating_sub(FILE_HEADER_SIZE + INFO_HEADER_SIZE);
        if extra_len > 0 {
            reader
                .take(extra_len as u64)
                .read_to_end(&mut header.extra)?;
            if header.extra.len() < extra_len {
                return Err(IoError::TruncatedInput {
                    expected: FILE_HEADER_SIZE + INFO_HEADER_SIZE + extra_len,
                    actual: header.byte_len(),
                });
            }
            log::debug!("carrying {extra_len} bytes between the info header and the pixel data");
        }

        Ok(header)
    }

    /// Write the headers and the carried bytes preceding the payload verbatim.
    ///
    /// The trailer is written by the encoders after the payload.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), IoError> {
        writer.write_all(&<[u8; FILE_HEADER_SIZE]>::from(self.file))?;
        writer.write_all(&<[u8; INFO_HEADER_SIZE]>::from(self.info))?;
        writer.write_all(&self.extra)?;
        Ok(())
    }
}

impl std::fmt::Display for BmpHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (file, info) = (&self.file, &self.info);
        writeln!(f, "bf_type: {:#06x}", file.bf_type)?;
        writeln!(f, "bf_size: {}", file.bf_size)?;
        writeln!(f, "bf_reserved1: {}", file.bf_reserved1)?;
        writeln!(f, "bf_reserved2: {}", file.bf_reserved2)?;
        writeln!(f, "bf_off_bits: {}", file.bf_off_bits)?;
        writeln!(f, "bi_size: {}", info.bi_size)?;
        writeln!(f, "bi_width: {}", info.bi_width)?;
        writeln!(f, "bi_height: {}", info.bi_height)?;
        writeln!(f, "bi_planes: {}", info.bi_planes)?;
        writeln!(f, "bi_bit_count: {}", info.bi_bit_count)?;
        writeln!(f, "bi_compression: {}", info.bi_compression)?;
        writeln!(f, "bi_size_image: {}", info.bi_size_image)?;
        writeln!(f, "bi_x_pels_per_meter: {}", info.bi_x_pels_per_meter)?;
        writeln!(f, "bi_y_pels_per_meter: {}", info.bi_y_pels_per_meter)?;
        writeln!(f, "bi_clr_used: {}", info.bi_clr_used)?;
        write!(f, "bi_clr_important: {}", info.bi_clr_important)
    }
}

/// Options controlling BMP decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpDecodeOptions {
    /// Largest accepted padded width or height.
    pub max_dimension: usize,
}

impl Default for BmpDecodeOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

// fill `buf` or fail with the number of bytes that were available; `offset` is the stream
// position of `buf[0]` and only feeds the error report
fn read_exact_or_truncated<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    offset: usize,
) -> Result<(), IoError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(IoError::TruncatedInput {
                    expected: offset + buf.len(),
                    actual: offset + filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Decode a 24-bit BMP from a byte stream into an RGB8 image.
///
/// # Arguments
///
/// * `reader` - The source of the BMP bytes.
/// * `options` - Decoding limits.
///
/// # Returns
///
/// The carried headers and a `padded_width x height` image with channels `[r, g, b]`.
///
/// # Errors
///
/// * [`IoError::UnsupportedFormat`] and [`IoError::DimensionLimit`] from header validation.
/// * [`IoError::TruncatedInput`] if the stream ends early.
pub fn decode_bmp_rgb8<R: Read>(
    mut reader: R,
    options: &BmpDecodeOptions,
) -> Result<(BmpHeader, Image<u8, 3>), IoError> {
    let mut header = BmpHeader::read_from(&mut reader, options.max_dimension)?;

    let mut data = vec![0u8; header.pixel_data_len()];
    read_exact_or_truncated(&mut reader, &mut data, header.byte_len())?;

    reader.read_to_end(&mut header.trailer)?;
    if !header.trailer.is_empty() {
        log::debug!("carrying {} bytes after the pixel data", header.trailer.len());
    }

    // stored as [b, g, r]
    data.chunks_exact_mut(3).for_each(|pixel| pixel.swap(0, 2));

    let image = Image::new(header.grid_size(), data)?;

    Ok((header, image))
}

fn check_grid_size(header: &BmpHeader, size: ImageSize) -> Result<(), IoError> {
    let expected = header.grid_size();
    if size != expected {
        return Err(ImageError::InvalidImageSize(
            size.width,
            size.height,
            expected.width,
            expected.height,
        )
        .into());
    }
    Ok(())
}

/// Encode an RGB8 image as a BMP using the given headers.
///
/// # Arguments
///
/// * `writer` - The destination of the BMP bytes.
/// * `header` - The headers to write, usually the ones returned by the decoder.
/// * `image` - A `padded_width x height` image with channels `[r, g, b]`.
pub fn encode_bmp_rgb8<W: Write>(
    mut writer: W,
    header: &BmpHeader,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    check_grid_size(header, image.size())?;

    let mut data = image.as_slice().to_vec();
    data.chunks_exact_mut(3).for_each(|pixel| pixel.swap(0, 2));

    header.write_to(&mut writer)?;
    writer.write_all(&data)?;
    writer.write_all(&header.trailer)?;
    writer.flush()?;

    Ok(())
}

/// Encode a single channel image as a BMP, replicating each value into the three color bytes.
///
/// # Arguments
///
/// * `writer` - The destination of the BMP bytes.
/// * `header` - The headers to write, usually the ones returned by the decoder.
/// * `image` - A `padded_width x height` single channel image.
pub fn encode_bmp_mono8<W: Write>(
    mut writer: W,
    header: &BmpHeader,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    check_grid_size(header, image.size())?;

    let data = image
        .as_slice()
        .iter()
        .flat_map(|&v| [v, v, v])
        .collect::<Vec<_>>();

    header.write_to(&mut writer)?;
    writer.write_all(&data)?;
    writer.write_all(&header.trailer)?;
    writer.flush()?;

    Ok(())
}

/// Read a 24-bit BMP image with three channels (rgb8).
///
/// # Arguments
///
/// * `file_path` - The path to the BMP file.
/// * `options` - Decoding limits.
///
/// # Returns
///
/// The carried headers and the RGB image.
pub fn read_image_bmp_rgb8(
    file_path: impl AsRef<Path>,
    options: &BmpDecodeOptions,
) -> Result<(BmpHeader, Image<u8, 3>), IoError> {
    // verify the file exists
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    // verify the file extension
    if !file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bmp"))
    {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let bytes = fs::read(file_path)?;
    decode_bmp_rgb8(bytes.as_slice(), options)
}

/// Write an RGB8 image to a BMP file.
///
/// # Arguments
///
/// * `file_path` - The path to the BMP file.
/// * `header` - The headers to write.
/// * `image` - The RGB image.
pub fn write_image_bmp_rgb8(
    file_path: impl AsRef<Path>,
    header: &BmpHeader,
    image: &Image<u8, 3>,
) -> Result<(), IoError> {
    let file = fs::File::create(file_path)?;
    encode_bmp_rgb8(BufWriter::new(file), header, image)
}

/// Write a single channel image to a BMP file, one value in all three color bytes.
///
/// # Arguments
///
/// * `file_path` - The path to the BMP file.
/// * `header` - The headers to write.
/// * `image` - The single channel image.
pub fn write_image_bmp_mono8(
    file_path: impl AsRef<Path>,
    header: &BmpHeader,
    image: &Image<u8, 1>,
) -> Result<(), IoError> {
    let file = fs::File::create(file_path)?;
    encode_bmp_mono8(BufWriter::new(file), header, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    // header + payload of a bmp whose pixel values follow the byte index
    fn synthetic_bmp(width: usize, height: usize) -> Result<Vec<u8>, IoError> {
        let header = BmpHeader::new_rgb24(ImageSize { width, height })?;
        let mut bytes = vec![];
        header.write_to(&mut bytes)?;
        bytes.extend((0..header.pixel_data_len()).map(|i| (i % 251) as u8));
        Ok(bytes)
    }

    #[test]
    fn test_padded_width_rounding() {
        assert_eq!(padded_width(0), 0);
        assert_eq!(padded_width(1), 4);
        assert_eq!(padded_width(3), 4);
        assert_eq!(padded_width(4), 4);
        assert_eq!(padded_width(2045), 2048);
    }

    #[test]
    fn test_header_layout() -> Result<(), IoError> {
        let header = BmpHeader::new_rgb24(ImageSize {
            width: 5,
            height: 2,
        })?;
        let mut bytes = vec![];
        header.write_to(&mut bytes)?;

        assert_eq!(bytes.len(), 54);
        assert_eq!(&bytes[0..2], b"BM");
        // 8 pixels per row, 2 rows, 3 bytes each
        assert_eq!(read_u32(&bytes, 2), 54 + 48);
        assert_eq!(read_u32(&bytes, 10), 54);
        assert_eq!(read_u32(&bytes, 14), 40);
        assert_eq!(read_i32(&bytes, 18), 5);
        assert_eq!(read_i32(&bytes, 22), 2);
        assert_eq!(read_u16(&bytes, 26), 1);
        assert_eq!(read_u16(&bytes, 28), 24);
        assert_eq!(read_u32(&bytes, 30), 0);
        assert_eq!(read_u32(&bytes, 34), 48);

        let parsed = BmpHeader::read_from(&mut bytes.as_slice(), DEFAULT_MAX_DIMENSION)?;
        assert_eq!(parsed, header);
        assert_eq!(parsed.grid_size(), ImageSize { width: 8, height: 2 });

        Ok(())
    }

    #[test]
    fn test_header_display_lists_every_field() -> Result<(), IoError> {
        let header = BmpHeader::new_rgb24(ImageSize {
            width: 5,
            height: 2,
        })?;
        let text = header.to_string();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "bf_type: 0x4d42");
        for expected in [
            "bi_planes: 1",
            "bi_bit_count: 24",
            "bi_size_image: 48",
            "bi_x_pels_per_meter: 2835",
            "bi_y_pels_per_meter: 2835",
            "bi_clr_used: 0",
            "bi_clr_important: 0",
        ] {
            assert!(lines.contains(&expected), "missing {expected}");
        }

        Ok(())
    }

    #[test]
    fn test_decode_channel_order() -> Result<(), IoError> {
        let mut bytes = synthetic_bmp(4, 1)?;
        bytes[54..57].copy_from_slice(&[10, 20, 30]);

        let (_, image) = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default())?;
        assert_eq!(image.get_pixel(0, 0, 0)?, &30);
        assert_eq!(image.get_pixel(0, 0, 1)?, &20);
        assert_eq!(image.get_pixel(0, 0, 2)?, &10);

        Ok(())
    }

    #[test]
    fn test_decode_encode_roundtrip() -> Result<(), IoError> {
        for (width, height) in [(4, 3), (5, 2), (7, 7), (1, 1)] {
            let bytes = synthetic_bmp(width, height)?;
            let (header, image) = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default())?;
            assert_eq!(image.size(), ImageSize { width: padded_width(width), height });

            let mut out = vec![];
            encode_bmp_rgb8(&mut out, &header, &image)?;
            assert_eq!(out, bytes);
        }

        Ok(())
    }

    #[test]
    fn test_decode_keeps_extra_header_bytes() -> Result<(), IoError> {
        let mut header = BmpHeader::new_rgb24(ImageSize {
            width: 4,
            height: 2,
        })?;
        header.file.bf_off_bits += 4;
        header.extra = vec![1, 2, 3, 4];

        let mut bytes = vec![];
        header.write_to(&mut bytes)?;
        bytes.extend(std::iter::repeat(9u8).take(header.pixel_data_len()));

        let (parsed, image) = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default())?;
        assert_eq!(parsed.extra, vec![1, 2, 3, 4]);
        assert!(image.as_slice().iter().all(|&v| v == 9));

        let mut out = vec![];
        encode_bmp_rgb8(&mut out, &parsed, &image)?;
        assert_eq!(out, bytes);

        Ok(())
    }

    #[test]
    fn test_decode_top_down() -> Result<(), IoError> {
        let mut header = BmpHeader::new_rgb24(ImageSize {
            width: 4,
            height: 3,
        })?;
        header.info.bi_height = -3;
        let mut bytes = vec![];
        header.write_to(&mut bytes)?;
        bytes.extend(std::iter::repeat(0u8).take(header.pixel_data_len()));

        let (parsed, image) = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default())?;
        assert!(parsed.is_top_down());
        assert_eq!(image.size(), ImageSize { width: 4, height: 3 });

        Ok(())
    }

    #[test]
    fn test_encode_mono8_replicates_value() -> Result<(), IoError> {
        let header = BmpHeader::new_rgb24(ImageSize {
            width: 4,
            height: 1,
        })?;
        let image = Image::<u8, 1>::new(header.grid_size(), vec![0, 255, 0, 7])?;

        let mut out = vec![];
        encode_bmp_mono8(&mut out, &header, &image)?;
        assert_eq!(out.len(), 54 + 12);
        assert_eq!(&out[54..], &[0, 0, 0, 255, 255, 255, 0, 0, 0, 7, 7, 7]);

        Ok(())
    }

    #[test]
    fn test_encode_rejects_wrong_grid() -> Result<(), IoError> {
        let header = BmpHeader::new_rgb24(ImageSize {
            width: 5,
            height: 1,
        })?;
        let image = Image::<u8, 1>::from_size_val([5, 1].into(), 0)?;

        let res = encode_bmp_mono8(Vec::<u8>::new(), &header, &image);
        assert!(matches!(
            res,
            Err(IoError::ImageCreationError(ImageError::InvalidImageSize(5, 1, 8, 1)))
        ));

        Ok(())
    }

    #[test]
    fn test_decode_truncated_payload() -> Result<(), IoError> {
        let mut bytes = synthetic_bmp(4, 2)?;
        bytes.truncate(bytes.len() - 5);

        let res = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default());
        assert!(matches!(
            res,
            Err(IoError::TruncatedInput {
                expected: 78,
                actual: 73
            })
        ));

        Ok(())
    }

    #[test]
    fn test_decode_truncated_header() {
        let bytes = [b'B', b'M', 0, 0];
        let res = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default());
        assert!(matches!(
            res,
            Err(IoError::TruncatedInput {
                expected: 14,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_decode_unsupported_formats() -> Result<(), IoError> {
        let base = BmpHeader::new_rgb24(ImageSize {
            width: 4,
            height: 4,
        })?;

        let mut bad_signature = base.clone();
        bad_signature.file.bf_type = u16::from_le_bytes(*b"BA");

        let mut bad_depth = base.clone();
        bad_depth.info.bi_bit_count = 32;

        let mut compressed = base.clone();
        compressed.info.bi_compression = 1;

        let mut negative_width = base.clone();
        negative_width.info.bi_width = -4;

        let mut core_header = base.clone();
        core_header.info.bi_size = 12;

        for header in [bad_signature, bad_depth, compressed, negative_width, core_header] {
            let mut bytes = vec![];
            header.write_to(&mut bytes)?;
            bytes.extend(std::iter::repeat(0u8).take(base.pixel_data_len()));

            let res = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default());
            assert!(matches!(res, Err(IoError::UnsupportedFormat(_))));
        }

        Ok(())
    }

    #[test]
    fn test_decode_foreign_signature_before_gap() -> Result<(), IoError> {
        // a png file header followed by its IHDR chunk
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        png.extend([0, 0, 0, 13]);
        png.extend(b"IHDR");
        png.extend([0, 0, 2, 0, 0, 0, 1, 0, 8, 2, 0, 0, 0]);
        png.resize(64, 0);

        let res = decode_bmp_rgb8(png.as_slice(), &BmpDecodeOptions::default());
        assert!(matches!(res, Err(IoError::UnsupportedFormat(_))));

        // the pixel data offset is not trusted before the signature is checked
        let mut header = BmpHeader::new_rgb24(ImageSize {
            width: 4,
            height: 4,
        })?;
        header.file.bf_type = u16::from_le_bytes(*b"XY");
        header.file.bf_off_bits = u32::MAX;
        let mut bytes = vec![];
        header.write_to(&mut bytes)?;

        let res = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default());
        assert!(matches!(res, Err(IoError::UnsupportedFormat(_))));

        Ok(())
    }

    #[test]
    fn test_decode_keeps_trailing_bytes() -> Result<(), IoError> {
        let mut bytes = synthetic_bmp(5, 3)?;
        bytes.extend([0, 0]);

        let (header, image) = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default())?;
        assert_eq!(header.trailer, vec![0, 0]);

        let mut out = vec![];
        encode_bmp_rgb8(&mut out, &header, &image)?;
        assert_eq!(out, bytes);

        let edges = Image::<u8, 1>::from_size_val(header.grid_size(), 255)?;
        let mut out = vec![];
        encode_bmp_mono8(&mut out, &header, &edges)?;
        assert_eq!(out.len(), bytes.len());
        assert_eq!(&out[out.len() - 2..], &[0, 0]);

        Ok(())
    }

    #[test]
    fn test_decode_dimension_limit() -> Result<(), IoError> {
        let header = BmpHeader::new_rgb24(ImageSize {
            width: 2049,
            height: 1,
        })?;
        let mut bytes = vec![];
        header.write_to(&mut bytes)?;

        let res = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions::default());
        assert!(matches!(
            res,
            Err(IoError::DimensionLimit {
                width: 2049,
                height: 1,
                max: 2048
            })
        ));

        let header = BmpHeader::new_rgb24(ImageSize {
            width: 4,
            height: 9,
        })?;
        let mut bytes = vec![];
        header.write_to(&mut bytes)?;
        let res = decode_bmp_rgb8(bytes.as_slice(), &BmpDecodeOptions { max_dimension: 8 });
        assert!(matches!(res, Err(IoError::DimensionLimit { .. })));

        Ok(())
    }

    #[test]
    fn test_read_write_bmp_file() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let file_path = tmp_dir.path().join("synthetic.bmp");
        let bytes = synthetic_bmp(6, 3)?;
        fs::write(&file_path, &bytes)?;

        let (header, image) = read_image_bmp_rgb8(&file_path, &BmpDecodeOptions::default())?;
        assert_eq!(image.cols(), 8);
        assert_eq!(image.rows(), 3);

        let out_path = tmp_dir.path().join("copy.bmp");
        write_image_bmp_rgb8(&out_path, &header, &image)?;
        assert!(out_path.exists(), "File does not exist: {:?}", out_path);
        assert_eq!(fs::read(&out_path)?, bytes);

        Ok(())
    }

    #[test]
    fn test_read_missing_or_misnamed_file() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;

        let missing = tmp_dir.path().join("missing.bmp");
        assert!(matches!(
            read_image_bmp_rgb8(&missing, &BmpDecodeOptions::default()),
            Err(IoError::FileDoesNotExist(_))
        ));

        let misnamed = tmp_dir.path().join("image.png");
        fs::write(&misnamed, synthetic_bmp(4, 1)?)?;
        assert!(matches!(
            read_image_bmp_rgb8(&misnamed, &BmpDecodeOptions::default()),
            Err(IoError::InvalidFileExtension(_))
        ));

        Ok(())
    }
}
