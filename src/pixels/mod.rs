
//! The pixel format conversion engine: a closed set of pixel layouts and
//! specialized conversion paths between every pair of them.
//!
//! The submodules form a small tower: bit primitives at the bottom, then
//! channel bit-depth adjustment, then the format description table, then
//! per-pixel conversion, and finally row and bitmap conversion on top.

pub mod bits;
pub mod adjust;
pub mod describe;
pub mod samples;
pub mod query;
pub mod converter;

mod convert;

pub use self::describe::{
    ChannelDescription, EndianFlipOperation, FormatDescription, PixelDataType, PixelFormat,
};
pub use self::query::Channel;
pub use self::converter::{convert_bitmap, convert_pixels, row_converter, RowConverter};

use crate::error::{Error, PassiveResult};


/// A borrowed view into the pixel storage of a bitmap. The storage is
/// owned elsewhere; this engine only ever reads through views.
///
/// `stride` is the distance in bytes between the starts of two
/// consecutive rows and may exceed `width * bytes_per_pixel` when rows
/// are padded.
#[derive(Debug, Clone, Copy)]
pub struct BitmapView<'p> {

    /// The raw pixel bytes, row after row.
    pub pixels: &'p [u8],

    /// Number of pixels per row.
    pub width: usize,

    /// Number of rows.
    pub height: usize,

    /// Bytes between the starts of consecutive rows.
    pub stride: usize,

    /// Layout of the stored pixels.
    pub format: PixelFormat,
}

/// A mutable borrowed view into the pixel storage of a bitmap.
#[derive(Debug)]
pub struct BitmapViewMut<'p> {

    /// The raw pixel bytes, row after row.
    pub pixels: &'p mut [u8],

    /// Number of pixels per row.
    pub width: usize,

    /// Number of rows.
    pub height: usize,

    /// Bytes between the starts of consecutive rows.
    pub stride: usize,

    /// Layout of the stored pixels.
    pub format: PixelFormat,
}


fn validate_geometry(
    byte_count: usize, width: usize, height: usize, stride: usize, format: PixelFormat,
) -> PassiveResult {
    let row_bytes = width * format.bytes_per_pixel();

    let storage_fits = stride >= row_bytes && (
        height == 0 || byte_count >= stride * (height - 1) + row_bytes
    );

    if storage_fits { Ok(()) }
    else {
        Err(Error::invalid_argument(
            "bitmap storage is smaller than its width, height and stride imply"
        ))
    }
}

impl BitmapView<'_> {

    /// Checks that the storage is large enough for the claimed geometry.
    pub fn validate(&self) -> PassiveResult {
        validate_geometry(self.pixels.len(), self.width, self.height, self.stride, self.format)
    }
}

impl BitmapViewMut<'_> {

    /// Checks that the storage is large enough for the claimed geometry.
    pub fn validate(&self) -> PassiveResult {
        validate_geometry(self.pixels.len(), self.width, self.height, self.stride, self.format)
    }
}
