
//! Converts whole rows and bitmaps between pixel formats.
//!
//! The runtime source and target formats are resolved to a monomorphized
//! row function exactly once, by a double dispatch over the format table;
//! the returned plain function pointer then runs the inner pixel loop
//! without any per-pixel branching.

use crate::error::{Error, PassiveResult};
use crate::pixels::convert::convert_pixel;
use crate::pixels::describe::{description_by_index, pixel_format_table, PixelFormat};
use crate::pixels::{BitmapView, BitmapViewMut};


/// Converts `pixel_count` pixels from the source row into the target row.
/// Rows must hold at least that many pixels of their respective formats;
/// use [`convert_pixels`] for a bounds-checked entry point.
pub type RowConverter = fn(&[u8], &mut [u8], usize);


fn convert_row<const SOURCE: usize, const TARGET: usize>(
    source: &[u8], target: &mut [u8], pixel_count: usize
) {
    let source_step = description_by_index::<SOURCE>().bytes_per_pixel();
    let target_step = description_by_index::<TARGET>().bytes_per_pixel();

    let mut source_offset = 0;
    let mut target_offset = 0;

    for _ in 0 .. pixel_count {
        convert_pixel::<SOURCE, TARGET>(&source[source_offset ..], &mut target[target_offset ..]);
        source_offset += source_step;
        target_offset += target_step;
    }
}

macro_rules! dispatch_target_format {
    ($( $name:ident = $id:literal, $data_type:ident, $bits:literal, $class:ident,
        $red:tt, $green:tt, $blue:tt, $alpha:tt );* $(;)?) => {

        /// Second half of the double dispatch, with the source format
        /// already fixed at compile time.
        fn row_converter_into<const SOURCE: usize>(target: PixelFormat) -> RowConverter {
            match target {
                $( PixelFormat::$name => convert_row::<SOURCE, $id>, )*
            }
        }
    };
}

pixel_format_table!(dispatch_target_format);

macro_rules! dispatch_source_format {
    ($( $name:ident = $id:literal, $data_type:ident, $bits:literal, $class:ident,
        $red:tt, $green:tt, $blue:tt, $alpha:tt );* $(;)?) => {

        /// Resolves the runtime format pair to a monomorphized row
        /// conversion function.
        pub fn row_converter(source: PixelFormat, target: PixelFormat) -> RowConverter {
            match source {
                $( PixelFormat::$name => row_converter_into::<$id>(target), )*
            }
        }
    };
}

pixel_format_table!(dispatch_source_format);


/// Converts a run of pixels between two formats, validating that both
/// slices actually hold `pixel_count` pixels.
pub fn convert_pixels(
    source_format: PixelFormat, source: &[u8],
    target_format: PixelFormat, target: &mut [u8],
    pixel_count: usize,
) -> PassiveResult {
    let required_source = pixel_count * source_format.bytes_per_pixel();
    let required_target = pixel_count * target_format.bytes_per_pixel();

    if source.len() < required_source || target.len() < required_target {
        return Err(Error::invalid_argument(format!(
            "pixel buffers too small for {} pixels", pixel_count
        )));
    }

    row_converter(source_format, target_format)(source, target, pixel_count);
    Ok(())
}

/// Converts a whole bitmap into another bitmap of the same dimensions,
/// respecting the stride of both sides (rows may be padded beyond
/// `width * bytes_per_pixel`).
pub fn convert_bitmap(source: &BitmapView<'_>, target: &mut BitmapViewMut<'_>) -> PassiveResult {
    if source.width != target.width || source.height != target.height {
        return Err(Error::MismatchedDimensions);
    }

    source.validate()?;
    target.validate()?;

    let convert = row_converter(source.format, target.format);

    let mut source_row_start = 0;
    let mut target_row_start = 0;

    for _ in 0 .. source.height {
        convert(
            &source.pixels[source_row_start ..],
            &mut target.pixels[target_row_start ..],
            source.width,
        );

        source_row_start += source.stride;
        target_row_start += target.stride;
    }

    Ok(())
}
