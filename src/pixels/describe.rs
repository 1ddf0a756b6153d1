
//! The closed set of supported pixel formats and the compile-time
//! description record for each of them.
//!
//! Descriptions state where each color channel lives inside a pixel word.
//! The word is always assembled from memory bytes in little-endian order,
//! so the bit positions below are valid on every host; formats that store
//! native-endian units additionally carry an endian flip mode which only
//! becomes active on big-endian targets.
//!
//! Everything is generated from one declarative table. The same table
//! drives the enum, the description array, and the runtime dispatch that
//! selects monomorphized conversion code, so adding a format is a
//! single-line change.

use crate::error::{Error, Result};


/// Data type stored in a pixel format's color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelDataType {

    /// Channels are stored as unsigned integers.
    UnsignedInteger,

    /// Channels are stored as symmetric signed integers.
    /// To have identical quantization for positive and negative values,
    /// an n bit channel ranges from `-(2^(n-1) - 1)` to `2^(n-1) - 1`;
    /// the surplus most-negative pattern decodes to the closest valid value.
    SignedInteger,

    /// Channels are stored as IEEE 754 floating point values,
    /// half or single precision depending on the channel's bit count.
    FloatingPoint,
}

/// What kind of byte reordering a format needs on the current host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndianFlipOperation {

    /// No reordering is required on the current platform.
    None,

    /// Each native-endian channel unit is byte-reversed individually.
    /// Used by formats packing multiple `_Native16` units into one pixel.
    FlipEachChannel,

    /// The whole pixel is byte-reversed as one unit.
    /// Used by formats stored as a single native-endian integer.
    FlipWholePixel,
}

/// Where one color channel lives within the pixel word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDescription {

    /// Index of the first bit occupied by the channel.
    pub lowest_bit: u32,

    /// Number of bits the channel is wide.
    pub bit_count: u32,
}

/// Describes one pixel format: data type, pixel width,
/// and up to four channels in the fixed slot order R, G, B, A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescription {

    /// Whether channels hold unsigned integers, signed integers or floats.
    pub data_type: PixelDataType,

    /// Width of one whole pixel, including padding bits.
    pub bits_per_pixel: u32,

    /// Channel slots in the order red, green, blue, alpha.
    /// Luminance and vector formats use the same slots (Y/U/V, X/Y/Z/W).
    pub channels: [Option<ChannelDescription>; 4],

    /// Byte reordering needed to interpret the pixel on this host.
    pub endian_flip: EndianFlipOperation,
}

impl FormatDescription {

    /// Width of one whole pixel in bytes.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// The channel in the given slot (0 red, 1 green, 2 blue, 3 alpha).
    #[inline]
    pub const fn channel(&self, slot: usize) -> Option<ChannelDescription> {
        self.channels[slot]
    }
}


/// How a format relates to host byte order:
/// `array` formats define a fixed memory byte order, `native_word`
/// formats store the pixel as one native-endian integer, and
/// `native_lanes` formats store several native-endian units per pixel.
#[derive(Clone, Copy)]
enum ByteOrderClass { Array, NativeWord, NativeLanes }

const fn flip_for(class: ByteOrderClass) -> EndianFlipOperation {
    if cfg!(target_endian = "little") {
        EndianFlipOperation::None
    } else {
        match class {
            ByteOrderClass::Array => EndianFlipOperation::None,
            ByteOrderClass::NativeWord => EndianFlipOperation::FlipWholePixel,
            ByteOrderClass::NativeLanes => EndianFlipOperation::FlipEachChannel,
        }
    }
}


/// The single declarative table every format-indexed structure
/// is generated from. Invokes the given macro with one row per format:
/// `Name = discriminant, data type, bits per pixel, byte order class,
/// then the four channel slots (`_` for absent, `(lowest_bit, bit_count)`
/// for present) in the order red, green, blue, alpha`.
macro_rules! pixel_format_table {
    ($apply:ident) => {
        $apply! {
            R8Unsigned                   =  0, UnsignedInteger,   8, Array,       ( 0,  8), _,        _,        _;
            A8Unsigned                   =  1, UnsignedInteger,   8, Array,       _,        _,        _,        ( 0,  8);
            R8G8Unsigned                 =  2, UnsignedInteger,  16, Array,       ( 0,  8), ( 8,  8), _,        _;
            R8A8Unsigned                 =  3, UnsignedInteger,  16, Array,       ( 0,  8), _,        _,        ( 8,  8);
            R5G6B5UnsignedNative16       =  4, UnsignedInteger,  16, NativeWord,  (11,  5), ( 5,  6), ( 0,  5), _;
            B5G6R5UnsignedNative16       =  5, UnsignedInteger,  16, NativeWord,  ( 0,  5), ( 5,  6), (11,  5), _;
            R8G8B8Unsigned               =  6, UnsignedInteger,  24, Array,       ( 0,  8), ( 8,  8), (16,  8), _;
            B8G8R8Unsigned               =  7, UnsignedInteger,  24, Array,       (16,  8), ( 8,  8), ( 0,  8), _;
            R8G8B8A8Unsigned             =  8, UnsignedInteger,  32, Array,       ( 0,  8), ( 8,  8), (16,  8), (24,  8);
            R16UnsignedNative16          =  9, UnsignedInteger,  16, NativeWord,  ( 0, 16), _,        _,        _;
            A16UnsignedNative16          = 10, UnsignedInteger,  16, NativeWord,  _,        _,        _,        ( 0, 16);
            R16G16UnsignedNative16       = 11, UnsignedInteger,  32, NativeLanes, ( 0, 16), (16, 16), _,        _;
            R16A16UnsignedNative16       = 12, UnsignedInteger,  32, NativeLanes, ( 0, 16), _,        _,        (16, 16);
            R16G16B16A16UnsignedNative16 = 13, UnsignedInteger,  64, NativeLanes, ( 0, 16), (16, 16), (32, 16), (48, 16);
            R16FloatNative16             = 14, FloatingPoint,   16, NativeWord,  ( 0, 16), _,        _,        _;
            A16FloatNative16             = 15, FloatingPoint,   16, NativeWord,  _,        _,        _,        ( 0, 16);
            R16G16FloatNative16          = 16, FloatingPoint,   32, NativeLanes, ( 0, 16), (16, 16), _,        _;
            A16R16G16B16FloatNative16    = 17, FloatingPoint,   64, NativeLanes, (16, 16), (32, 16), (48, 16), ( 0, 16);
            R32FloatNative32             = 18, FloatingPoint,   32, NativeWord,  ( 0, 32), _,        _,        _;
            A32FloatNative32             = 19, FloatingPoint,   32, NativeWord,  _,        _,        _,        ( 0, 32);
            R32G32B32A32FloatNative32    = 20, FloatingPoint,  128, NativeLanes, ( 0, 32), (32, 32), (64, 32), (96, 32);
            A2B10G10R10UnsignedNative32  = 21, UnsignedInteger,  32, NativeWord,  ( 0, 10), (10, 10), (20, 10), (30,  2);
            A2R10G10B10UnsignedNative32  = 22, UnsignedInteger,  32, NativeWord,  (20, 10), (10, 10), ( 0, 10), (30,  2);
        }
    };
}

pub(crate) use pixel_format_table;

macro_rules! channel_slot {
    (_) => { None };
    (($lowest:expr, $count:expr)) => {
        Some(ChannelDescription { lowest_bit: $lowest, bit_count: $count })
    };
}

macro_rules! declare_pixel_formats {
    ($( $name:ident = $id:literal, $data_type:ident, $bits:literal, $class:ident,
        $red:tt, $green:tt, $blue:tt, $alpha:tt );* $(;)?) => {

        /// One member per supported pixel layout, named by its channels,
        /// their widths, the channel data type, and a byte-order suffix.
        ///
        /// `Native16`/`Native32` mean the packed pixel is stored as a
        /// native-endian integer of that width; formats without the suffix
        /// define their byte order directly in memory.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum PixelFormat {
            $( $name = $id ),*
        }

        /// Description record for every format, indexed by discriminant.
        static FORMAT_DESCRIPTIONS: [FormatDescription; PixelFormat::COUNT] = [
            $(
                FormatDescription {
                    data_type: PixelDataType::$data_type,
                    bits_per_pixel: $bits,
                    channels: [
                        channel_slot!($red), channel_slot!($green),
                        channel_slot!($blue), channel_slot!($alpha),
                    ],
                    endian_flip: flip_for(ByteOrderClass::$class),
                }
            ),*
        ];

        impl PixelFormat {

            /// The number of supported formats.
            pub const COUNT: usize = 0 $( + { let _ = $id; 1 } )*;

            /// Every supported format, in id order.
            pub const ALL: [PixelFormat; PixelFormat::COUNT] = [ $( PixelFormat::$name ),* ];

            /// The format with the given stable id, for example read back
            /// from persisted data or received over a protocol.
            pub fn from_id(id: u32) -> Result<PixelFormat> {
                match id {
                    $( $id => Ok(PixelFormat::$name), )*
                    unknown => Err(Error::UnknownPixelFormat(unknown)),
                }
            }
        }
    };
}

pixel_format_table!(declare_pixel_formats);


impl PixelFormat {

    /// The stable id of this format. Persisted data may store it;
    /// `from_id` converts it back.
    #[inline]
    pub fn id(self) -> u32 { self as u32 }

    /// The compile-time description record of this format.
    #[inline]
    pub fn describe(self) -> &'static FormatDescription {
        &FORMAT_DESCRIPTIONS[self as usize]
    }

    /// Number of bits one pixel occupies, including padding bits.
    #[inline]
    pub fn bits_per_pixel(self) -> u32 { self.describe().bits_per_pixel }

    /// Number of bytes one pixel occupies.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize { self.describe().bytes_per_pixel() }
}

/// Looks up a description by discriminant in const-generic context,
/// so conversion code monomorphized per format pair folds the
/// description into straight-line code.
#[inline(always)]
pub(crate) fn description_by_index<const FORMAT: usize>() -> &'static FormatDescription {
    &FORMAT_DESCRIPTIONS[FORMAT]
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::pixels::bits::mask_u64;

    #[test]
    fn ids_round_trip(){
        for format in PixelFormat::ALL {
            assert_eq!(PixelFormat::from_id(format.id()).unwrap(), format);
        }

        assert!(matches!(
            PixelFormat::from_id(9999),
            Err(crate::error::Error::UnknownPixelFormat(9999))
        ));
    }

    #[test]
    fn channel_ranges_are_disjoint_and_inside_the_pixel(){
        for format in PixelFormat::ALL {
            let description = format.describe();
            let mut occupied = 0_u64;

            for channel in description.channels.iter().flatten() {
                assert!(channel.lowest_bit + channel.bit_count <= description.bits_per_pixel,
                        "{:?} channel exceeds pixel width", format);

                let range = mask_u64(channel.lowest_bit, channel.bit_count);
                assert_eq!(occupied & range, 0, "{:?} has overlapping channels", format);
                occupied |= range;
            }

            assert!(occupied != 0, "{:?} has no channels", format);
        }
    }

    #[test]
    fn pixels_are_whole_bytes(){
        for format in PixelFormat::ALL {
            assert_eq!(format.bits_per_pixel() % 8, 0);
            assert_eq!(format.bytes_per_pixel() * 8, format.bits_per_pixel() as usize);
        }
    }

    #[test]
    fn float_channels_have_ieee_widths(){
        for format in PixelFormat::ALL {
            if format.describe().data_type == PixelDataType::FloatingPoint {
                for channel in format.describe().channels.iter().flatten() {
                    assert!(matches!(channel.bit_count, 16 | 32 | 64),
                            "{:?} has a non-ieee float channel", format);
                }
            }
        }
    }

    #[test]
    fn little_endian_hosts_never_flip(){
        if cfg!(target_endian = "little") {
            for format in PixelFormat::ALL {
                assert_eq!(format.describe().endian_flip, EndianFlipOperation::None);
            }
        }
    }
}
