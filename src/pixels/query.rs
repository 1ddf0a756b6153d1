
//! Runtime inspection of pixel formats.
//!
//! All answers come straight from the format description table, so these
//! are cheap enough to call per decision rather than per pixel.

use crate::pixels::describe::{EndianFlipOperation, PixelDataType, PixelFormat};


/// Selects one color channel of a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {

    /// The red, luminance or x channel.
    Red,

    /// The green, u or y channel.
    Green,

    /// The blue, v or z channel.
    Blue,

    /// The alpha channel.
    Alpha,
}

impl Channel {
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }
}


impl PixelFormat {

    /// Whether the format stores a red (or luminance or x) channel.
    pub fn has_red(self) -> bool { self.bit_count_of(Channel::Red).is_some() }

    /// Whether the format stores a green channel.
    pub fn has_green(self) -> bool { self.bit_count_of(Channel::Green).is_some() }

    /// Whether the format stores a blue channel.
    pub fn has_blue(self) -> bool { self.bit_count_of(Channel::Blue).is_some() }

    /// Whether the format stores an alpha channel.
    pub fn has_alpha(self) -> bool { self.bit_count_of(Channel::Alpha).is_some() }

    /// Whether channel values can be negative.
    /// True for signed integer and floating point formats.
    pub fn is_signed_format(self) -> bool {
        match self.describe().data_type {
            PixelDataType::SignedInteger | PixelDataType::FloatingPoint => true,
            PixelDataType::UnsignedInteger => false,
        }
    }

    /// Whether channels store floating point values.
    pub fn is_float_format(self) -> bool {
        self.describe().data_type == PixelDataType::FloatingPoint
    }

    /// Whether any two channels of the format have different widths.
    pub fn has_differently_sized_channels(self) -> bool {
        let mut widths = self.describe().channels.iter().flatten()
            .map(|channel| channel.bit_count);

        match widths.next() {
            Some(first) => widths.any(|width| width != first),
            None => false,
        }
    }

    /// Whether every channel starts and ends on a byte boundary.
    pub fn are_all_channels_byte_aligned(self) -> bool {
        self.describe().channels.iter().flatten().all(|channel|
            channel.lowest_bit % 8 == 0 && channel.bit_count % 8 == 0
        )
    }

    /// Whether reading this format on the current host involves
    /// byte reordering.
    pub fn requires_endian_flip(self) -> bool {
        self.describe().endian_flip != EndianFlipOperation::None
    }

    /// Index of the first bit of the given channel,
    /// or none if the format does not store that channel.
    pub fn lowest_bit_index_of(self, channel: Channel) -> Option<u32> {
        self.describe().channel(channel.slot()).map(|channel| channel.lowest_bit)
    }

    /// Width of the given channel in bits,
    /// or none if the format does not store that channel.
    pub fn bit_count_of(self, channel: Channel) -> Option<u32> {
        self.describe().channel(channel.slot()).map(|channel| channel.bit_count)
    }

    /// Width of the widest channel in the format.
    pub fn widest_channel_bit_count(self) -> u32 {
        self.describe().channels.iter().flatten()
            .map(|channel| channel.bit_count)
            .max().unwrap_or(0)
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn channel_presence(){
        assert!(PixelFormat::R8Unsigned.has_red());
        assert!(!PixelFormat::R8Unsigned.has_alpha());
        assert!(!PixelFormat::A8Unsigned.has_red());
        assert!(PixelFormat::A8Unsigned.has_alpha());

        assert!(PixelFormat::R5G6B5UnsignedNative16.has_blue());
        assert!(!PixelFormat::R5G6B5UnsignedNative16.has_alpha());

        let rgba = PixelFormat::R8G8B8A8Unsigned;
        assert!(rgba.has_red() && rgba.has_green() && rgba.has_blue() && rgba.has_alpha());
    }

    #[test]
    fn signedness_and_floatness(){
        assert!(!PixelFormat::R8Unsigned.is_signed_format());
        assert!(PixelFormat::R16FloatNative16.is_signed_format());
        assert!(PixelFormat::R16FloatNative16.is_float_format());
        assert!(!PixelFormat::R16UnsignedNative16.is_float_format());
    }

    #[test]
    fn channel_size_uniformity(){
        assert!(PixelFormat::R5G6B5UnsignedNative16.has_differently_sized_channels());
        assert!(PixelFormat::A2B10G10R10UnsignedNative32.has_differently_sized_channels());
        assert!(!PixelFormat::R8G8B8A8Unsigned.has_differently_sized_channels());
        assert!(!PixelFormat::R8Unsigned.has_differently_sized_channels());
    }

    #[test]
    fn byte_alignment(){
        assert!(PixelFormat::R8G8B8Unsigned.are_all_channels_byte_aligned());
        assert!(PixelFormat::R16G16B16A16UnsignedNative16.are_all_channels_byte_aligned());
        assert!(!PixelFormat::R5G6B5UnsignedNative16.are_all_channels_byte_aligned());
        assert!(!PixelFormat::A2R10G10B10UnsignedNative32.are_all_channels_byte_aligned());
    }

    #[test]
    fn channel_positions(){
        assert_eq!(PixelFormat::R5G6B5UnsignedNative16.lowest_bit_index_of(Channel::Red), Some(11));
        assert_eq!(PixelFormat::R5G6B5UnsignedNative16.bit_count_of(Channel::Green), Some(6));
        assert_eq!(PixelFormat::R5G6B5UnsignedNative16.bit_count_of(Channel::Alpha), None);
        assert_eq!(PixelFormat::A16R16G16B16FloatNative16.lowest_bit_index_of(Channel::Alpha), Some(0));
    }

    #[test]
    fn widest_channel(){
        assert_eq!(PixelFormat::R5G6B5UnsignedNative16.widest_channel_bit_count(), 6);
        assert_eq!(PixelFormat::A2B10G10R10UnsignedNative32.widest_channel_bit_count(), 10);
        assert_eq!(PixelFormat::R32G32B32A32FloatNative32.widest_channel_bit_count(), 32);
        assert_eq!(PixelFormat::R8Unsigned.widest_channel_bit_count(), 8);
    }

    #[test]
    fn flip_requirement_matches_host(){
        if cfg!(target_endian = "little") {
            assert!(!PixelFormat::R5G6B5UnsignedNative16.requires_endian_flip());
            assert!(!PixelFormat::R8G8B8Unsigned.requires_endian_flip());
        } else {
            assert!(PixelFormat::R5G6B5UnsignedNative16.requires_endian_flip());
            assert!(!PixelFormat::R8G8B8Unsigned.requires_endian_flip());
        }
    }
}
