
//! Converts a single pixel between any two supported formats.
//!
//! The entry point is generic over the two format discriminants, so every
//! format pair monomorphizes into straight-line code: the description
//! lookups are const-indexed, the channel loops unroll, and the branch on
//! the data type pair folds away. Four strategies cover the data type
//! matrix; integer channel math runs in a `u64` accumulator, which is
//! wide enough for every integer format in the closed set (the only
//! 128 bit format has float channels and never takes the integer path).

use half::f16;

use crate::pixels::adjust::{adjust_signed, adjust_unsigned, decode_signed, encode_signed};
use crate::pixels::bits::{flip_lanes_u64, mask_u64};
use crate::pixels::describe::{
    description_by_index, ChannelDescription, EndianFlipOperation,
    FormatDescription, PixelDataType,
};
use crate::pixels::samples::{
    denormalize_signed, denormalize_unsigned, normalize_signed, normalize_unsigned,
};

/// Channel slot that holds alpha. Missing alpha defaults to full
/// opacity; all other missing channels default to zero.
const ALPHA_SLOT: usize = 3;


/// Converts the first pixel of `source` into the first pixel of `target`.
/// Slices must hold at least one pixel of the respective format.
#[inline]
pub(crate) fn convert_pixel<const SOURCE: usize, const TARGET: usize>(
    source: &[u8], target: &mut [u8]
) {
    let source_description = description_by_index::<SOURCE>();
    let target_description = description_by_index::<TARGET>();

    // identical formats copy the pixel bytes directly
    if SOURCE == TARGET {
        let byte_count = source_description.bytes_per_pixel();
        target[..byte_count].copy_from_slice(&source[..byte_count]);
        return;
    }

    use self::PixelDataType::FloatingPoint;
    match (source_description.data_type, target_description.data_type) {
        (FloatingPoint, FloatingPoint) => float_to_float(source_description, target_description, source, target),
        (FloatingPoint, _) => float_to_int(source_description, target_description, source, target),
        (_, FloatingPoint) => int_to_float(source_description, target_description, source, target),
        (_, _) => int_to_int(source_description, target_description, source, target),
    }
}


/// Integer channels to integer channels: extract, adjust the bit depth,
/// reposition, and composite with bitwise or.
#[inline]
fn int_to_int(
    source_description: &FormatDescription, target_description: &FormatDescription,
    source: &[u8], target: &mut [u8],
) {
    let word = load_pixel_word(source, source_description);
    let mut composited = 0_u64;

    for slot in 0 .. 4 {
        match (source_description.channel(slot), target_description.channel(slot)) {
            (Some(from), Some(to)) => {
                let channel = (word >> from.lowest_bit) & mask_u64(0, from.bit_count);

                let adjusted = adjust_channel(
                    channel, from.bit_count, to.bit_count,
                    source_description.data_type, target_description.data_type,
                );

                composited |= (adjusted << to.lowest_bit) & mask_u64(to.lowest_bit, to.bit_count);
            },

            (None, Some(to)) if slot == ALPHA_SLOT => {
                composited |= opaque_alpha(to, target_description.data_type);
            },

            _ => {},
        }
    }

    store_pixel_word(target, target_description, composited);
}

/// Adjusts one integer channel's bit depth, honoring the signedness on
/// both sides. A signedness change re-quantizes through the normalized
/// intensity instead of shifting bits.
#[inline]
fn adjust_channel(
    channel: u64, from_bits: u32, to_bits: u32,
    source_type: PixelDataType, target_type: PixelDataType,
) -> u64 {
    use self::PixelDataType::SignedInteger;

    match (source_type == SignedInteger, target_type == SignedInteger) {
        (false, false) => adjust_unsigned(channel, from_bits, to_bits),
        (true, true) => adjust_signed(channel, from_bits, to_bits),

        (true, false) => denormalize_unsigned(
            normalize_signed(decode_signed(channel, from_bits), from_bits), to_bits
        ),

        (false, true) => encode_signed(
            denormalize_signed(normalize_unsigned(channel, from_bits), to_bits), to_bits
        ),
    }
}

/// Integer channels to float channels: normalize each channel intensity
/// and store it in the target channel's float width.
#[inline]
fn int_to_float(
    source_description: &FormatDescription, target_description: &FormatDescription,
    source: &[u8], target: &mut [u8],
) {
    let word = load_pixel_word(source, source_description);

    for slot in 0 .. 4 {
        if let Some(to) = target_description.channel(slot) {
            let intensity = match source_description.channel(slot) {
                Some(from) => {
                    let channel = (word >> from.lowest_bit) & mask_u64(0, from.bit_count);

                    if source_description.data_type == PixelDataType::SignedInteger {
                        normalize_signed(decode_signed(channel, from.bit_count), from.bit_count)
                    } else {
                        normalize_unsigned(channel, from.bit_count)
                    }
                },

                None => default_intensity(slot),
            };

            write_float_lane(target, to, intensity);
        }
    }
}

/// Float channels to integer channels: clamp the normalized intensity,
/// scale to full range and round ties to even.
#[inline]
fn float_to_int(
    source_description: &FormatDescription, target_description: &FormatDescription,
    source: &[u8], target: &mut [u8],
) {
    let mut composited = 0_u64;

    for slot in 0 .. 4 {
        if let Some(to) = target_description.channel(slot) {
            let intensity = match source_description.channel(slot) {
                Some(from) => read_float_lane(source, from),
                None => default_intensity(slot),
            };

            let quantized = if target_description.data_type == PixelDataType::SignedInteger {
                encode_signed(denormalize_signed(intensity, to.bit_count), to.bit_count)
            } else {
                denormalize_unsigned(intensity, to.bit_count)
            };

            composited |= (quantized << to.lowest_bit) & mask_u64(to.lowest_bit, to.bit_count);
        }
    }

    store_pixel_word(target, target_description, composited);
}

/// Float channels to float channels: plain IEEE 754 width conversion.
#[inline]
fn float_to_float(
    source_description: &FormatDescription, target_description: &FormatDescription,
    source: &[u8], target: &mut [u8],
) {
    for slot in 0 .. 4 {
        if let Some(to) = target_description.channel(slot) {
            let intensity = match source_description.channel(slot) {
                Some(from) => read_float_lane(source, from),
                None => default_intensity(slot),
            };

            write_float_lane(target, to, intensity);
        }
    }
}


/// Default for a channel the source does not have.
#[inline]
fn default_intensity(slot: usize) -> f64 {
    if slot == ALPHA_SLOT { 1.0 } else { 0.0 }
}

/// Full opacity in the target alpha channel's integer encoding,
/// already positioned at the channel's bit offset.
#[inline]
fn opaque_alpha(channel: ChannelDescription, data_type: PixelDataType) -> u64 {
    let full_scale = if data_type == PixelDataType::SignedInteger {
        encode_signed((1_i64 << (channel.bit_count - 1)) - 1, channel.bit_count)
    } else {
        mask_u64(0, channel.bit_count)
    };

    full_scale << channel.lowest_bit
}


/// Assembles the pixel word from memory bytes in little-endian order and
/// applies the format's endian flip so the description's bit positions hold.
#[inline]
fn load_pixel_word(source: &[u8], description: &FormatDescription) -> u64 {
    let byte_count = description.bytes_per_pixel();
    debug_assert!(byte_count <= 8, "integer pixel fits the accumulator");

    let mut word = 0_u64;
    for (index, &byte) in source[.. byte_count].iter().enumerate() {
        word |= (byte as u64) << (index * 8);
    }

    apply_flip(word, description)
}

/// Applies the format's endian flip to the word and writes it back to
/// memory in little-endian order.
#[inline]
fn store_pixel_word(target: &mut [u8], description: &FormatDescription, word: u64) {
    let word = apply_flip(word, description);

    let byte_count = description.bytes_per_pixel();
    for (index, byte) in target[.. byte_count].iter_mut().enumerate() {
        *byte = (word >> (index * 8)) as u8;
    }
}

/// Byte reordering is an involution, so loading and storing share this.
#[inline]
fn apply_flip(word: u64, description: &FormatDescription) -> u64 {
    match description.endian_flip {
        EndianFlipOperation::None => word,

        EndianFlipOperation::FlipWholePixel =>
            word.swap_bytes() >> (64 - description.bits_per_pixel),

        EndianFlipOperation::FlipEachChannel =>
            flip_lanes_u64(word, lane_width(description), description.bits_per_pixel),
    }
}

/// Unit width of a multi-lane native format; all its channels share it.
#[inline]
fn lane_width(description: &FormatDescription) -> u32 {
    description.channels.iter().flatten().next()
        .map(|channel| channel.bit_count)
        .unwrap_or(8)
}


/// Reads one float channel. Float formats store each channel as a
/// native-endian unit at a byte-aligned offset.
#[inline]
fn read_float_lane(source: &[u8], channel: ChannelDescription) -> f64 {
    let offset = (channel.lowest_bit / 8) as usize;

    match channel.bit_count {
        16 => {
            let mut bytes = [0_u8; 2];
            bytes.copy_from_slice(&source[offset .. offset + 2]);
            f16::from_ne_bytes(bytes).to_f64()
        },

        32 => {
            let mut bytes = [0_u8; 4];
            bytes.copy_from_slice(&source[offset .. offset + 4]);
            f32::from_ne_bytes(bytes) as f64
        },

        _ => {
            let mut bytes = [0_u8; 8];
            bytes.copy_from_slice(&source[offset .. offset + 8]);
            f64::from_ne_bytes(bytes)
        },
    }
}

/// Writes one float channel in the channel's width.
#[inline]
fn write_float_lane(target: &mut [u8], channel: ChannelDescription, intensity: f64) {
    let offset = (channel.lowest_bit / 8) as usize;

    match channel.bit_count {
        16 => target[offset .. offset + 2].copy_from_slice(&f16::from_f64(intensity).to_ne_bytes()),
        32 => target[offset .. offset + 4].copy_from_slice(&(intensity as f32).to_ne_bytes()),
        _ => target[offset .. offset + 8].copy_from_slice(&intensity.to_ne_bytes()),
    }
}
