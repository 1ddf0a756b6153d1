
//! Two cores of a multimedia storage stack: a pixel format conversion
//! engine that turns raster data between packed layouts at full speed,
//! and a streaming dispatcher that drives several compression libraries
//! through one bounded-buffer protocol.

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    trivial_numeric_casts,
)]

#![forbid(unsafe_code)]


pub mod error;
pub mod io;
pub mod pixels;
pub mod compression;

/// Re-exports of the types commonly needed to convert pixels or run
/// a compression stream.
pub mod prelude {
    // main exports
    pub use crate::pixels::{
        convert_bitmap, convert_pixels, row_converter,
        BitmapView, BitmapViewMut, Channel, PixelFormat,
    };

    pub use crate::compression::{
        CompressionAlgorithm, CompressionProvider, Compressor, Decompressor,
        ProcessStatus, StopReason,
    };

    // secondary data types
    pub use crate::pixels;
    pub use crate::compression;
    pub use crate::error;

    // re-export external stuff
    pub use half::f16;

    pub use crate::error::{Error, Result};
}
