
//! Zstandard adapter over the `zstd` crate's raw streaming operations.
//!
//! Fills the registry slot of the strongest block-oriented algorithm.
//! The raw encoder and decoder both accept caller-bounded buffer pairs,
//! reporting a remaining-bytes hint that this adapter translates into
//! the common stop reasons.

use zstd::stream::raw::{Decoder, Encoder, Operation, OutBuffer};

use crate::compression::{Compressor, Decompressor, ProcessStatus, StopReason, StreamFailure};
use crate::error::Result;

/// Fastest zstd level.
pub const FASTEST_LEVEL: i32 = 1;

/// The balanced default level.
pub const DEFAULT_LEVEL: i32 = 3;

/// Strongest practical zstd level.
pub const STRONGEST_LEVEL: i32 = 19;


/// Compresses one zstd frame.
pub struct ZstdCompressor {
    encoder: Encoder<'static>,
    failure: StreamFailure,
}

impl ZstdCompressor {

    /// A fresh compressor at the given level (1 fastest to 19 strongest).
    pub fn new(level: i32) -> Result<Self> {
        let encoder = Encoder::new(level).map_err(|error|
            crate::error::Error::compression(
                format!("could not initialize the zstd encoder: {}", error)
            )
        )?;

        Ok(ZstdCompressor { encoder, failure: StreamFailure::default() })
    }
}

impl Compressor for ZstdCompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }
        if input.is_empty() {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        let status = match self.encoder.run_on_buffers(input, output) {
            Ok(status) => status,
            Err(error) => return Err(self.failure.record(
                format!("zstd compression failed: {}", error)
            )),
        };

        let reason = if status.bytes_read < input.len() { StopReason::OutputBufferFull }
                     else { StopReason::InputBufferExhausted };

        Ok(ProcessStatus::new(reason, status.bytes_read, status.bytes_written))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        let mut out_buffer = OutBuffer::around(output);

        let remaining = match self.encoder.finish(&mut out_buffer, true) {
            Ok(remaining) => remaining,
            Err(error) => return Err(self.failure.record(
                format!("zstd compression failed while finishing: {}", error)
            )),
        };

        let written = out_buffer.pos();

        if remaining == 0 {
            Ok(ProcessStatus::new(StopReason::Finished, 0, written))
        } else {
            Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, written))
        }
    }
}


/// Decompresses one zstd frame.
pub struct ZstdDecompressor {
    decoder: Decoder<'static>,
    frame_pending: bool,
    failure: StreamFailure,
}

impl ZstdDecompressor {

    /// A fresh decompressor.
    pub fn new() -> Result<Self> {
        let decoder = Decoder::new().map_err(|error|
            crate::error::Error::compression(
                format!("could not initialize the zstd decoder: {}", error)
            )
        )?;

        Ok(ZstdDecompressor { decoder, frame_pending: false, failure: StreamFailure::default() })
    }
}

impl Decompressor for ZstdDecompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }
        if input.is_empty() {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        let status = match self.decoder.run_on_buffers(input, output) {
            Ok(status) => status,
            Err(error) => return Err(self.failure.record(
                format!("zstd decompression failed on corrupt data: {}", error)
            )),
        };

        // a zero hint means the current frame decoded completely
        self.frame_pending = status.remaining != 0;

        let reason = if status.bytes_read < input.len() { StopReason::OutputBufferFull }
                     else { StopReason::InputBufferExhausted };

        Ok(ProcessStatus::new(reason, status.bytes_read, status.bytes_written))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if !self.frame_pending {
            return Ok(ProcessStatus::new(StopReason::Finished, 0, 0));
        }
        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        // flush whatever the decoder still holds; without new input the
        // hint only reaches zero if the frame was actually complete
        let status = match self.decoder.run_on_buffers(&[], output) {
            Ok(status) => status,
            Err(error) => return Err(self.failure.record(
                format!("zstd decompression failed while finishing: {}", error)
            )),
        };

        if status.remaining == 0 && status.bytes_written < output.len() {
            self.frame_pending = false;
            return Ok(ProcessStatus::new(StopReason::Finished, 0, status.bytes_written));
        }

        if status.bytes_written > 0 {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, status.bytes_written));
        }

        Err(self.failure.record("zstd stream ended before its frame was complete"))
    }
}
