
//! Deflate (RFC 1951) adapter over the streaming half of `miniz_oxide`.
//!
//! Streams are raw deflate without a zlib header or checksum trailer,
//! so the compressed bytes are exactly what the bit format specifies.
//! `miniz_oxide` already speaks the two-sided bounded-buffer protocol,
//! so this adapter only translates status codes and enforces the
//! contract around empty buffers and repeated finishing.

use miniz_oxide::deflate::core::{create_comp_flags_from_zip_params, CompressorOxide};
use miniz_oxide::inflate::stream::InflateState;
use miniz_oxide::{DataFormat, MZFlush, MZStatus, StreamResult};

use crate::compression::{Compressor, Decompressor, ProcessStatus, StopReason, StreamFailure};
use crate::error::Result;

/// Fastest deflate level worth calling compression.
pub const FASTEST_LEVEL: u8 = 1;

/// The balanced default level.
pub const DEFAULT_LEVEL: u8 = 6;

/// Strongest level deflate offers.
pub const STRONGEST_LEVEL: u8 = 9;


/// Compresses one raw deflate stream.
pub struct DeflateCompressor {
    stream: Box<CompressorOxide>,
    finished: bool,
    failure: StreamFailure,
}

impl DeflateCompressor {

    /// A fresh compressor writing a raw deflate stream at the given
    /// level (1 fastest to 9 strongest).
    pub fn new(level: u8) -> Self {
        // negative window bits leave out the zlib wrapper
        let flags = create_comp_flags_from_zip_params(level as i32, -15, 0);

        DeflateCompressor {
            stream: Box::new(CompressorOxide::new(flags)),
            finished: false,
            failure: StreamFailure::default(),
        }
    }

    fn check(&mut self, result: StreamResult, operation: &str) -> Result<(MZStatus, usize, usize)> {
        match result.status {
            Ok(status) => Ok((status, result.bytes_consumed, result.bytes_written)),
            Err(error) => Err(self.failure.record(
                format!("deflate {} failed: {:?}", operation, error)
            )),
        }
    }
}

impl Compressor for DeflateCompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        // the underlying call always wants to make progress on one side
        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }
        if input.is_empty() {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        let result = miniz_oxide::deflate::stream::deflate(
            &mut self.stream, input, output, MZFlush::None
        );
        let (_, consumed, written) = self.check(result, "compression")?;

        // the compressor fills the output to the last byte before it
        // stops consuming, so a non-full output means exhausted input
        let reason = if written == output.len() { StopReason::OutputBufferFull }
                     else { StopReason::InputBufferExhausted };

        Ok(ProcessStatus::new(reason, consumed, written))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if self.finished {
            return Ok(ProcessStatus::new(StopReason::Finished, 0, 0));
        }
        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        let result = miniz_oxide::deflate::stream::deflate(
            &mut self.stream, &[], output, MZFlush::Finish
        );
        let (status, _, written) = self.check(result, "finish")?;

        if status == MZStatus::StreamEnd {
            self.finished = true;
            Ok(ProcessStatus::new(StopReason::Finished, 0, written))
        } else {
            Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, written))
        }
    }
}


/// Decompresses one raw deflate stream.
pub struct DeflateDecompressor {
    stream: Box<InflateState>,
    finished: bool,
    failure: StreamFailure,
}

impl DeflateDecompressor {

    /// A fresh decompressor expecting a raw deflate stream.
    pub fn new() -> Self {
        DeflateDecompressor {
            stream: InflateState::new_boxed(DataFormat::Raw),
            finished: false,
            failure: StreamFailure::default(),
        }
    }
}

impl Default for DeflateDecompressor {
    fn default() -> Self { DeflateDecompressor::new() }
}

impl Decompressor for DeflateDecompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }
        if input.is_empty() || self.finished {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        let result = miniz_oxide::inflate::stream::inflate(
            &mut self.stream, input, output, MZFlush::None
        );

        let (status, consumed, written) = match result.status {
            Ok(status) => (status, result.bytes_consumed, result.bytes_written),
            Err(error) => return Err(self.failure.record(
                format!("deflate decompression failed on corrupt data: {:?}", error)
            )),
        };

        if status == MZStatus::StreamEnd {
            self.finished = true;
        }

        let reason = if written == output.len() && !self.finished { StopReason::OutputBufferFull }
                     else { StopReason::InputBufferExhausted };

        Ok(ProcessStatus::new(reason, consumed, written))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if self.finished {
            return Ok(ProcessStatus::new(StopReason::Finished, 0, 0));
        }
        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        let result = miniz_oxide::inflate::stream::inflate(
            &mut self.stream, &[], output, MZFlush::Finish
        );

        match result.status {
            Ok(MZStatus::StreamEnd) => {
                self.finished = true;
                Ok(ProcessStatus::new(StopReason::Finished, 0, result.bytes_written))
            },

            Ok(_) if result.bytes_written == output.len() => {
                Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, result.bytes_written))
            },

            Ok(_) => Err(self.failure.record(
                "deflate stream ended before its final block"
            )),

            Err(error) => Err(self.failure.record(
                format!("deflate decompression failed on corrupt data: {:?}", error)
            )),
        }
    }
}
