
//! Brotli (RFC 7932) adapter over the `brotli` crate's low-level
//! stream entry points.
//!
//! The encoder and decoder both already operate on caller-bounded
//! buffer pairs, so the adapter's work is translating the offset-based
//! calling convention and the tri-state result codes into the common
//! streaming contract.

use brotli::enc::encode::{
    BrotliEncoderOperation, BrotliEncoderParameter, BrotliEncoderStateStruct,
};
use brotli::enc::StandardAlloc;
use brotli::{BrotliDecompressStream, BrotliResult, BrotliState};

use crate::compression::{Compressor, Decompressor, ProcessStatus, StopReason, StreamFailure};
use crate::error::Result;

/// Fastest brotli quality.
pub const FASTEST_QUALITY: u32 = 1;

/// The balanced default quality.
pub const DEFAULT_QUALITY: u32 = 6;

/// Strongest quality brotli offers.
pub const STRONGEST_QUALITY: u32 = 11;

/// Window size used for all presets, 4 MiB.
const LG_WINDOW_SIZE: u32 = 22;


/// Compresses one brotli stream.
pub struct BrotliCompressor {
    state: BrotliEncoderStateStruct<StandardAlloc>,
    failure: StreamFailure,
}

impl BrotliCompressor {

    /// A fresh compressor with the given quality (1 fastest, 11 strongest).
    pub fn new(quality: u32) -> Self {
        let mut state = BrotliEncoderStateStruct::new(StandardAlloc::default());

        state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_QUALITY, quality);
        state.set_parameter(BrotliEncoderParameter::BROTLI_PARAM_LGWIN, LG_WINDOW_SIZE);

        BrotliCompressor { state, failure: StreamFailure::default() }
    }

    fn drive(
        &mut self, operation: BrotliEncoderOperation, input: &[u8], output: &mut [u8]
    ) -> Result<(usize, usize)> {
        let mut available_in = input.len();
        let mut input_offset = 0;
        let mut available_out = output.len();
        let mut output_offset = 0;
        let mut total_out = None;

        let success = self.state.compress_stream(
            operation,
            &mut available_in, input, &mut input_offset,
            &mut available_out, output, &mut output_offset,
            &mut total_out,
            &mut |_, _, _, _| (),
        );

        if !success {
            return Err(self.failure.record("brotli encoder rejected the stream state"));
        }

        Ok((input_offset, output_offset))
    }
}

impl Compressor for BrotliCompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }
        if input.is_empty() {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        let (consumed, written) = self.drive(
            BrotliEncoderOperation::BROTLI_OPERATION_PROCESS, input, output
        )?;

        let reason = if consumed < input.len() { StopReason::OutputBufferFull }
                     else { StopReason::InputBufferExhausted };

        Ok(ProcessStatus::new(reason, consumed, written))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if self.state.is_finished() {
            return Ok(ProcessStatus::new(StopReason::Finished, 0, 0));
        }
        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        let (_, written) = self.drive(
            BrotliEncoderOperation::BROTLI_OPERATION_FINISH, &[], output
        )?;

        if self.state.is_finished() {
            Ok(ProcessStatus::new(StopReason::Finished, 0, written))
        } else {
            Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, written))
        }
    }
}


/// Decompresses one brotli stream.
pub struct BrotliDecompressor {
    state: BrotliState<StandardAlloc, StandardAlloc, StandardAlloc>,
    finished: bool,
    failure: StreamFailure,
}

impl BrotliDecompressor {

    /// A fresh decompressor.
    pub fn new() -> Self {
        BrotliDecompressor {
            state: BrotliState::new(
                StandardAlloc::default(), StandardAlloc::default(), StandardAlloc::default()
            ),
            finished: false,
            failure: StreamFailure::default(),
        }
    }

    fn drive(&mut self, input: &[u8], output: &mut [u8]) -> Result<(usize, usize, BrotliResult)> {
        let mut available_in = input.len();
        let mut input_offset = 0;
        let mut available_out = output.len();
        let mut output_offset = 0;
        let mut total_out = 0;

        let result = BrotliDecompressStream(
            &mut available_in, &mut input_offset, input,
            &mut available_out, &mut output_offset, output,
            &mut total_out, &mut self.state,
        );

        if let BrotliResult::ResultFailure = result {
            return Err(self.failure.record("corrupt brotli stream"));
        }

        if let BrotliResult::ResultSuccess = result {
            self.finished = true;
        }

        Ok((input_offset, output_offset, result))
    }
}

impl Default for BrotliDecompressor {
    fn default() -> Self { BrotliDecompressor::new() }
}

impl Decompressor for BrotliDecompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }
        if input.is_empty() || self.finished {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        let (consumed, written, result) = self.drive(input, output)?;

        let reason = match result {
            BrotliResult::NeedsMoreOutput => StopReason::OutputBufferFull,
            _ => StopReason::InputBufferExhausted,
        };

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

        let (_, written, result) = self.drive(&[], output)?;

        match result {
            BrotliResult::ResultSuccess =>
                Ok(ProcessStatus::new(StopReason::Finished, 0, written)),

            BrotliResult::NeedsMoreOutput =>
                Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, written)),

            _ => Err(self.failure.record("brotli stream ended before its final block")),
        }
    }
}
