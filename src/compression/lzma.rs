
//! LZMA adapter over `lzma-rs`, which only offers whole-stream calls.
//!
//! The library cannot be fed or drained incrementally, so the adapter
//! banks every input chunk in a [`ReadBuffer`] during `process` and runs
//! the library exactly once when finishing, capturing all of its output
//! in a [`WriteBuffer`] that is then drained into the caller's buffers
//! across as many `finish` calls as needed. Memory use is proportional
//! to the stream, which is the price of a library without flow control.
//!
//! Streams are the classic `.lzma` (LZMA-alone) container.

use crate::compression::buffers::{ReadBuffer, WriteBuffer};
use crate::compression::{Compressor, Decompressor, ProcessStatus, StopReason, StreamFailure};
use crate::error::Result;


/// Compresses one LZMA-alone stream.
pub struct LzmaCompressor {
    input: ReadBuffer,
    output: WriteBuffer,
    ran: bool,
    failure: StreamFailure,
}

impl LzmaCompressor {

    /// A fresh compressor. The encoder has no quality parameter;
    /// every preset compresses identically.
    pub fn new() -> Self {
        LzmaCompressor {
            input: ReadBuffer::new(),
            output: WriteBuffer::new(),
            ran: false,
            failure: StreamFailure::default(),
        }
    }
}

impl Default for LzmaCompressor {
    fn default() -> Self { LzmaCompressor::new() }
}

impl Compressor for LzmaCompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if input.is_empty() {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        // the library produces nothing until it has seen the whole
        // stream, so all there is to do is bank the chunk; the caller
        // may free its buffer right away
        self.input.bank(input);
        let _ = output;

        Ok(ProcessStatus::new(StopReason::InputBufferExhausted, input.len(), 0))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if !self.ran {
            let mut banked = self.input.cached();

            if let Err(error) = lzma_rs::lzma_compress(&mut banked, &mut self.output) {
                return Err(self.failure.record(
                    format!("lzma compression failed: {:?}", error)
                ));
            }

            let consumed = self.input.available();
            self.input.consume(consumed);
            self.ran = true;
        }

        if output.is_empty() && !self.output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        let written = self.output.drain_into(output);

        let reason = if self.output.is_empty() { StopReason::Finished }
                     else { StopReason::OutputBufferFull };

        Ok(ProcessStatus::new(reason, 0, written))
    }
}


/// Decompresses one LZMA-alone stream.
pub struct LzmaDecompressor {
    input: ReadBuffer,
    output: WriteBuffer,
    ran: bool,
    failure: StreamFailure,
}

impl LzmaDecompressor {

    /// A fresh decompressor.
    pub fn new() -> Self {
        LzmaDecompressor {
            input: ReadBuffer::new(),
            output: WriteBuffer::new(),
            ran: false,
            failure: StreamFailure::default(),
        }
    }
}

impl Default for LzmaDecompressor {
    fn default() -> Self { LzmaDecompressor::new() }
}

impl Decompressor for LzmaDecompressor {
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if input.is_empty() {
            return Ok(ProcessStatus::new(StopReason::InputBufferExhausted, 0, 0));
        }

        // decoding cannot start before the header and dictionary are
        // complete, and the library will not pause once started, so
        // input banks until the finish call just like the compressor
        self.input.bank(input);
        let _ = output;

        Ok(ProcessStatus::new(StopReason::InputBufferExhausted, input.len(), 0))
    }

    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus> {
        self.failure.guard()?;

        if !self.ran {
            let mut banked = self.input.cached();

            if let Err(error) = lzma_rs::lzma_decompress(&mut banked, &mut self.output) {
                return Err(self.failure.record(
                    format!("lzma decompression failed on corrupt data: {:?}", error)
                ));
            }

            let consumed = self.input.available();
            self.input.consume(consumed);
            self.ran = true;
        }

        if output.is_empty() && !self.output.is_empty() {
            return Ok(ProcessStatus::new(StopReason::OutputBufferFull, 0, 0));
        }

        let written = self.output.drain_into(output);

        let reason = if self.output.is_empty() { StopReason::Finished }
                     else { StopReason::OutputBufferFull };

        Ok(ProcessStatus::new(reason, 0, written))
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::StopReason;

    const MESSAGE: &[u8] = b"Hello World, this is text that has been lzma-compressed";

    fn run_round_trip(payload: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        {
            let mut compressor = LzmaCompressor::new();

            let status = compressor.process(payload, &mut []).unwrap();
            assert_eq!(status.reason, StopReason::InputBufferExhausted);
            assert_eq!(status.bytes_consumed, payload.len());

            loop {
                let mut chunk = [0_u8; 64];
                let status = compressor.finish(&mut chunk).unwrap();
                compressed.extend_from_slice(&chunk[.. status.bytes_written]);
                if status.reason == StopReason::Finished { break; }
            }
        }

        let mut restored = Vec::new();
        {
            let mut decompressor = LzmaDecompressor::new();

            let status = decompressor.process(&compressed, &mut []).unwrap();
            assert_eq!(status.reason, StopReason::InputBufferExhausted);

            loop {
                let mut chunk = [0_u8; 64];
                let status = decompressor.finish(&mut chunk).unwrap();
                restored.extend_from_slice(&chunk[.. status.bytes_written]);
                if status.reason == StopReason::Finished { break; }
            }
        }

        restored
    }

    #[test]
    fn short_message_round_trips(){
        assert_eq!(run_round_trip(MESSAGE), MESSAGE);
    }

    #[test]
    fn empty_input_round_trips(){
        assert_eq!(run_round_trip(&[]), &[] as &[u8]);
    }

    #[test]
    fn no_output_appears_before_finish(){
        let mut compressor = LzmaCompressor::new();
        let mut output = [0_u8; 64];

        let status = compressor.process(MESSAGE, &mut output).unwrap();
        assert_eq!(status.bytes_written, 0, "the library runs only at finish time");
    }

    #[test]
    fn corrupt_input_fails_and_stays_failed(){
        let mut decompressor = LzmaDecompressor::new();
        let mut output = [0_u8; 64];

        decompressor.process(&[0xde, 0xad, 0xbe, 0xef], &mut output).unwrap();
        assert!(decompressor.finish(&mut output).is_err());
        assert!(decompressor.finish(&mut output).is_err(), "failures are sticky");
    }
}
