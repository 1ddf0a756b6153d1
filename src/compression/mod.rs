
//! A uniform streaming interface over several compression libraries,
//! and a registry that picks an algorithm for a CPU budget.
//!
//! Every codec is driven through the same two-sided bounded-buffer
//! protocol: the caller pushes input chunks and pulls output chunks of
//! whatever size suits it, regardless of how the wrapped library wants
//! to be fed. Libraries that refuse to be throttled mid-call are bridged
//! with the helper buffers in [`buffers`].

pub mod buffers;
pub mod deflate;
pub mod provider;

#[cfg(feature = "brotli")]
pub mod brotli;

#[cfg(feature = "lzma")]
pub mod lzma;

#[cfg(feature = "zstd")]
pub mod zstd;

pub use self::provider::{CompressionAlgorithm, CompressionProvider};

use crate::error::{Error, PassiveResult, Result};
use crate::io::{write_fully, InputStream, OutputStream};


/// Why a `process` or `finish` call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {

    /// All data has been flushed. Only `finish` returns this; the output
    /// written so far now decompresses back into the complete input.
    Finished,

    /// All provided input was absorbed and the output buffer still has
    /// room. The caller may free or reuse its input buffer immediately.
    InputBufferExhausted,

    /// The output buffer filled up before all input (or buffered state)
    /// was processed. Drain the output and repeat the call.
    OutputBufferFull,
}

/// How far one `process` or `finish` call got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {

    /// Why the call returned.
    pub reason: StopReason,

    /// Bytes consumed from the caller's input buffer.
    /// Always zero for `finish`.
    pub bytes_consumed: usize,

    /// Bytes stored into the caller's output buffer.
    pub bytes_written: usize,
}

impl ProcessStatus {
    pub(crate) fn new(reason: StopReason, bytes_consumed: usize, bytes_written: usize) -> Self {
        ProcessStatus { reason, bytes_consumed, bytes_written }
    }
}


/// Compresses a stream of data chunk by chunk.
///
/// Compressors keep large internal state (dictionaries, look-ahead
/// windows), so create one per stream and drop it when the stream is
/// done instead of keeping it around. A compressor is not reusable
/// across independent streams.
pub trait Compressor {

    /// Compresses as much of `input` as fits into `output`.
    ///
    /// Output is not guaranteed to be complete until [`Compressor::finish`]
    /// has returned [`StopReason::Finished`]; the library may hold data
    /// back to compress it together with the next chunk.
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus>;

    /// Flushes all buffered state and the stream trailer.
    ///
    /// Returns [`StopReason::OutputBufferFull`] when the output buffer was
    /// too small; calling again with a fresh buffer resumes the trailer.
    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus>;

    /// Pumps an entire input stream through [`Compressor::process`].
    /// Call [`Compressor::finish_stream`] afterwards.
    fn process_stream(
        &mut self, input: &mut dyn InputStream, output: &mut dyn OutputStream
    ) -> PassiveResult {
        let mut input_chunk = vec![0_u8; STREAM_CHUNK_SIZE];
        let mut output_chunk = vec![0_u8; STREAM_CHUNK_SIZE];

        while input.is_more_data_available() {
            let read = input.read_up_to(&mut input_chunk, 1)?;

            let mut consumed = 0;
            while consumed < read.bytes_read {
                let status = self.process(
                    &input_chunk[consumed .. read.bytes_read], &mut output_chunk
                )?;

                consumed += status.bytes_consumed;
                write_fully(output, &output_chunk[.. status.bytes_written])?;
            }

            if read.end_of_stream { break; }
        }

        Ok(())
    }

    /// Repeats [`Compressor::finish`] until the trailer is fully written.
    fn finish_stream(&mut self, output: &mut dyn OutputStream) -> PassiveResult {
        let mut output_chunk = vec![0_u8; STREAM_CHUNK_SIZE];

        loop {
            let status = self.finish(&mut output_chunk)?;
            write_fully(output, &output_chunk[.. status.bytes_written])?;

            if status.reason == StopReason::Finished {
                return Ok(());
            }
        }
    }
}

/// Decompresses a stream of data chunk by chunk.
/// Like compressors, decompressors serve exactly one stream.
pub trait Decompressor {

    /// Decompresses as much of `input` as fits into `output`.
    fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<ProcessStatus>;

    /// Flushes any remaining buffered output and verifies the stream was
    /// complete. Resumable like [`Compressor::finish`].
    fn finish(&mut self, output: &mut [u8]) -> Result<ProcessStatus>;

    /// Pumps an entire input stream through [`Decompressor::process`].
    /// Call [`Decompressor::finish_stream`] afterwards.
    fn process_stream(
        &mut self, input: &mut dyn InputStream, output: &mut dyn OutputStream
    ) -> PassiveResult {
        let mut input_chunk = vec![0_u8; STREAM_CHUNK_SIZE];
        let mut output_chunk = vec![0_u8; STREAM_CHUNK_SIZE];

        while input.is_more_data_available() {
            let read = input.read_up_to(&mut input_chunk, 1)?;

            let mut consumed = 0;
            while consumed < read.bytes_read {
                let status = self.process(
                    &input_chunk[consumed .. read.bytes_read], &mut output_chunk
                )?;

                consumed += status.bytes_consumed;
                write_fully(output, &output_chunk[.. status.bytes_written])?;
            }

            if read.end_of_stream { break; }
        }

        Ok(())
    }

    /// Repeats [`Decompressor::finish`] until all output is written.
    fn finish_stream(&mut self, output: &mut dyn OutputStream) -> PassiveResult {
        let mut output_chunk = vec![0_u8; STREAM_CHUNK_SIZE];

        loop {
            let status = self.finish(&mut output_chunk)?;
            write_fully(output, &output_chunk[.. status.bytes_written])?;

            if status.reason == StopReason::Finished {
                return Ok(());
            }
        }
    }
}

/// Scratch buffer size for the stream pumping convenience methods.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;


/// Remembers the first failure of a stream and replays it on every
/// later call. Once a library reports an error the stream is invalid;
/// callers cannot resume it, only drop the adapter.
#[derive(Debug, Default)]
pub(crate) struct StreamFailure {
    message: Option<String>,
}

impl StreamFailure {

    /// Fails if this stream already failed earlier.
    pub fn guard(&self) -> PassiveResult {
        match &self.message {
            Some(message) => Err(Error::compression(message.clone())),
            None => Ok(()),
        }
    }

    /// Records the first failure and returns it as an error.
    pub fn record(&mut self, message: impl Into<String>) -> Error {
        let message = message.into();

        if self.message.is_none() {
            self.message = Some(message.clone());
        }

        Error::compression(message)
    }
}
