
//! Byte stream contracts consumed by the compression dispatcher.
//!
//! Real stream implementations (files, sockets, archives) live outside
//! this crate; these traits only pin down the methods the dispatcher
//! needs, plus minimal in-memory implementations for tests and for
//! pumping whole buffers through a codec.

use crate::error::Result;


/// What a single bounded read produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {

    /// Number of bytes stored into the caller's buffer.
    pub bytes_read: usize,

    /// Whether the end of the stream was reached during this read.
    pub end_of_stream: bool,
}


/// A stream supplying bytes to a compressor or decompressor.
pub trait InputStream {

    /// Whether another read can produce at least one more byte.
    fn is_more_data_available(&self) -> bool;

    /// Reads up to `buffer.len()` bytes into the buffer, blocking until at
    /// least `required_byte_count` bytes have arrived or the stream ends.
    /// A required count of zero requests an opportunistic non-blocking read.
    fn read_up_to(&mut self, buffer: &mut [u8], required_byte_count: usize) -> Result<ReadOutcome>;
}

/// A stream receiving bytes from a compressor or decompressor.
pub trait OutputStream {

    /// Whether the stream can currently accept more data.
    fn can_accept_more_data(&self) -> bool;

    /// Writes up to `buffer.len()` bytes, blocking until at least
    /// `minimum_byte_count` bytes have been accepted.
    /// Returns the number of bytes actually written.
    fn write_up_to(&mut self, buffer: &[u8], minimum_byte_count: usize) -> Result<usize>;
}


/// An input stream over a borrowed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceInput<'b> {
    remaining: &'b [u8],
}

impl<'b> SliceInput<'b> {

    /// Streams the bytes of the given slice from start to end.
    pub fn new(bytes: &'b [u8]) -> Self {
        SliceInput { remaining: bytes }
    }
}

impl InputStream for SliceInput<'_> {
    fn is_more_data_available(&self) -> bool {
        !self.remaining.is_empty()
    }

    fn read_up_to(&mut self, buffer: &mut [u8], _required_byte_count: usize) -> Result<ReadOutcome> {
        let byte_count = buffer.len().min(self.remaining.len());

        buffer[.. byte_count].copy_from_slice(&self.remaining[.. byte_count]);
        self.remaining = &self.remaining[byte_count ..];

        Ok(ReadOutcome { bytes_read: byte_count, end_of_stream: self.remaining.is_empty() })
    }
}

/// A growable vector accepts everything thrown at it.
impl OutputStream for Vec<u8> {
    fn can_accept_more_data(&self) -> bool { true }

    fn write_up_to(&mut self, buffer: &[u8], _minimum_byte_count: usize) -> Result<usize> {
        self.extend_from_slice(buffer);
        Ok(buffer.len())
    }
}


/// Writes the whole buffer, failing if the stream accepts less.
pub(crate) fn write_fully(stream: &mut dyn OutputStream, bytes: &[u8]) -> Result<()> {
    let written = stream.write_up_to(bytes, bytes.len())?;

    if written == bytes.len() { Ok(()) }
    else {
        Err(crate::error::Error::invalid_argument(
            "output stream accepted less than the requested minimum"
        ))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slice_input_streams_in_chunks(){
        let mut input = SliceInput::new(&[1, 2, 3, 4, 5]);
        assert!(input.is_more_data_available());

        let mut chunk = [0_u8; 2];

        let outcome = input.read_up_to(&mut chunk, 1).unwrap();
        assert_eq!((outcome.bytes_read, outcome.end_of_stream), (2, false));
        assert_eq!(chunk, [1, 2]);

        input.read_up_to(&mut chunk, 1).unwrap();
        let outcome = input.read_up_to(&mut chunk, 1).unwrap();
        assert_eq!((outcome.bytes_read, outcome.end_of_stream), (1, true));
        assert_eq!(chunk[0], 5);

        assert!(!input.is_more_data_available());
        let outcome = input.read_up_to(&mut chunk, 0).unwrap();
        assert_eq!((outcome.bytes_read, outcome.end_of_stream), (0, true));
    }

    #[test]
    fn vector_output_accepts_everything(){
        let mut output = Vec::new();
        assert!(output.can_accept_more_data());

        write_fully(&mut output, &[1, 2, 3]).unwrap();
        write_fully(&mut output, &[4]).unwrap();

        assert_eq!(output, [1, 2, 3, 4]);
    }
}
