
//! Helper buffers bridging libraries that cannot be throttled mid-call
//! into the caller-bounded streaming protocol.
//!
//! Some libraries insist on producing a whole block of output once fed,
//! or refuse to start before a minimum amount of input has arrived. The
//! [`WriteBuffer`] captures output overflowing the caller's buffer so it
//! can be handed out on later calls; the [`ReadBuffer`] banks input
//! until the wrapped library is willing to accept it.

use std::io;


/// Collects output bytes and hands them out in caller-sized portions,
/// preserving the exact write order.
///
/// An adapter lets its library write freely into this buffer, then
/// drains as much as fits into the caller's output buffer on every call.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    spill: Vec<u8>,
    read_index: usize,
}

impl WriteBuffer {

    /// An empty buffer with nothing pending.
    pub fn new() -> Self {
        WriteBuffer::default()
    }

    /// Number of bytes written but not yet drained.
    pub fn pending(&self) -> usize {
        self.spill.len() - self.read_index
    }

    /// Whether all written bytes have been drained.
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Appends bytes after everything written before.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.spill.extend_from_slice(bytes);
    }

    /// Moves as many pending bytes as fit into the target buffer,
    /// returning how many were moved.
    pub fn drain_into(&mut self, target: &mut [u8]) -> usize {
        let byte_count = target.len().min(self.pending());

        target[.. byte_count].copy_from_slice(
            &self.spill[self.read_index .. self.read_index + byte_count]
        );
        self.read_index += byte_count;

        self.compact();
        byte_count
    }

    /// Shifts the unread region back to the start once the read index
    /// has crossed half the storage, bounding growth without moving
    /// bytes on every drain.
    fn compact(&mut self) {
        if self.read_index == self.spill.len() {
            self.spill.clear();
            self.read_index = 0;
        }
        else if self.read_index > self.spill.len() / 2 {
            self.spill.copy_within(self.read_index .., 0);
            self.spill.truncate(self.spill.len() - self.read_index);
            self.read_index = 0;
        }
    }
}

/// Libraries with `io::Write` interfaces can emit straight into the buffer.
impl io::Write for WriteBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.write_bytes(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}


/// Banks input chunks until the wrapped library is ready to consume
/// them, so the caller can free its buffers immediately after each call.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    cache: Vec<u8>,
    read_index: usize,
}

impl ReadBuffer {

    /// An empty buffer with nothing banked.
    pub fn new() -> Self {
        ReadBuffer::default()
    }

    /// Number of banked bytes not yet consumed.
    pub fn available(&self) -> usize {
        self.cache.len() - self.read_index
    }

    /// Copies a caller chunk behind everything banked before.
    pub fn bank(&mut self, bytes: &[u8]) {
        self.cache.extend_from_slice(bytes);
    }

    /// The banked bytes in arrival order, without consuming them.
    /// Useful for libraries that want a single contiguous input.
    pub fn cached(&self) -> &[u8] {
        &self.cache[self.read_index ..]
    }

    /// Marks the first `byte_count` cached bytes as consumed.
    pub fn consume(&mut self, byte_count: usize) {
        debug_assert!(byte_count <= self.available());
        self.read_index += byte_count;

        if self.read_index == self.cache.len() {
            self.cache.clear();
            self.read_index = 0;
        }
        else if self.read_index > self.cache.len() / 2 {
            self.cache.copy_within(self.read_index .., 0);
            self.cache.truncate(self.cache.len() - self.read_index);
            self.read_index = 0;
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn write_buffer_preserves_order_across_drains(){
        let mut buffer = WriteBuffer::new();
        buffer.write_bytes(&[1, 2, 3, 4, 5]);
        buffer.write_bytes(&[6, 7]);
        assert_eq!(buffer.pending(), 7);

        let mut first = [0_u8; 3];
        assert_eq!(buffer.drain_into(&mut first), 3);
        assert_eq!(first, [1, 2, 3]);

        buffer.write_bytes(&[8]);

        let mut rest = [0_u8; 8];
        assert_eq!(buffer.drain_into(&mut rest), 5);
        assert_eq!(&rest[.. 5], &[4, 5, 6, 7, 8]);

        assert!(buffer.is_empty());
        assert_eq!(buffer.drain_into(&mut rest), 0);
    }

    #[test]
    fn write_buffer_accepts_io_writes(){
        let mut buffer = WriteBuffer::new();
        buffer.write_all(&[10, 20, 30]).unwrap();
        buffer.flush().unwrap();

        let mut drained = [0_u8; 4];
        assert_eq!(buffer.drain_into(&mut drained), 3);
        assert_eq!(&drained[.. 3], &[10, 20, 30]);
    }

    #[test]
    fn write_buffer_survives_many_partial_drains(){
        let mut buffer = WriteBuffer::new();
        let mut expected = Vec::new();
        let mut drained = Vec::new();

        for round in 0 .. 100_u32 {
            let bytes = [round as u8, (round + 1) as u8, (round + 2) as u8];
            buffer.write_bytes(&bytes);
            expected.extend_from_slice(&bytes);

            let mut chunk = [0_u8; 2];
            let count = buffer.drain_into(&mut chunk);
            drained.extend_from_slice(&chunk[.. count]);
        }

        let mut rest = vec![0_u8; buffer.pending()];
        buffer.drain_into(&mut rest);
        drained.extend_from_slice(&rest);

        assert_eq!(drained, expected);
    }

    #[test]
    fn read_buffer_banks_and_consumes_in_order(){
        let mut buffer = ReadBuffer::new();
        buffer.bank(&[1, 2, 3]);
        buffer.bank(&[4, 5]);

        assert_eq!(buffer.available(), 5);
        assert_eq!(buffer.cached(), &[1, 2, 3, 4, 5]);

        buffer.consume(2);
        assert_eq!(buffer.cached(), &[3, 4, 5]);

        buffer.bank(&[6]);
        assert_eq!(buffer.cached(), &[3, 4, 5, 6]);

        buffer.consume(4);
        assert_eq!(buffer.available(), 0);
        assert_eq!(buffer.cached(), &[] as &[u8]);
    }

    #[test]
    fn read_buffer_compaction_keeps_unread_bytes(){
        let mut buffer = ReadBuffer::new();
        buffer.bank(&[0; 1000]);
        buffer.consume(900); // crosses the halfway mark, forces a shift
        buffer.bank(&[42]);

        assert_eq!(buffer.available(), 101);
        assert_eq!(buffer.cached()[100], 42);
    }
}
