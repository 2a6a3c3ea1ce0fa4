//! Guarded `i32` buffers.
//!
//! A [`GuardedBuffer`] stores `len` payload elements followed by
//! [`GUARD_LEN`] sentinel slots. Kernels receive the payload pointer only, so
//! any write past the payload lands in the guard and is caught by
//! [`GuardedBuffer::guards_intact`].

/// Number of sentinel slots after the payload.
pub const GUARD_LEN: usize = 4;

/// Value stored in every guard slot.
pub const SENTINEL: i32 = 0x5EED_F00D;

/// Payload plus sentinel tail in one contiguous allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardedBuffer {
    data: Vec<i32>,
    len: usize,
}

impl GuardedBuffer {
    /// Creates a buffer holding a copy of `values`.
    pub fn from_slice(values: &[i32]) -> Self {
        let mut data = Vec::with_capacity(values.len() + GUARD_LEN);
        data.extend_from_slice(values);
        data.extend(std::iter::repeat(SENTINEL).take(GUARD_LEN));
        Self {
            data,
            len: values.len(),
        }
    }

    /// Creates a buffer of `len` copies of `value`.
    pub fn filled(len: usize, value: i32) -> Self {
        Self::from_slice(&vec![value; len])
    }

    /// Creates a zeroed buffer of `len` elements.
    pub fn zeroed(len: usize) -> Self {
        Self::filled(len, 0)
    }

    /// Payload length (guards excluded).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const i32 {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut i32 {
        self.data.as_mut_ptr()
    }

    /// The payload, without guards.
    pub fn as_slice(&self) -> &[i32] {
        &self.data[..self.len]
    }

    /// The payload, without guards.
    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data[..self.len]
    }

    /// The guard slots.
    pub fn guards(&self) -> &[i32] {
        &self.data[self.len..]
    }

    /// Returns `true` if no guard slot was overwritten.
    pub fn guards_intact(&self) -> bool {
        self.guards().iter().all(|&g| g == SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_and_guards() {
        let buf = GuardedBuffer::from_slice(&[1, 2, 3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
        assert_eq!(buf.guards(), &[SENTINEL; GUARD_LEN]);
        assert!(buf.guards_intact());
    }

    #[test]
    fn test_detects_overrun() {
        let mut buf = GuardedBuffer::zeroed(2);
        // Simulate a write one past the end of the payload.
        unsafe { *buf.as_mut_ptr().add(2) = 7 };
        assert!(!buf.guards_intact());
        assert_eq!(buf.as_slice(), &[0, 0]);
    }

    #[test]
    fn test_empty_buffer_still_has_guards() {
        let buf = GuardedBuffer::zeroed(0);
        assert!(buf.is_empty());
        assert_eq!(buf.guards().len(), GUARD_LEN);
        assert!(buf.guards_intact());
    }
}
