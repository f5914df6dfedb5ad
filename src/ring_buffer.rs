#[derive(Clone, Debug)]
pub(crate) struct RingBuffer<T> {
    buffer: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    #[must_use]
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity must be positive");

        Self {
            buffer: vec![T::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        self.len == self.capacity()
    }

    /// Appends `value`, returning the evicted oldest value once full.
    #[inline]
    pub(crate) fn push(&mut self, value: T) -> Option<T> {
        if self.is_ready() {
            let old = self.buffer[self.head];

            self.buffer[self.head] = value;
            self.head += 1;
            if self.head == self.capacity() {
                self.head = 0;
            }

            Some(old)
        } else {
            self.buffer[self.len] = value;
            self.len += 1;

            None
        }
    }

    /// Iterates from the oldest to the newest value.
    #[inline]
    pub(crate) fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let (newer, older) = self.buffer[..self.len].split_at(self.head);
        older.iter().chain(newer).copied()
    }
}
