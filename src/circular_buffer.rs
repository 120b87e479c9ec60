/// Really simple fixed-capacity circular buffer.  Storage is allocated once
/// up front; once full, each push overwrites the oldest element.
pub struct CircularBuffer<T> {
    // Buffer of values
    buffer: Vec<T>,

    // The next position to write in the circular buffer once it is full
    ptr: usize,

    // The length of this circular buffer (once it is fully populated)
    capacity: usize,
}

impl<T> CircularBuffer<T>
where
    T: Clone,
{
    /// Create a new circular buffer with the specified capacity
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            buffer: Vec::with_capacity(capacity),
            ptr: 0,
            capacity,
        }
    }

    /// Push a new element into the circular buffer
    pub fn push(&mut self, value: T) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(value);
        } else {
            self.buffer[self.ptr] = value;
            self.ptr = (self.ptr + 1) % self.capacity;
        }
    }

    /// Forget every element, keeping the storage
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ptr = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get an element by age, 0 being the oldest
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.buffer.len() {
            return None;
        }
        self.buffer.get((self.ptr + index) % self.buffer.len())
    }
}

#[cfg(test)]
impl<T: Clone> CircularBuffer<T> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently written value, or None if the buffer is empty
    fn head(&self) -> Option<T> {
        if self.buffer.is_empty() {
            return None;
        }
        self.get(self.buffer.len() - 1).cloned()
    }

    /// The oldest value, or None if the buffer is empty
    fn tail(&self) -> Option<T> {
        self.get(0).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_circular_buffer() {
        let mut buf: CircularBuffer<u32> = CircularBuffer::new(5);
        assert!(buf.is_empty());
        assert_eq!(buf.head(), None);
        assert_eq!(buf.tail(), None);

        buf.push(1);
        buf.push(2);
        buf.push(3);
        buf.push(4);

        // Partially filled buffers are usable straight away
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.head(), Some(4));
        assert_eq!(buf.tail(), Some(1));
        assert_eq!(buf.get(4), None);

        buf.push(5);
        assert_eq!(buf.head(), Some(5));
        assert_eq!(buf.tail(), Some(1));

        // Check that the buffer is actually circular
        buf.push(6);
        buf.push(7);
        buf.push(8);
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.head(), Some(8));
        assert_eq!(buf.tail(), Some(4));
        let ordered: Vec<u32> = (0..buf.len()).filter_map(|i| buf.get(i).copied()).collect();
        assert_eq!(ordered, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_clear() {
        let mut buf = CircularBuffer::new(3);
        for i in 0..7 {
            buf.push(i);
        }
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 3);
        buf.push(10);
        assert_eq!(buf.head(), Some(10));
        assert_eq!(buf.tail(), Some(10));
    }
}
