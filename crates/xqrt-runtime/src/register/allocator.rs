//! Compile-time register allocation.
//!
//! Every operator reserves the slots it needs while the plan is compiled.
//! Allocation is a monotonic bump: slots are never freed or reused, so two
//! subtrees compiled against the same allocator always receive disjoint
//! ranges and can share one frame without clobbering each other. Nothing is
//! checked at runtime; the frame is simply sized to the high-water mark.

use std::ops::Range;

/// A contiguous range of register indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegisterRange {
    start: usize,
    len: usize,
}

impl RegisterRange {
    /// Creates a range of `len` slots starting at `start`.
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Returns the first index.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// Returns one past the last index.
    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    /// Returns the number of slots.
    #[must_use]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Returns true if the range holds no slots.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns the index of the `offset`-th slot.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the range.
    #[must_use]
    pub fn slot(self, offset: usize) -> usize {
        assert!(offset < self.len, "register offset {offset} outside range of {}", self.len);
        self.start + offset
    }

    /// Returns true if `index` is inside the range.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    /// Returns true if the two ranges share a slot.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end() && other.start < self.end()
    }

    /// Returns the indices as a `Range`.
    #[must_use]
    pub const fn indices(self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Allocator for frame-local registers.
#[derive(Debug, Default)]
pub struct RegisterAllocator {
    next: usize,
}

impl RegisterAllocator {
    /// Creates an allocator with no slots handed out.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Reserves `count` contiguous slots.
    pub fn allocate(&mut self, count: usize) -> RegisterRange {
        let range = RegisterRange::new(self.next, count);
        self.next += count;
        range
    }

    /// Reserves a single slot and returns its index.
    pub fn allocate_one(&mut self) -> usize {
        self.allocate(1).start()
    }

    /// Returns the current high-water mark.
    #[must_use]
    pub const fn mark(&self) -> usize {
        self.next
    }

    /// Returns every slot allocated since `mark`.
    #[must_use]
    pub const fn range_since(&self, mark: usize) -> RegisterRange {
        RegisterRange::new(mark, self.next - mark)
    }

    /// Returns the number of local registers a frame needs.
    #[must_use]
    pub const fn frame_size(&self) -> usize {
        self.next
    }
}

/// Allocator for the global register namespace.
///
/// Global slots hold values bound before a job starts, such as external
/// variables. The allocator remembers each slot's name so the host can bind
/// values by name.
#[derive(Debug, Default, Clone)]
pub struct GlobalRegisterAllocator {
    names: Vec<String>,
}

impl GlobalRegisterAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Reserves a slot for `name`. Declaring the same name twice returns
    /// the slot reserved the first time.
    pub fn allocate(&mut self, name: impl Into<String>) -> usize {
        let name = name.into();
        if let Some(index) = self.lookup(&name) {
            return index;
        }
        self.names.push(name);
        self.names.len() - 1
    }

    /// Returns the slot reserved for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no slots were reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the slot names, indexed by slot.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
