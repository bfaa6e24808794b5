//! Typed register accessors and the global register set.

use std::fmt;
use std::marker::PhantomData;

use xqrt_core::Sequence;

use super::value::{RegisterType, RegisterValue};
use crate::error::{RuntimeError, RuntimeResult};
use crate::frame::Frame;

/// A handle to one frame-local register.
///
/// The handle is an index plus the expected type; it holds no data. Out of
/// range indices panic like a slice index, which cannot happen for handles
/// issued by the plan's allocator.
pub struct LocalRegister<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> LocalRegister<T> {
    /// Creates an accessor for slot `index`.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index, _marker: PhantomData }
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl<T: RegisterType> LocalRegister<T> {
    /// Reads the register. Returns `None` if it does not hold a `T`.
    #[must_use]
    pub fn get<'f>(&self, frame: &'f Frame<'_>) -> Option<&'f T> {
        T::from_register(frame.local(self.index))
    }

    /// Writes the register.
    pub fn set(&self, frame: &mut Frame<'_>, value: T) {
        *frame.local_mut(self.index) = value.into_register();
    }

    /// Removes and returns the value, leaving the slot unset.
    pub fn take(&self, frame: &mut Frame<'_>) -> Option<T> {
        T::take_register(std::mem::take(frame.local_mut(self.index)))
    }

    /// Resets the register to unset.
    pub fn clear(&self, frame: &mut Frame<'_>) {
        *frame.local_mut(self.index) = RegisterValue::Unset;
    }
}

impl<T: RegisterType + Copy> LocalRegister<T> {
    /// Reads a copyable value.
    #[must_use]
    pub fn load(&self, frame: &Frame<'_>) -> Option<T> {
        self.get(frame).copied()
    }
}

impl<T> Clone for LocalRegister<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LocalRegister<T> {}

impl<T> fmt::Debug for LocalRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalRegister({})", self.index)
    }
}

/// A read handle to one global register.
pub struct GlobalRegister<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> GlobalRegister<T> {
    /// Creates an accessor for global slot `index`.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index, _marker: PhantomData }
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl<T: RegisterType> GlobalRegister<T> {
    /// Reads the register through the frame's global set.
    #[must_use]
    pub fn get<'g>(&self, frame: &Frame<'g>) -> Option<&'g T> {
        frame.globals().slot(self.index).and_then(T::from_register)
    }
}

impl<T> Clone for GlobalRegister<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for GlobalRegister<T> {}

impl<T> fmt::Debug for GlobalRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalRegister({})", self.index)
    }
}

/// The global register set of one job.
///
/// Every slot is written at most once, before evaluation starts. Frames only
/// ever hold a shared reference, so nothing can write during evaluation.
#[derive(Debug, Default, Clone)]
pub struct GlobalRegisters {
    slots: Vec<RegisterValue>,
}

impl GlobalRegisters {
    /// Creates a set of `size` unbound slots.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self { slots: vec![RegisterValue::Unset; size] }
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the set has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Binds a sequence to slot `index`.
    ///
    /// # Errors
    ///
    /// Returns a framework error if the slot does not exist or is already
    /// bound.
    pub fn bind(&mut self, index: usize, value: Sequence) -> RuntimeResult<()> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            RuntimeError::framework(format!("global register {index} out of range ({len} slots)"))
        })?;
        if !slot.is_unset() {
            return Err(RuntimeError::framework(format!("global register {index} is already bound")));
        }
        *slot = RegisterValue::Sequence(value);
        Ok(())
    }

    /// Returns true if slot `index` holds a value.
    #[must_use]
    pub fn is_bound(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| !s.is_unset())
    }

    /// Returns the sequence bound to slot `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.slot(index).and_then(Sequence::from_register)
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&RegisterValue> {
        self.slots.get(index)
    }
}
