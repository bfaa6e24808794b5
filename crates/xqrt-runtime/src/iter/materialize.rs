//! Sequence materialization.
//!
//! Turns a lazy iterator into a [`Sequence`] that can be read any number of
//! times. Items keep their pull order and duplicates are preserved.

use tracing::trace;
use xqrt_core::{ErrorCode, Item, Sequence};

use super::RuntimeIterator;
use crate::error::{RuntimeError, RuntimeResult};
use crate::frame::Frame;

/// Drains an open iterator into a sequence.
///
/// The iterator is closed on every exit path, including errors.
///
/// # Errors
///
/// Propagates errors from the iterator, and returns `XQRT0001` if the
/// result exceeds `max_materialized_items`.
pub fn drain<I>(iter: &I, frame: &mut Frame<'_>) -> RuntimeResult<Sequence>
where
    I: RuntimeIterator + ?Sized,
{
    let result = pull_all(iter, frame);
    iter.close(frame);
    let items = result?;

    frame.record_materialized(items.len());
    trace!(operator = iter.name(), items = items.len(), "materialized sequence");
    Ok(Sequence::from_items(items))
}

/// Opens an iterator and drains it into a sequence.
///
/// # Errors
///
/// See [`drain`]. Errors from `open` are returned after the iterator has
/// been closed.
pub fn materialize<I>(iter: &I, frame: &mut Frame<'_>) -> RuntimeResult<Sequence>
where
    I: RuntimeIterator + ?Sized,
{
    if let Err(err) = iter.open(frame) {
        iter.close(frame);
        return Err(err);
    }
    drain(iter, frame)
}

fn pull_all<I>(iter: &I, frame: &mut Frame<'_>) -> RuntimeResult<Vec<Item>>
where
    I: RuntimeIterator + ?Sized,
{
    let chunk_size = frame.config().chunk_size.max(1);
    let limit = frame.config().max_materialized_items;

    let mut items: Vec<Item> = Vec::new();
    while let Some(item) = iter.next(frame)? {
        if limit != 0 && items.len() >= limit {
            return Err(RuntimeError::dynamic(
                ErrorCode::XQRT0001,
                iter.name(),
                format!("sequence too large: more than {limit} items"),
            ));
        }
        if items.len() == items.capacity() {
            items.reserve(chunk_size);
        }
        items.push(item);
    }
    Ok(items)
}
