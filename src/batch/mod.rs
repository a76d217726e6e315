//! Lazy fixed-size batching over any iterator.
//!
//! [`batched`] pulls one element at a time from the source and only keeps the
//! batch currently being filled in memory, so it works on unbounded or
//! streaming sources (generated records, rows read from disk).

use crate::error::{Error, Result};
use std::iter::FusedIterator;

/// Iterator adapter yielding `Vec`s of up to `size` elements in source order.
///
/// Consumes its source once; once the source is exhausted it keeps returning
/// `None` even if the source itself is not fused.
#[derive(Debug)]
pub struct Batched<I: Iterator> {
    iter: I,
    size: usize,
    done: bool,
}

impl<I: Iterator> Batched<I> {
    pub fn batch_size(&self) -> usize {
        self.size
    }
}

impl<I: Iterator> Iterator for Batched<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.size.min(4096));
        while batch.len() < self.size {
            match self.iter.next() {
                Some(item) => batch.push(item),
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let (lo, hi) = self.iter.size_hint();
        (lo.div_ceil(self.size), hi.map(|h| h.div_ceil(self.size)))
    }
}

impl<I: Iterator> FusedIterator for Batched<I> {}

/// Split `iter` into batches of at most `size` elements.
///
/// The last batch holds the remainder; an empty source yields no batches.
/// Fails with [`Error::InvalidArgument`] when `size` is zero, before the
/// source is touched.
pub fn batched<I>(iter: I, size: usize) -> Result<Batched<I::IntoIter>>
where
    I: IntoIterator,
{
    if size == 0 {
        return Err(Error::invalid_argument("batch size must be at least 1"));
    }
    Ok(Batched {
        iter: iter.into_iter(),
        size,
        done: false,
    })
}
