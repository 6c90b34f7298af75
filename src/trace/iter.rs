use core::{iter::FusedIterator, slice};

use crate::Frame;

/// A forward iterator over recorded frames, oldest first.
///
/// The iterator only moves forward; it offers no indexing and cannot be
/// reversed.
#[must_use]
#[derive(Clone)]
pub struct FrameIter<'a> {
    inner: slice::Iter<'a, Frame>,
}

impl<'a> FrameIter<'a> {
    pub(crate) fn new(frames: &'a [Frame]) -> Self {
        Self {
            inner: frames.iter(),
        }
    }
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = &'a Frame;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for FrameIter<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl FusedIterator for FrameIter<'_> {}

impl core::fmt::Debug for FrameIter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.inner.clone()).finish()
    }
}
