//! Order-preserving collection of outcomes.
//!
//! Units of work finish in any order. The [`ResultCollector`] stores each
//! outcome in the slot of the batch index it was launched for, and hands out
//! the outcomes in input order once the batch is done.
use crate::{ErrorKind, Outcome, Result};

/// Collects the outcomes of one batch, keyed by batch index
#[derive(Debug)]
pub struct ResultCollector<T> {
    slots: Vec<Option<Outcome<T>>>,
    completed: usize,
}

impl<T> ResultCollector<T> {
    /// Create a collector for a batch of `len` requests
    #[must_use]
    pub fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self {
            slots,
            completed: 0,
        }
    }

    /// Size of the batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` for an empty batch
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of outcomes recorded so far
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Store the outcome of the request at `index`.
    ///
    /// # Errors
    ///
    /// Recording an index outside of the batch, or recording the same index
    /// twice, indicates a scheduling bug and is reported as an error.
    pub fn record(&mut self, index: usize, outcome: Outcome<T>) -> Result<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ErrorKind::IndexOutOfRange { index, len })?;
        if slot.is_some() {
            return Err(ErrorKind::DuplicateOutcome(index));
        }
        *slot = Some(outcome);
        self.completed += 1;
        Ok(())
    }

    /// Return all outcomes in batch order.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::MissingOutcome`] if any index has no outcome.
    pub fn drain(self) -> Result<Vec<Outcome<T>>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(ErrorKind::MissingOutcome(index)))
            .collect()
    }
}
