//! Stack of experiments being worked on.

use crate::error::{ExperimentError, Result};
use crate::experiment::Experiment;
use std::fmt;

/// Handle to an experiment on an [`ExperimentStack`].
///
/// Handles are never reused within one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// LIFO of active experiments. The top is the one lifecycle calls act on.
#[derive(Debug, Default)]
pub struct ExperimentStack {
    entries: Vec<(Handle, Experiment)>,
    next: u64,
}

impl ExperimentStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, experiment: Experiment) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        self.entries.push((handle, experiment));
        handle
    }

    pub fn pop(&mut self) -> Result<(Handle, Experiment)> {
        self.entries.pop().ok_or(ExperimentError::EmptyStack)
    }

    /// Handle of the top experiment.
    pub fn top_handle(&self) -> Result<Handle> {
        self.entries
            .last()
            .map(|(handle, _)| *handle)
            .ok_or(ExperimentError::EmptyStack)
    }

    pub fn top(&self) -> Result<&Experiment> {
        self.entries
            .last()
            .map(|(_, experiment)| experiment)
            .ok_or(ExperimentError::EmptyStack)
    }

    pub fn top_mut(&mut self) -> Result<&mut Experiment> {
        self.entries
            .last_mut()
            .map(|(_, experiment)| experiment)
            .ok_or(ExperimentError::EmptyStack)
    }

    fn index_of(&self, handle: Handle) -> Result<usize> {
        self.entries
            .iter()
            .position(|(h, _)| *h == handle)
            .ok_or_else(|| ExperimentError::NotFound(format!("experiment {}", handle)))
    }

    pub fn get(&self, handle: Handle) -> Result<&Experiment> {
        let index = self.index_of(handle)?;
        Ok(&self.entries[index].1)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut Experiment> {
        let index = self.index_of(handle)?;
        Ok(&mut self.entries[index].1)
    }

    /// Borrow two distinct experiments at once, the first mutably.
    pub fn pair_mut(&mut self, first: Handle, second: Handle) -> Result<(&mut Experiment, &Experiment)> {
        let i = self.index_of(first)?;
        let j = self.index_of(second)?;
        if i == j {
            return Err(ExperimentError::InvalidValue(format!(
                "experiment {} cannot be borrowed twice",
                first
            )));
        }
        if i < j {
            let (head, tail) = self.entries.split_at_mut(j);
            Ok((&mut head[i].1, &tail[0].1))
        } else {
            let (head, tail) = self.entries.split_at_mut(i);
            Ok((&mut tail[0].1, &head[j].1))
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.index_of(handle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stack() {
        let mut stack = ExperimentStack::new();
        assert!(matches!(stack.top(), Err(ExperimentError::EmptyStack)));
        assert!(matches!(stack.pop(), Err(ExperimentError::EmptyStack)));
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = ExperimentStack::new();
        let a = stack.push(Experiment::new());
        let b = stack.push(Experiment::new());
        assert_ne!(a, b);
        assert_eq!(stack.top_handle().unwrap(), b);

        assert_eq!(stack.pop().unwrap().0, b);
        assert_eq!(stack.top_handle().unwrap(), a);
        assert!(!stack.contains(b));

        // Handles are not reused after a pop.
        let c = stack.push(Experiment::new());
        assert_ne!(c, b);
    }

    #[test]
    fn test_pair_mut() {
        let mut stack = ExperimentStack::new();
        let a = stack.push(Experiment::new());
        let b = stack.push(Experiment::new());

        assert!(stack.pair_mut(a, b).is_ok());
        assert!(stack.pair_mut(b, a).is_ok());
        assert!(stack.pair_mut(a, a).is_err());
    }
}
