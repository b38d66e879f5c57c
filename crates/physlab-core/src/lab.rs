//! Lab context: a storage backend plus the stack of experiments in use.

use crate::error::{ExperimentError, Result};
use crate::experiment::{Experiment, OpenMode, ReadOutcome};
use crate::format::ExperimentType;
use crate::merge::{self, RemapTable};
use crate::position::Position;
use crate::stack::{ExperimentStack, Handle};
use crate::storage::Storage;
use std::path::PathBuf;

/// Options for [`Lab::write`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Also write a copy here (`.sav` is appended when missing).
    pub extra_path: Option<PathBuf>,
    /// Keep the experiment open and on the stack after writing.
    pub no_pop: bool,
}

/// How a session finishes when its closure succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionEnd {
    #[default]
    Write,
    Delete,
    Exit,
}

/// Options for [`Lab::session`].
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub experiment_type: ExperimentType,
    /// Always create, replacing an existing save of the same name.
    pub force_create: bool,
    /// Read saved elements and wires before running the closure.
    pub read: bool,
    /// Turn on grid mode before running the closure.
    pub grid: bool,
    pub end: SessionEnd,
    pub extra_path: Option<PathBuf>,
}

/// Owns a storage backend and the experiments currently being worked on.
///
/// Opening or creating pushes onto the stack; `write`, `delete` and `exit`
/// act on the top experiment and pop it.
pub struct Lab<S: Storage> {
    storage: S,
    stack: ExperimentStack,
}

impl<S: Storage> Lab<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            stack: ExperimentStack::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn stack(&self) -> &ExperimentStack {
        &self.stack
    }

    /// Open an existing save and push it.
    pub fn open(&mut self, target: &str, mode: OpenMode) -> Result<Handle> {
        let mut experiment = Experiment::new();
        experiment.open(&self.storage, target, mode)?;
        Ok(self.stack.push(experiment))
    }

    /// Create a new experiment and push it.
    pub fn crt(&mut self, name: &str, experiment_type: ExperimentType, force: bool) -> Result<Handle> {
        let mut experiment = Experiment::new();
        experiment.crt(&self.storage, name, experiment_type, force)?;
        Ok(self.stack.push(experiment))
    }

    /// Open the save named `name`, or create it if there is none.
    pub fn open_or_crt(&mut self, name: &str, experiment_type: ExperimentType) -> Result<Handle> {
        match self.open(name, OpenMode::ByName) {
            Err(ExperimentError::NotFound(_)) => self.crt(name, experiment_type, false),
            other => other,
        }
    }

    pub fn top(&self) -> Result<&Experiment> {
        self.stack.top()
    }

    pub fn top_mut(&mut self) -> Result<&mut Experiment> {
        self.stack.top_mut()
    }

    pub fn get(&self, handle: Handle) -> Result<&Experiment> {
        self.stack.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut Experiment> {
        self.stack.get_mut(handle)
    }

    /// Read the top experiment's saved state.
    pub fn read(&mut self) -> Result<ReadOutcome> {
        self.stack.top_mut()?.read()
    }

    /// Write the top experiment and pop it unless `no_pop`.
    pub fn write(&mut self, options: WriteOptions) -> Result<()> {
        let experiment = self.stack.top_mut()?;
        experiment.write(&self.storage, options.extra_path.as_deref(), options.no_pop)?;
        if !options.no_pop {
            self.stack.pop()?;
        }
        Ok(())
    }

    /// Delete the top experiment's save and pop it.
    pub fn delete(&mut self) -> Result<()> {
        self.stack.top_mut()?.delete(&self.storage)?;
        self.stack.pop()?;
        Ok(())
    }

    /// Pop the top experiment without saving.
    ///
    /// An experiment already finished through `top_mut` or `get_mut` is
    /// popped as it is.
    pub fn exit(&mut self) -> Result<()> {
        let experiment = self.stack.top_mut()?;
        if experiment.is_open() {
            experiment.exit()?;
        }
        self.stack.pop()?;
        Ok(())
    }

    /// Merge `source` into `destination`. Merging an experiment into itself does nothing.
    pub fn merge(
        &mut self,
        destination: Handle,
        source: Handle,
        offset: Position,
        use_grid: bool,
    ) -> Result<RemapTable> {
        if destination == source {
            self.stack.get(destination)?;
            return Ok(RemapTable::new());
        }
        let (destination, source) = self.stack.pair_mut(destination, source)?;
        merge::merge(destination, source, offset, use_grid)
    }

    /// Run `f` against the experiment named `name`.
    ///
    /// The experiment is opened (or created), optionally read and switched
    /// to grid mode. If `f` fails the experiment is exited and the error
    /// returned; otherwise it is finished as `options.end` says.
    pub fn session<T, F>(&mut self, name: &str, options: SessionOptions, f: F) -> Result<T>
    where
        F: FnOnce(&mut Experiment) -> Result<T>,
    {
        if options.force_create {
            self.crt(name, options.experiment_type, true)?;
        } else {
            self.open_or_crt(name, options.experiment_type)?;
        }

        let prepared = (|| -> Result<()> {
            let experiment = self.stack.top_mut()?;
            if options.read {
                experiment.read()?;
            }
            if options.grid {
                experiment.set_grid_mode(true)?;
            }
            Ok(())
        })();

        let value = match prepared.and_then(|()| f(self.stack.top_mut()?)) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Session on \"{}\" failed: {}", name, e);
                if let Err(exit_error) = self.exit() {
                    log::warn!("Could not exit \"{}\": {}", name, exit_error);
                }
                return Err(e);
            }
        };

        if !self.stack.top()?.is_open() {
            log::debug!("Session on \"{}\" finished its experiment early", name);
            self.stack.pop()?;
            return Ok(value);
        }
        match options.end {
            SessionEnd::Write => self.write(WriteOptions {
                extra_path: options.extra_path,
                no_pop: false,
            })?,
            SessionEnd::Delete => self.delete()?,
            SessionEnd::Exit => self.exit()?,
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, PinRef};
    use crate::experiment::LifecycleState;
    use crate::format::Envelope;
    use crate::storage::{FileStorage, MemoryStorage};
    use crate::wire::WireColor;
    use serde_json::Value;
    use tempfile::tempdir;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn memory_lab() -> Lab<MemoryStorage> {
        init_logger();
        Lab::new(MemoryStorage::new())
    }

    #[test]
    fn test_empty_stack_errors() {
        let mut lab = memory_lab();
        assert!(matches!(lab.read(), Err(ExperimentError::EmptyStack)));
        assert!(matches!(lab.write(WriteOptions::default()), Err(ExperimentError::EmptyStack)));
        assert!(matches!(lab.exit(), Err(ExperimentError::EmptyStack)));
    }

    #[test]
    fn test_scenario_test1() {
        init_logger();
        let dir = tempdir().unwrap();
        let mut lab = Lab::new(FileStorage::new(dir.path()).unwrap());

        lab.crt("Test1", ExperimentType::Circuit, false).unwrap();
        {
            let exp = lab.top_mut().unwrap();
            exp.set_grid_mode(true).unwrap();
            let input = exp.place(ElementKind::LogicInput, Position::new(0.0, 0.0, 0.0)).unwrap();
            let source = input.pin_named("o").unwrap();
            let output = exp.place(ElementKind::LogicOutput, Position::new(0.0, 0.0, 1.0)).unwrap();
            let target = output.pin_named("i").unwrap();
            exp.connect(source, target, WireColor::Blue).unwrap();
        }
        lab.write(WriteOptions::default()).unwrap();
        assert!(lab.stack().is_empty());

        lab.open("Test1", OpenMode::ByName).unwrap();
        assert_eq!(lab.read().unwrap(), ReadOutcome::Loaded { elements: 2, wires: 1 });
        let exp = lab.top().unwrap();
        assert_eq!(exp.count_elements(), 2);
        assert_eq!(exp.count_wires(), 1);

        let text = std::fs::read_to_string(exp.path()).unwrap();
        let envelope = Envelope::parse(&text).unwrap();
        let status: Value = serde_json::from_str(&envelope.experiment.status_save).unwrap();
        assert_eq!(status["Wires"][0]["ColorName"], "蓝色导线");
        assert_eq!(status["Elements"].as_array().unwrap().len(), 2);
        assert_eq!(envelope.internal_name, "Test1");
    }

    #[test]
    fn test_empty_roundtrip() {
        let mut lab = memory_lab();
        lab.crt("Empty", ExperimentType::Circuit, false).unwrap();
        lab.write(WriteOptions::default()).unwrap();

        lab.open("Empty", OpenMode::ByName).unwrap();
        assert_eq!(lab.read().unwrap(), ReadOutcome::Loaded { elements: 0, wires: 0 });
        assert_eq!(lab.top().unwrap().count_elements(), 0);
        assert_eq!(lab.top().unwrap().count_wires(), 0);
    }

    #[test]
    fn test_second_read_warns() {
        let mut lab = memory_lab();
        lab.crt("Twice", ExperimentType::Circuit, false).unwrap();
        lab.top_mut()
            .unwrap()
            .place(ElementKind::Resistor, Position::ORIGIN)
            .unwrap();
        lab.write(WriteOptions::default()).unwrap();

        lab.open("Twice", OpenMode::ByName).unwrap();
        assert!(!lab.read().unwrap().is_warning());
        let outcome = lab.read().unwrap();
        assert_eq!(outcome, ReadOutcome::AlreadyRead);
        assert!(outcome.is_warning());
        assert_eq!(lab.top().unwrap().count_elements(), 1);
    }

    #[test]
    fn test_open_or_crt() {
        let mut lab = memory_lab();
        let first = lab.open_or_crt("Either", ExperimentType::Circuit).unwrap();
        assert_eq!(lab.get(first).unwrap().state(), LifecycleState::Created);
        lab.write(WriteOptions::default()).unwrap();

        let second = lab.open_or_crt("Either", ExperimentType::Circuit).unwrap();
        assert_eq!(lab.get(second).unwrap().state(), LifecycleState::Opened);
    }

    #[test]
    fn test_write_no_pop_keeps_top() {
        let mut lab = memory_lab();
        let handle = lab.crt("Keep", ExperimentType::Circuit, false).unwrap();
        lab.write(WriteOptions {
            extra_path: None,
            no_pop: true,
        })
        .unwrap();
        assert_eq!(lab.stack().top_handle().unwrap(), handle);
        lab.exit().unwrap();
        assert!(lab.stack().is_empty());
    }

    #[test]
    fn test_merge_by_handle() {
        let mut lab = memory_lab();
        let a = lab.crt("A", ExperimentType::Circuit, false).unwrap();
        lab.get_mut(a)
            .unwrap()
            .place(ElementKind::AndGate, Position::ORIGIN)
            .unwrap();
        let b = lab.crt("B", ExperimentType::Circuit, false).unwrap();
        let (x, y) = {
            let exp = lab.get_mut(b).unwrap();
            let x = exp.place(ElementKind::LogicInput, Position::ORIGIN).unwrap().id().clone();
            let y = exp
                .place(ElementKind::AndGate, Position::new(0.0, 0.0, 0.1))
                .unwrap()
                .id()
                .clone();
            exp.connect(PinRef::new(x.clone(), 0), PinRef::new(y.clone(), 0), WireColor::Red)
                .unwrap();
            (x, y)
        };

        let remap = lab.merge(a, b, Position::new(0.2, 0.0, 0.0), false).unwrap();
        let merged = lab.get(a).unwrap();
        assert_eq!(merged.count_elements(), 3);
        assert_eq!(merged.element(&remap[&x]).unwrap().position(), Position::new(0.2, 0.0, 0.0));
        assert_eq!(merged.element(&remap[&y]).unwrap().position(), Position::new(0.2, 0.0, 0.1));
        assert_eq!(merged.element_at(Position::ORIGIN).unwrap().kind(), ElementKind::AndGate);
        for wire in merged.wires().iter() {
            assert!(wire.source.element == remap[&x] || wire.source.element == remap[&y]);
            assert!(wire.target.element == remap[&x] || wire.target.element == remap[&y]);
        }

        // Merging into itself is a no-op.
        assert!(lab.merge(a, a, Position::ORIGIN, false).unwrap().is_empty());
        assert_eq!(lab.get(a).unwrap().count_elements(), 3);
    }

    #[test]
    fn test_session_writes() {
        let mut lab = memory_lab();
        let options = SessionOptions {
            grid: true,
            ..SessionOptions::default()
        };
        let count = lab
            .session("Session", options, |exp| {
                exp.place(ElementKind::LogicInput, Position::new(1.0, 0.0, 0.0))?;
                Ok(exp.count_elements())
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(lab.stack().is_empty());

        let reopened = SessionOptions {
            read: true,
            end: SessionEnd::Exit,
            ..SessionOptions::default()
        };
        let position = lab
            .session("Session", reopened, |exp| {
                Ok(exp.registry().iter().next().map(|e| e.position()))
            })
            .unwrap();
        assert_eq!(position, Some(Position::new(0.16, 0.0, 0.0)));
    }

    #[test]
    fn test_session_error_exits() {
        let mut lab = memory_lab();
        let result: Result<()> = lab.session("Broken", SessionOptions::default(), |exp| {
            exp.place(ElementKind::Resistor, Position::ORIGIN)?;
            exp.place(ElementKind::Resistor, Position::ORIGIN)?;
            Ok(())
        });
        assert!(matches!(result, Err(ExperimentError::PositionOccupied(_))));
        assert!(lab.stack().is_empty());
        assert!(lab.storage().list().unwrap().is_empty());
    }

    #[test]
    fn test_exit_pops_finished_top() {
        let mut lab = memory_lab();
        lab.crt("Stuck", ExperimentType::Circuit, false).unwrap();
        lab.top_mut().unwrap().exit().unwrap();
        lab.exit().unwrap();
        assert!(lab.stack().is_empty());

        lab.crt("Written", ExperimentType::Circuit, false).unwrap();
        let storage = MemoryStorage::new();
        lab.top_mut().unwrap().write(&storage, None, false).unwrap();
        lab.exit().unwrap();
        assert!(lab.stack().is_empty());
    }

    #[test]
    fn test_session_keeps_closure_error() {
        let mut lab = memory_lab();
        let result: Result<()> = lab.session("Boom", SessionOptions::default(), |exp| {
            exp.exit()?;
            Err(ExperimentError::InvalidValue("boom".to_string()))
        });
        assert!(matches!(result, Err(ExperimentError::InvalidValue(ref msg)) if msg == "boom"));
        assert!(lab.stack().is_empty());
    }

    #[test]
    fn test_session_finished_in_closure() {
        let mut lab = memory_lab();
        let value = lab
            .session("Early", SessionOptions::default(), |exp| {
                exp.exit()?;
                Ok(7)
            })
            .unwrap();
        assert_eq!(value, 7);
        assert!(lab.stack().is_empty());
        assert!(lab.storage().list().unwrap().is_empty());
    }

    #[test]
    fn test_session_delete() {
        let mut lab = memory_lab();
        lab.session("Gone", SessionOptions::default(), |_| Ok(())).unwrap();
        assert_eq!(lab.storage().list().unwrap().len(), 1);

        let options = SessionOptions {
            end: SessionEnd::Delete,
            ..SessionOptions::default()
        };
        lab.session("Gone", options, |_| Ok(())).unwrap();
        assert!(lab.storage().list().unwrap().is_empty());
    }
}
