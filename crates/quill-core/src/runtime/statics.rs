//! Static field storage and the lazily-run static initializer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{Invoker, RuntimeError, Value};

/// Progress of a type's static initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    NotRun,
    /// The initializer is executing; re-entrant static access sees partial state.
    Running,
    Done,
    Failed,
}

/// Static slots of one type, shared by its member handles and the materialized type.
///
/// The initializer is installed when the type is created and runs once, on the
/// first static access or instantiation afterwards. The storage also carries the
/// type's usability: once a failed `create` marks it unusable, every static
/// access and every method call through a handle of the type fails.
#[derive(Debug)]
pub struct StaticStorage {
    type_name: String,
    values: RefCell<Vec<Value>>,
    initializer: RefCell<Option<InitializerFn>>,
    state: Cell<InitState>,
    usable: Cell<bool>,
}

struct InitializerFn(Invoker);

impl std::fmt::Debug for InitializerFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InitializerFn")
    }
}

impl StaticStorage {
    pub fn new(type_name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            type_name: type_name.into(),
            values: RefCell::new(Vec::new()),
            initializer: RefCell::new(None),
            state: Cell::new(InitState::NotRun),
            usable: Cell::new(true),
        })
    }

    /// Reserve a new slot holding `default`, returning its index.
    pub fn allocate(&self, default: Value) -> usize {
        let mut values = self.values.borrow_mut();
        values.push(default);
        values.len() - 1
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> InitState {
        self.state.get()
    }

    pub fn is_usable(&self) -> bool {
        self.usable.get()
    }

    pub fn mark_unusable(&self) {
        self.usable.set(false);
    }

    pub fn check_usable(&self) -> Result<(), RuntimeError> {
        if self.is_usable() {
            Ok(())
        } else {
            Err(RuntimeError::TypeUnusable {
                type_name: self.type_name.clone(),
            })
        }
    }

    pub fn has_initializer(&self) -> bool {
        self.initializer.borrow().is_some()
    }

    /// Install the closed static initializer. Only the first installation counts.
    pub fn install_initializer(&self, init: Invoker) {
        let mut slot = self.initializer.borrow_mut();
        if slot.is_none() {
            *slot = Some(InitializerFn(init));
        }
    }

    /// Run the static initializer if it is installed and has not run yet.
    pub fn ensure_initialized(&self) -> Result<(), RuntimeError> {
        self.check_usable()?;
        match self.state.get() {
            InitState::Done | InitState::Running => return Ok(()),
            InitState::Failed => {
                return Err(RuntimeError::TypeInitializer {
                    type_name: self.type_name.clone(),
                    message: "a previous initialization attempt failed".to_string(),
                });
            }
            InitState::NotRun => {}
        }

        let init = match self.initializer.borrow().as_ref() {
            Some(InitializerFn(init)) => Rc::clone(init),
            None => return Ok(()),
        };

        self.state.set(InitState::Running);
        match init(&[]) {
            Ok(_) => {
                self.state.set(InitState::Done);
                Ok(())
            }
            Err(err) => {
                self.state.set(InitState::Failed);
                Err(RuntimeError::TypeInitializer {
                    type_name: self.type_name.clone(),
                    message: err.to_string(),
                })
            }
        }
    }

    /// Read a slot, running the static initializer first.
    pub fn read(&self, slot: usize) -> Result<Value, RuntimeError> {
        self.ensure_initialized()?;
        self.values
            .borrow()
            .get(slot)
            .cloned()
            .ok_or_else(|| self.bad_slot(slot))
    }

    /// Write a slot, running the static initializer first.
    pub fn write(&self, slot: usize, value: Value) -> Result<(), RuntimeError> {
        self.ensure_initialized()?;
        let mut values = self.values.borrow_mut();
        let target = values.get_mut(slot).ok_or_else(|| self.bad_slot(slot))?;
        *target = value;
        Ok(())
    }

    fn bad_slot(&self, slot: usize) -> RuntimeError {
        RuntimeError::Custom {
            message: format!("static slot {slot} out of range for '{}'", self.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker;

    #[test]
    fn slots_start_at_their_default() {
        let storage = StaticStorage::new("T");
        let slot = storage.allocate(Value::Int32(0));
        assert_eq!(storage.read(slot).unwrap(), Value::Int32(0));
    }

    #[test]
    fn initializer_runs_once_on_first_access() {
        let storage = StaticStorage::new("T");
        let slot = storage.allocate(Value::Null);
        let runs = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&storage);
        let counter = Rc::clone(&runs);
        storage.install_initializer(invoker(move |_| {
            counter.set(counter.get() + 1);
            if let Some(storage) = weak.upgrade() {
                storage.write(slot, Value::string("hello"))?;
            }
            Ok(Value::Void)
        }));

        assert_eq!(storage.state(), InitState::NotRun);
        assert_eq!(storage.read(slot).unwrap(), Value::string("hello"));
        assert_eq!(storage.read(slot).unwrap(), Value::string("hello"));
        assert_eq!(runs.get(), 1);
        assert_eq!(storage.state(), InitState::Done);
    }

    #[test]
    fn failed_initializer_poisons_storage() {
        let storage = StaticStorage::new("T");
        let slot = storage.allocate(Value::Null);
        storage.install_initializer(invoker(|_| Err(RuntimeError::DivisionByZero)));

        let err = storage.read(slot).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeInitializer { .. }));
        assert_eq!(storage.state(), InitState::Failed);
        assert!(storage.read(slot).is_err());
    }

    #[test]
    fn storage_without_initializer_stays_not_run() {
        let storage = StaticStorage::new("T");
        let slot = storage.allocate(Value::Int64(0));
        storage.write(slot, Value::Int64(5)).unwrap();
        assert_eq!(storage.read(slot).unwrap(), Value::Int64(5));
        assert_eq!(storage.state(), InitState::NotRun);
    }

    #[test]
    fn unusable_storage_skips_initializer() {
        let storage = StaticStorage::new("T");
        let slot = storage.allocate(Value::Int32(1));
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        storage.install_initializer(invoker(move |_| {
            counter.set(counter.get() + 1);
            Ok(Value::Void)
        }));
        storage.mark_unusable();

        assert!(matches!(
            storage.read(slot).unwrap_err(),
            RuntimeError::TypeUnusable { .. }
        ));
        assert!(storage.write(slot, Value::Int32(2)).is_err());
        assert_eq!(runs.get(), 0);
        assert_eq!(storage.state(), InitState::NotRun);
    }
}
