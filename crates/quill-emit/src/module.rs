//! The dynamic assembly and its single module.

use std::cell::RefCell;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashSet;
use quill_core::{ShapeError, TypeRef};
use tracing::debug;

/// Holds the types materialized by every draft of one container.
///
/// Names are reserved when a draft is opened so two drafts cannot claim the
/// same name; the type itself is only registered once `create` succeeds.
#[derive(Debug)]
pub struct DynamicModule {
    name: String,
    reserved: RefCell<FxHashSet<String>>,
    types: RefCell<Vec<TypeRef>>,
}

impl DynamicModule {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reserved: RefCell::new(FxHashSet::default()),
            types: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn reserve(&self, type_name: &str) -> Result<(), ShapeError> {
        if !self.reserved.borrow_mut().insert(type_name.to_string()) {
            return Err(ShapeError::DuplicateType(type_name.to_string()));
        }
        Ok(())
    }

    pub(crate) fn register(&self, ty: TypeRef) {
        debug!(module = %self.name, type_name = ty.name(), "registered type");
        self.types.borrow_mut().push(ty);
    }

    /// Materialized types in creation order.
    pub fn types(&self) -> Vec<TypeRef> {
        self.types.borrow().clone()
    }

    pub fn find_type(&self, name: &str) -> Option<TypeRef> {
        self.types.borrow().iter().find(|ty| ty.name() == name).cloned()
    }

    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }
}

/// The process-local assembly owning the dynamic module.
#[derive(Debug)]
pub struct DynamicAssembly {
    name: String,
    module_name: String,
    module: OnceCell<Rc<DynamicModule>>,
}

impl DynamicAssembly {
    pub(crate) fn new(name: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_name: module_name.into(),
            module: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module, created on first use.
    pub fn get_or_create_module(&self) -> Rc<DynamicModule> {
        Rc::clone(self.module.get_or_init(|| {
            debug!(assembly = %self.name, module = %self.module_name, "created dynamic module");
            Rc::new(DynamicModule::new(self.module_name.clone()))
        }))
    }

    /// The module if it exists, without creating it.
    pub fn module(&self) -> Option<&Rc<DynamicModule>> {
        self.module.get()
    }
}
