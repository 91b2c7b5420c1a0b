//! Container configuration.

use std::path::PathBuf;

/// Whether the dynamic assembly may be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblyAccess {
    /// Types can be created and used but not saved.
    #[default]
    Run,
    /// Types can additionally be saved as a manifest.
    RunAndSave,
}

/// Options for an [`AssemblyContainer`](crate::AssemblyContainer).
///
/// ```
/// use quill_emit::{AssemblyAccess, ContainerOptions};
///
/// let options = ContainerOptions::new()
///     .with_assembly_name("Scripts")
///     .with_access(AssemblyAccess::RunAndSave);
/// assert_eq!(options.assembly_name, "Scripts");
/// assert_eq!(options.module_name, "QuillDynamic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOptions {
    pub assembly_name: String,
    pub module_name: String,
    pub access: AssemblyAccess,
    /// Directory the manifest is written to on save.
    pub output_dir: PathBuf,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            assembly_name: "QuillDynamic".to_string(),
            module_name: "QuillDynamic".to_string(),
            access: AssemblyAccess::Run,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assembly_name(mut self, name: impl Into<String>) -> Self {
        self.assembly_name = name.into();
        self
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_access(mut self, access: AssemblyAccess) -> Self {
        self.access = access;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
