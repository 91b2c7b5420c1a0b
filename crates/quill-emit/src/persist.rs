//! Saving the dynamic module as a JSON manifest.

use std::fs;
use std::path::PathBuf;

use quill_core::{DataType, MemberAttributes, PersistenceError, TypeHash, TypeRef};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::options::{AssemblyAccess, ContainerOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyManifest {
    pub assembly: String,
    pub module: String,
    pub types: Vec<TypeManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeManifest {
    pub name: String,
    pub hash: u64,
    pub attributes: Vec<String>,
    pub base: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldManifest>,
    pub methods: Vec<MethodManifest>,
    pub constructors: Vec<Vec<String>>,
    pub properties: Vec<FieldManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodManifest {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: String,
    pub attributes: Vec<String>,
    pub has_body: bool,
}

fn flag_names<F: bitflags::Flags>(flags: F) -> Vec<String> {
    flags.iter_names().map(|(name, _)| name.to_string()).collect()
}

/// Names of the object types a manifest may mention, by hash.
struct TypeNames(FxHashMap<TypeHash, String>);

impl TypeNames {
    fn collect(types: &[TypeRef]) -> Self {
        let mut names = FxHashMap::default();
        for ty in types {
            let related = ty.base().into_iter().chain(ty.interfaces());
            for known in std::iter::once(ty).chain(related) {
                names.insert(known.type_hash(), known.name().to_string());
            }
        }
        Self(names)
    }

    /// The declared name of an object type, or the primitive's name.
    fn of(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Object(hash) => self
                .0
                .get(hash)
                .cloned()
                .unwrap_or_else(|| data_type.name()),
            _ => data_type.name(),
        }
    }

    fn all(&self, params: &[DataType]) -> Vec<String> {
        params.iter().map(|param| self.of(param)).collect()
    }
}

impl AssemblyManifest {
    pub fn build(options: &ContainerOptions, types: &[TypeRef]) -> Self {
        let names = TypeNames::collect(types);
        Self {
            assembly: options.assembly_name.clone(),
            module: options.module_name.clone(),
            types: types.iter().map(|ty| TypeManifest::from_type(ty, &names)).collect(),
        }
    }
}

impl TypeManifest {
    fn from_type(ty: &TypeRef, names: &TypeNames) -> Self {
        let visible = |attributes: MemberAttributes| !attributes.contains(MemberAttributes::HIDDEN);
        Self {
            name: ty.name().to_string(),
            hash: ty.type_hash().0,
            attributes: flag_names(ty.attributes()),
            base: ty.base().map(|base| base.name().to_string()),
            interfaces: ty.interfaces().iter().map(|i| i.name().to_string()).collect(),
            fields: ty
                .fields()
                .iter()
                .filter(|field| visible(field.attributes))
                .map(|field| FieldManifest {
                    name: field.name.clone(),
                    data_type: names.of(&field.data_type),
                    attributes: flag_names(field.attributes),
                })
                .collect(),
            methods: ty
                .methods()
                .iter()
                .map(|method| MethodManifest {
                    name: method.name.clone(),
                    params: names.all(&method.params),
                    return_type: names.of(&method.return_type),
                    attributes: flag_names(method.attributes),
                    has_body: method.has_body,
                })
                .collect(),
            constructors: ty
                .constructors()
                .iter()
                .map(|ctor| names.all(&ctor.params))
                .collect(),
            properties: ty
                .properties()
                .iter()
                .map(|prop| FieldManifest {
                    name: prop.name.clone(),
                    data_type: names.of(&prop.data_type),
                    attributes: flag_names(prop.attributes),
                })
                .collect(),
        }
    }
}

/// Write `<output_dir>/<module_name>.json`.
pub fn save(options: &ContainerOptions, types: &[TypeRef]) -> Result<PathBuf, PersistenceError> {
    if options.access == AssemblyAccess::Run {
        return Err(PersistenceError::Forbidden {
            assembly: options.assembly_name.clone(),
        });
    }
    if types.is_empty() {
        return Err(PersistenceError::NothingToSave);
    }

    let manifest = AssemblyManifest::build(options, types);
    let json = serde_json::to_string_pretty(&manifest).map_err(|err| PersistenceError::Encode {
        message: err.to_string(),
    })?;

    fs::create_dir_all(&options.output_dir)?;
    let path = options.output_dir.join(format!("{}.json", options.module_name));
    fs::write(&path, json)?;
    info!(path = %path.display(), types = types.len(), "saved assembly manifest");
    Ok(path)
}
