// Format-agnostic repository of surface materials.
// Map surfaces and the wall engine refer to materials through `MaterialId` only.

use std::collections::HashMap;

/// Runtime handle for a material in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type MaterialId = u16;

/// The properties of a material the wall engine cares about.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// `false` for masked textures with see-through texels.
    pub opaque: bool,
    /// Replaced by the sky renderer.
    pub sky_masked: bool,
}

impl Material {
    /// A plain opaque wall material.
    pub fn solid(name: impl Into<String>, width: f32, height: f32) -> Self {
        Material {
            name: name.into(),
            width,
            height,
            opaque: true,
            sky_masked: false,
        }
    }

    /// A masked (see-through) material, e.g. a grate or force field.
    pub fn masked(name: impl Into<String>, width: f32, height: f32) -> Self {
        Material {
            opaque: false,
            ..Material::solid(name, width, height)
        }
    }

    /// The sky flat.
    pub fn sky(name: impl Into<String>) -> Self {
        Material {
            sky_masked: true,
            ..Material::solid(name, 64.0, 64.0)
        }
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MaterialError {
    /// Attempted to insert a second material with an existing name.
    #[error("material name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("material id {0} out of range")]
    BadId(MaterialId),
}

/// A cache of materials keyed by name.
///
/// * Stores exactly one copy of every name.
/// * Ids are handed out densely from 0.
#[derive(Debug, Default)]
pub struct MaterialBank {
    by_name: HashMap<String, MaterialId>,
    data: Vec<Material>,
}

impl MaterialBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of materials stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Obtain the id for a material by name.
    pub fn id(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    /// Borrow a material by id, with bounds-checking.
    pub fn material(&self, id: MaterialId) -> Result<&Material, MaterialError> {
        self.data.get(id as usize).ok_or(MaterialError::BadId(id))
    }

    /// Insert `mat` under its own name.
    ///
    /// * Returns the newly assigned `MaterialId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert(&mut self, mat: Material) -> Result<MaterialId, MaterialError> {
        if self.by_name.contains_key(&mat.name) {
            return Err(MaterialError::Duplicate(mat.name));
        }
        let id = self.data.len() as MaterialId;
        self.by_name.insert(mat.name.clone(), id);
        self.data.push(mat);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
