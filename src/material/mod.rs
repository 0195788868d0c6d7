//! Shader property ids and the minimal material model parameter textures bind into.

pub mod property;

pub use property::PropertyId;

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::foundation::core::TextureHandle;

/// A material instance: name, enabled shader keywords, and texture bindings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Material {
    name: String,
    keywords: SmallVec<[String; 4]>,
    textures: BTreeMap<PropertyId, TextureHandle>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Derive a keyed variant of a base material, e.g. `UIDissolve_1234`.
    pub fn variant(base: &str, hash: u64) -> Self {
        Self::new(format!("{base}_{hash}"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enable_keyword(&mut self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        if !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
    }

    pub fn is_keyword_enabled(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    pub fn set_texture(&mut self, property: PropertyId, texture: TextureHandle) {
        self.textures.insert(property, texture);
    }

    pub fn texture(&self, property: PropertyId) -> Option<TextureHandle> {
        self.textures.get(&property).copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/material/material.rs"]
mod tests;
