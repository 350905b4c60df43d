//! Read-only model catalog built once per run.
//!
//! Models are stored in catalog document order, with an index from key to
//! position for exact lookups. Nothing mutates the catalog after
//! construction; the query pipeline works on borrowed views.

use std::collections::HashMap;

use serde_json::Value;

use super::{
    CatalogError,
    model::NormalizedModel,
    types::{CatalogDocument, RawCatalogEntry},
};

/// The normalized catalog: `key → NormalizedModel`, in document order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    models: Vec<NormalizedModel>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and normalize a catalog JSON document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Normalize an already parsed catalog document of either shape.
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let document = CatalogDocument::from_value(value)?;
        Ok(Self::from_document(document))
    }

    /// Flatten a classified document.
    pub fn from_document(document: CatalogDocument) -> Self {
        let mut catalog = Self::new();
        let entries = document.entry_count();

        match document {
            CatalogDocument::Nested(providers) => {
                for (provider_id, provider) in providers {
                    for (model_id, entry) in provider.models {
                        let id = entry
                            .id
                            .clone()
                            .filter(|id| !id.is_empty())
                            .unwrap_or(model_id);
                        // Providers re-host the same model ids ("o3" on openai
                        // and azure), so the provider is part of the key.
                        let key = format!("{provider_id}/{id}");
                        catalog.insert(NormalizedModel::from_raw(
                            key,
                            id,
                            provider_id.clone(),
                            &entry,
                        ));
                    }
                }
            }
            CatalogDocument::Flat(entries) => {
                for (name, entry) in entries {
                    catalog.insert(flat_model(name, &entry));
                }
            }
        }

        tracing::debug!(entries, models = catalog.len(), "Catalog normalized");
        catalog
    }

    /// Insert a model. The first model seen for a key wins.
    pub fn insert(&mut self, model: NormalizedModel) {
        if self.by_key.contains_key(&model.key) {
            tracing::warn!(key = %model.key, "Duplicate catalog key, keeping first entry");
            return;
        }
        self.by_key.insert(model.key.clone(), self.models.len());
        self.models.push(model);
    }

    /// Exact key lookup.
    pub fn get(&self, key: &str) -> Option<&NormalizedModel> {
        self.by_key.get(key).map(|&idx| &self.models[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedModel> {
        self.models.iter()
    }

    pub fn models(&self) -> &[NormalizedModel] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<NormalizedModel> for Catalog {
    fn from_iter<I: IntoIterator<Item = NormalizedModel>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for model in iter {
            catalog.insert(model);
        }
        catalog
    }
}

fn flat_model(name: String, entry: &RawCatalogEntry) -> NormalizedModel {
    let id = entry
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| name.clone());
    let provider = entry.provider.clone().unwrap_or_default();
    NormalizedModel::from_raw(name, id, provider, entry)
}
