//! Bucket alias and assortment catalogs.
//!
//! The catalog is loaded once at startup and shared read-only by every
//! request. Aliases decouple the public URL namespace from storage topology;
//! assortments group the named sizes a client may ask for.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::resize::parse_size;

/// Immutable snapshot of alias and assortment tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Public alias -> backing bucket name
    #[serde(default)]
    pub buckets: HashMap<String, String>,

    /// Assortment -> size name -> `"<width>x<height>"`
    #[serde(default)]
    pub assortments: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bucket alias.
    pub fn with_bucket(mut self, alias: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.buckets.insert(alias.into(), bucket.into());
        self
    }

    /// Add a named size to an assortment, creating the assortment if needed.
    pub fn with_size(
        mut self,
        assortment: impl Into<String>,
        size_name: impl Into<String>,
        spec: impl Into<String>,
    ) -> Self {
        self.assortments
            .entry(assortment.into())
            .or_default()
            .insert(size_name.into(), spec.into());
        self
    }

    /// Look up the bucket behind an alias.
    pub fn bucket(&self, alias: &str) -> Option<&str> {
        self.buckets.get(alias).map(String::as_str)
    }

    /// Look up the sizes of an assortment.
    pub fn sizes(&self, assortment: &str) -> Option<&HashMap<String, String>> {
        self.assortments.get(assortment)
    }

    /// Check that the catalog can serve anything and that every size spec
    /// parses, so bad entries fail at startup rather than per request.
    pub fn validate(&self) -> Result<(), String> {
        if self.buckets.is_empty() {
            return Err("catalog defines no bucket aliases".to_string());
        }

        for (alias, bucket) in &self.buckets {
            if alias.is_empty() || bucket.is_empty() {
                return Err(format!(
                    "bucket alias {:?} -> {:?} must be non-empty on both sides",
                    alias, bucket
                ));
            }
        }

        for (assortment, sizes) in &self.assortments {
            for (size_name, spec) in sizes {
                parse_size(spec).map_err(|e| {
                    format!("assortment {:?}, size {:?}: {}", assortment, size_name, e)
                })?;
            }
        }

        Ok(())
    }
}
