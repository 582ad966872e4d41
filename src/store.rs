//! Document store access
//!
//! The web layer reads two collections: isogeny classes of abelian varieties
//! (`abvar_fq_isog`) and precomputed L-function data (`lfunctions`). The
//! [`DocumentStore`] trait is the seam; [`JsonStore`] keeps both collections
//! in memory, loaded once at start-up from JSON arrays in the data directory.

use crate::error::{LmfdbError, Result};
use crate::models::IsogenyClassRecord;
use crate::search::{lookup_path, Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Collection of abelian-variety isogeny classes
pub const ABVAR_COLLECTION: &str = "abvar_fq_isog";
/// Collection of stored L-function data
pub const LFUNCTION_COLLECTION: &str = "lfunctions";

/// Read-only access to document collections
pub trait DocumentStore: Send + Sync {
    /// Documents matching `query`, in collection order, after skipping `skip`
    /// and returning at most `limit`
    fn find(&self, collection: &str, query: &Query, skip: usize, limit: usize) -> Result<Vec<Value>>;

    /// Number of documents matching `query`
    fn count(&self, collection: &str, query: &Query) -> Result<usize>;

    /// First document whose `field` equals `value`
    fn find_one(&self, collection: &str, field: &str, value: &str) -> Result<Option<Value>>;
}

/// In-memory store of JSON documents
#[derive(Debug, Default)]
pub struct JsonStore {
    collections: HashMap<String, Vec<Value>>,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every known collection from `<data_dir>/<collection>.json`
    ///
    /// A missing file yields an empty collection; a malformed one is an error.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let mut store = JsonStore::new();
        for collection in [ABVAR_COLLECTION, LFUNCTION_COLLECTION] {
            let path = data_dir.as_ref().join(format!("{}.json", collection));
            if !path.exists() {
                warn!("No data file for collection {} at {}", collection, path.display());
                store.insert_collection(collection, Vec::new());
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let docs: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
                LmfdbError::StoreError(format!("{}: {}", path.display(), e))
            })?;
            info!("Loaded {} documents into {}", docs.len(), collection);
            store.insert_collection(collection, docs);
        }
        Ok(store)
    }

    pub fn insert_collection(&mut self, collection: &str, docs: Vec<Value>) {
        self.collections.insert(collection.to_string(), docs);
    }

    fn collection(&self, collection: &str) -> Result<&[Value]> {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| LmfdbError::StoreError(format!("unknown collection {}", collection)))
    }
}

impl DocumentStore for JsonStore {
    fn find(&self, collection: &str, query: &Query, skip: usize, limit: usize) -> Result<Vec<Value>> {
        Ok(self
            .collection(collection)?
            .iter()
            .filter(|doc| query.matches(doc))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, collection: &str, query: &Query) -> Result<usize> {
        Ok(self
            .collection(collection)?
            .iter()
            .filter(|doc| query.matches(doc))
            .count())
    }

    fn find_one(&self, collection: &str, field: &str, value: &str) -> Result<Option<Value>> {
        Ok(self
            .collection(collection)?
            .iter()
            .find(|doc| lookup_path(doc, field).and_then(Value::as_str) == Some(value))
            .cloned())
    }
}

/// Fetch and decode an isogeny class by label
pub fn find_isogeny_class(store: &dyn DocumentStore, label: &str) -> Result<Option<IsogenyClassRecord>> {
    store
        .find_one(ABVAR_COLLECTION, "label", label)?
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| LmfdbError::StoreError(format!("malformed record {}: {}", label, e)))
        })
        .transpose()
}

/// Decode a page of isogeny class documents
pub fn decode_isogeny_classes(docs: Vec<Value>) -> Result<Vec<IsogenyClassRecord>> {
    docs.into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| LmfdbError::StoreError(format!("malformed isogeny class: {}", e)))
        })
        .collect()
}

/// A stored L-function document, keyed by its URL path below `/L/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LfunctionRecord {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    pub degree: u32,
    pub level: u64,
    /// Root number as `[re, im]`; absent when unknown
    #[serde(default)]
    pub sign: Option<[f64; 2]>,
    #[serde(default)]
    pub selfdual: Option<bool>,
    #[serde(default = "default_true")]
    pub primitive: bool,
    #[serde(default)]
    pub algebraic: bool,
    #[serde(default)]
    pub motivic_weight: Option<u32>,
    /// Dirichlet coefficients as `[re, im]` pairs
    #[serde(default)]
    pub dirichlet_coefficients: Vec<[f64; 2]>,
    #[serde(default)]
    pub zeros: Option<Vec<f64>>,
    /// Shown instead of zeros when `zeros` is explicitly empty
    #[serde(default)]
    pub zeros_message: Option<String>,
    #[serde(default)]
    pub plot_points: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub lcalcfile: Option<String>,
    #[serde(default)]
    pub dual_link: Option<String>,
    #[serde(default)]
    pub modform: Option<String>,
    #[serde(default)]
    pub ellipticcurve: Option<String>,
    #[serde(default = "default_true")]
    pub from_db: bool,
    #[serde(default)]
    pub weight: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub group: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Fetch and decode the stored L-function with the given key
pub fn find_lfunction(store: &dyn DocumentStore, key: &str) -> Result<Option<LfunctionRecord>> {
    store
        .find_one(LFUNCTION_COLLECTION, "key", key)?
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| LmfdbError::StoreError(format!("malformed L-function {}: {}", key, e)))
        })
        .transpose()
}

/// Fetch and decode every stored L-function matching `query`
pub fn find_lfunctions(store: &dyn DocumentStore, query: &Query) -> Result<Vec<LfunctionRecord>> {
    store
        .find(LFUNCTION_COLLECTION, query, 0, usize::MAX)?
        .into_iter()
        .map(|doc| {
            serde_json::from_value(doc)
                .map_err(|e| LmfdbError::StoreError(format!("malformed L-function: {}", e)))
        })
        .collect()
}

/// Statistics shown on the abelian-variety index page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AbvarStats {
    /// Field sizes below 50 with at least one class
    pub qs: Vec<u64>,
    /// Dimensions with at least one class
    pub gs: Vec<u32>,
    /// Number of classes per `(q, g)`
    pub counts: BTreeMap<u64, BTreeMap<u32, usize>>,
    pub total: usize,
}

impl AbvarStats {
    pub fn compute(store: &dyn DocumentStore) -> Result<Self> {
        let query = Query::new();
        let docs = store.find(ABVAR_COLLECTION, &query, 0, usize::MAX)?;
        let mut qs = BTreeSet::new();
        let mut gs = BTreeSet::new();
        let mut counts: BTreeMap<u64, BTreeMap<u32, usize>> = BTreeMap::new();
        for doc in &docs {
            let (Some(q), Some(g)) = (
                doc.get("q").and_then(Value::as_u64),
                doc.get("g").and_then(Value::as_u64),
            ) else {
                continue;
            };
            let g = g as u32;
            if q < 50 {
                qs.insert(q);
            }
            gs.insert(g);
            *counts.entry(q).or_default().entry(g).or_default() += 1;
        }
        Ok(AbvarStats {
            qs: qs.into_iter().collect(),
            gs: gs.into_iter().collect(),
            counts,
            total: docs.len(),
        })
    }

    /// Number of classes with the given field size and dimension
    pub fn count(&self, q: u64, g: u32) -> usize {
        self.counts
            .get(&q)
            .and_then(|row| row.get(&g))
            .copied()
            .unwrap_or(0)
    }
}
