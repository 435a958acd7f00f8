//! Namespace schemas: the action descriptions the builder validates against.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;
use crate::config::SdkConfig;
use crate::error::SdkError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessModifier {
    Public,
    Private,
    System,
    Owner,
    View,
}

impl AccessModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::System => "SYSTEM",
            Self::Owner => "OWNER",
            Self::View => "VIEW",
        }
    }
}

/// One action declared in a namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceAction {
    pub name: String,
    #[serde(default)]
    pub parameter_names: Vec<String>,
    #[serde(default)]
    pub access_modifiers: Vec<AccessModifier>,
}

impl NamespaceAction {
    pub fn new<P, S>(
        name: impl Into<String>,
        parameter_names: P,
        modifiers: &[AccessModifier],
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameter_names: parameter_names.into_iter().map(Into::into).collect(),
            access_modifiers: modifiers.to_vec(),
        }
    }

    pub fn has_modifier(&self, modifier: AccessModifier) -> bool {
        self.access_modifiers.contains(&modifier)
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier(AccessModifier::Public)
    }

    pub fn is_view(&self) -> bool {
        self.has_modifier(AccessModifier::View)
    }

    /// Declared position of a parameter, ignoring any leading `$`.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        let name = bare_name(name);
        self.parameter_names.iter().position(|declared| bare_name(declared) == name)
    }
}

/// Parameter name without its leading `$` sigil.
pub fn bare_name(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

/// Supplier of namespace schemas, usually a query against the network.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Lists every action declared in `namespace`. An unknown namespace
    /// yields an empty list.
    async fn fetch_namespace_actions(
        &self,
        namespace: &str,
    ) -> Result<Vec<NamespaceAction>, SdkError>;
}

/// Fixed schemas held in memory, for offline use and tests.
#[derive(Debug, Default)]
pub struct InMemorySchemaSource {
    namespaces: Mutex<HashMap<String, Vec<NamespaceAction>>>,
    fetches: AtomicUsize,
}

impl InMemorySchemaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(
        self,
        namespace: impl Into<String>,
        actions: Vec<NamespaceAction>,
    ) -> Self {
        self.insert(namespace, actions);
        self
    }

    pub fn insert(&self, namespace: impl Into<String>, actions: Vec<NamespaceAction>) {
        self.namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(namespace.into(), actions);
    }

    /// How many times the source has been queried.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaSource for InMemorySchemaSource {
    async fn fetch_namespace_actions(
        &self,
        namespace: &str,
    ) -> Result<Vec<NamespaceAction>, SdkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let namespaces = self.namespaces.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(namespaces.get(namespace).cloned().unwrap_or_default())
    }
}

/// A schema source fronted by a per-namespace TTL cache.
///
/// Cheap to share: builders hold it behind an `Arc`.
pub struct SchemaCatalog {
    source: Arc<dyn SchemaSource>,
    cache: TtlCache<Vec<NamespaceAction>>,
}

impl SchemaCatalog {
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self { source, cache: TtlCache::default() }
    }

    pub fn with_ttl(source: Arc<dyn SchemaSource>, ttl: Duration) -> Self {
        Self { source, cache: TtlCache::new(ttl) }
    }

    pub fn from_config(
        source: Arc<dyn SchemaSource>,
        config: &SdkConfig,
    ) -> Result<Self, SdkError> {
        config.validate()?;
        Ok(Self::with_ttl(source, config.cache_ttl()))
    }

    /// Actions of `namespace`, served from cache while fresh.
    ///
    /// Any source failure surfaces as [`SdkError::Fetch`].
    pub async fn actions(&self, namespace: &str) -> Result<Vec<NamespaceAction>, SdkError> {
        let source = Arc::clone(&self.source);
        self.cache
            .get_or_fetch(namespace, || async move {
                match source.fetch_namespace_actions(namespace).await {
                    Ok(actions) => Ok(actions),
                    Err(err) => {
                        log::warn!("schema fetch for namespace '{namespace}' failed: {err}");
                        Err(match err {
                            fetch @ SdkError::Fetch { .. } => fetch,
                            other => SdkError::fetch(namespace, other.to_string()),
                        })
                    }
                }
            })
            .await
    }

    /// Drops the cached schema of one namespace.
    pub fn invalidate(&self, namespace: &str) -> bool {
        self.cache.delete(namespace)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &TtlCache<Vec<NamespaceAction>> {
        &self.cache
    }
}

impl std::fmt::Debug for SchemaCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCatalog").field("ttl", &self.cache.ttl()).finish_non_exhaustive()
    }
}
