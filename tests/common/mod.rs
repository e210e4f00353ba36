//! In-memory cluster shared by the integration tests
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use kube::core::DynamicObject;
use resview::viewer::{Dash, ObjectKey, ObjectStore, Queryer, key_from_object};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

/// Build a namespaced object with `uid` derived from the name
pub fn object(api_version: &str, kind: &str, name: &str, owners: &[&DynamicObject]) -> DynamicObject {
    let owner_references: Vec<_> = owners
        .iter()
        .map(|owner| {
            let types = owner.types.clone().unwrap_or_default();
            json!({
                "apiVersion": types.api_version,
                "kind": types.kind,
                "name": owner.metadata.name.clone().unwrap_or_default(),
                "uid": owner.metadata.uid.clone().unwrap_or_default(),
            })
        })
        .collect();

    serde_json::from_value(json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {
            "name": name,
            "namespace": "default",
            "uid": uid(name),
            "ownerReferences": owner_references,
        },
    }))
    .unwrap()
}

pub fn uid(name: &str) -> String {
    format!("{}-uid", name)
}

pub fn deployment(name: &str) -> DynamicObject {
    object("apps/v1", "Deployment", name, &[])
}

pub fn replica_set(name: &str, owner: &DynamicObject) -> DynamicObject {
    object("apps/v1", "ReplicaSet", name, &[owner])
}

pub fn pod(name: &str, owners: &[&DynamicObject]) -> DynamicObject {
    object("v1", "Pod", name, owners)
}

/// Object store over a fixed set of objects
#[derive(Default)]
pub struct FakeStore {
    objects: RwLock<Vec<DynamicObject>>,
}

impl FakeStore {
    pub fn new(objects: Vec<DynamicObject>) -> Arc<Self> {
        Arc::new(Self {
            objects: RwLock::new(objects),
        })
    }

    pub async fn insert(&self, object: DynamicObject) {
        self.objects.write().await.push(object);
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn get(&self, _ctx: &CancellationToken, key: &ObjectKey) -> Result<Option<DynamicObject>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .find(|o| key_from_object(o).ok().as_ref() == Some(key))
            .cloned())
    }

    async fn list(
        &self,
        _ctx: &CancellationToken,
        namespace: &str,
        api_version: &str,
        kind: &str,
    ) -> Result<Vec<DynamicObject>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|o| {
                key_from_object(o).is_ok_and(|k| {
                    k.api_version == api_version
                        && k.kind == kind
                        && (namespace.is_empty() || k.namespace == namespace)
                })
            })
            .cloned()
            .collect())
    }
}

pub struct FakeDash {
    store: Arc<FakeStore>,
}

impl FakeDash {
    pub fn new(store: Arc<FakeStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

#[async_trait]
impl Dash for FakeDash {
    fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    async fn object_path(
        &self,
        _ctx: &CancellationToken,
        namespace: &str,
        _api_version: &str,
        kind: &str,
        name: &str,
    ) -> Result<String> {
        Ok(format!("/{}/{}/{}", namespace, kind.to_lowercase(), name))
    }
}

/// Queryer returning every stored object owned by the parent's UID
pub struct FakeQueryer {
    store: Arc<FakeStore>,
    calls: AtomicUsize,
    hang: bool,
    gate: Option<Arc<Semaphore>>,
}

impl FakeQueryer {
    pub fn new(store: Arc<FakeStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            calls: AtomicUsize::new(0),
            hang: false,
            gate: None,
        })
    }

    /// Queryer whose lookups wait until the returned gate gets permits
    pub fn gated(store: Arc<FakeStore>) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let queryer = Arc::new(Self {
            store,
            calls: AtomicUsize::new(0),
            hang: false,
            gate: Some(gate.clone()),
        });
        (queryer, gate)
    }

    /// Queryer whose lookups never complete
    pub fn hanging(store: Arc<FakeStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            calls: AtomicUsize::new(0),
            hang: true,
            gate: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Queryer for FakeQueryer {
    async fn children(
        &self,
        _ctx: &CancellationToken,
        object: &DynamicObject,
    ) -> Result<Vec<DynamicObject>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            return futures::future::pending().await;
        }
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await?;
        }

        let Some(parent) = object.metadata.uid.clone() else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .objects
            .read()
            .await
            .iter()
            .filter(|o| {
                o.metadata
                    .owner_references
                    .as_ref()
                    .is_some_and(|refs| refs.iter().any(|r| r.uid == parent))
            })
            .cloned()
            .collect())
    }
}
