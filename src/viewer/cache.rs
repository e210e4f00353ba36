//! Component cache with background graph resolution
//!
//! Maps object keys to rendered resource viewer components. A miss returns a
//! placeholder graph right away and resolves the full graph in a background
//! task; the resolved component then replaces the placeholder entry.

use super::dash::{Dash, Queryer};
use super::error::{ViewerError, ViewerResult};
use super::graph::ResourceViewerComponent;
use super::key::{ObjectKey, key_from_object};
use super::resource_viewer::ResourceViewer;
use kube::core::DynamicObject;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Default number of cached components
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// Final state of a background resolution, as seen by callers that joined it
#[derive(Debug, Clone)]
enum Outcome {
    Resolved(ObjectKey),
    Cancelled,
    Failed(String),
}

impl Outcome {
    fn from_result(result: &ViewerResult<ObjectKey>) -> Self {
        match result {
            Ok(key) => Outcome::Resolved(key.clone()),
            Err(e) if e.is_cancelled() => Outcome::Cancelled,
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug)]
enum Signal {
    /// Caller that launched the resolution, receives the original error
    Owner(oneshot::Receiver<ViewerResult<ObjectKey>>),
    /// Caller that joined a resolution already running for its key
    Joined {
        key: ObjectKey,
        rx: watch::Receiver<Option<Outcome>>,
    },
}

/// Completion signal of a background resolution
///
/// Yields the resolved key once, or the error that stopped the traversal.
/// Dropping it is fine; the task never blocks on delivery.
#[derive(Debug)]
pub struct Resolution {
    signal: Signal,
}

impl Resolution {
    pub async fn wait(self) -> ViewerResult<ObjectKey> {
        match self.signal {
            Signal::Owner(rx) => rx.await.map_err(|_| ViewerError::ResolutionDropped)?,
            Signal::Joined { key, mut rx } => {
                let outcome = rx
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| ViewerError::ResolutionDropped)?
                    .clone();

                match outcome {
                    Some(Outcome::Resolved(resolved)) => Ok(resolved),
                    Some(Outcome::Cancelled) => Err(ViewerError::Cancelled),
                    Some(Outcome::Failed(message)) => Err(ViewerError::ResolutionFailed {
                        key: key.to_string(),
                        message,
                    }),
                    None => Err(ViewerError::ResolutionDropped),
                }
            }
        }
    }

    /// True if this caller launched the traversal rather than joining one
    pub fn is_owner(&self) -> bool {
        matches!(self.signal, Signal::Owner(_))
    }
}

/// A background resolution registered for a key
struct InFlight {
    generation: u64,
    token: CancellationToken,
    done: watch::Receiver<Option<Outcome>>,
}

impl InFlight {
    fn join(&self, key: ObjectKey) -> Resolution {
        Resolution {
            signal: Signal::Joined {
                key,
                rx: self.done.clone(),
            },
        }
    }
}

struct CacheInner {
    components: Mutex<LruCache<ObjectKey, ResourceViewerComponent>>,
    dash: Arc<dyn Dash>,
    queryer: RwLock<Option<Arc<dyn Queryer>>>,
    /// Running resolutions. Lock before `components` when both are held.
    in_flight: Mutex<HashMap<ObjectKey, InFlight>>,
    next_generation: AtomicU64,
}

impl CacheInner {
    /// Retire a resolution and store its component if it still owns the key
    ///
    /// A resolution loses ownership when its key was invalidated (or a newer
    /// resolution registered) while it ran; its result is then discarded.
    async fn finish(
        &self,
        key: &ObjectKey,
        generation: u64,
        result: ViewerResult<(ObjectKey, ResourceViewerComponent)>,
    ) -> ViewerResult<ObjectKey> {
        let mut in_flight = self.in_flight.lock().await;
        let current = in_flight
            .get(key)
            .is_some_and(|running| running.generation == generation);
        if current {
            in_flight.remove(key);
        }

        let (resolved, component) = result?;
        if !current {
            tracing::debug!("Discarding stale graph for {}", key);
            return Err(ViewerError::Invalidated(key.to_string()));
        }

        self.components.lock().await.put(resolved.clone(), component);
        Ok(resolved)
    }
}

/// LRU cache of resource viewer components
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone)]
pub struct ComponentCache {
    inner: Arc<CacheInner>,
}

impl ComponentCache {
    pub fn new(dash: Arc<dyn Dash>) -> ViewerResult<Self> {
        Self::with_capacity(dash, DEFAULT_CACHE_SIZE)
    }

    pub fn with_capacity(dash: Arc<dyn Dash>, capacity: usize) -> ViewerResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            ViewerError::Configuration("cache capacity must be greater than zero".to_string())
        })?;

        Ok(Self {
            inner: Arc::new(CacheInner {
                components: Mutex::new(LruCache::new(capacity)),
                dash,
                queryer: RwLock::new(None),
                in_flight: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        })
    }

    pub async fn set_queryer(&self, queryer: Arc<dyn Queryer>) {
        *self.inner.queryer.write().await = Some(queryer);
    }

    async fn queryer(&self) -> Option<Arc<dyn Queryer>> {
        self.inner.queryer.read().await.clone()
    }

    /// Get the component for `object`
    ///
    /// Cached components are returned as they are, even while their
    /// resolution is still running.
    pub async fn get(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
    ) -> ViewerResult<ResourceViewerComponent> {
        let (component, _) = self.get_with_resolution(ctx, object).await?;
        Ok(component)
    }

    /// Like [`ComponentCache::get`], also returning a resolution while the
    /// component is still a placeholder
    ///
    /// A resolved hit returns no resolution. A pending hit joins the running
    /// resolution for its key, or starts a new one if the last attempt
    /// failed.
    pub async fn get_with_resolution(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
    ) -> ViewerResult<(ResourceViewerComponent, Option<Resolution>)> {
        let queryer = self
            .queryer()
            .await
            .ok_or(ViewerError::NoQueryerConfigured)?;

        let key = key_from_object(object)?;

        let hit = self.inner.components.lock().await.get(&key).cloned();
        if let Some(component) = hit {
            if !component.is_pending() {
                tracing::debug!("Component cache hit for {}", key);
                return Ok((component, None));
            }

            tracing::debug!("Component cache hit for {}, still pending", key);
            let viewer = self.new_resource_viewer(queryer)?;
            let resolution = self.visit(ctx, key, object.clone(), &viewer).await;
            return Ok((component, Some(resolution)));
        }

        tracing::debug!("Component cache miss for {}", key);
        let viewer = self.new_resource_viewer(queryer)?;
        let component = self.get_component(ctx, &key, object, &viewer).await?;

        let component = {
            let mut components = self.inner.components.lock().await;
            // Another caller may have stored this key while we built ours
            match components.get(&key) {
                Some(existing) => existing.clone(),
                None => {
                    components.put(key.clone(), component.clone());
                    component
                }
            }
        };
        if !component.is_pending() {
            return Ok((component, None));
        }

        let resolution = self.visit(ctx, key, object.clone(), &viewer).await;
        Ok((component, Some(resolution)))
    }

    fn new_resource_viewer(&self, queryer: Arc<dyn Queryer>) -> ViewerResult<ResourceViewer> {
        ResourceViewer::builder(Arc::clone(&self.inner.dash))
            .queryer(queryer)
            .build()
    }

    /// Current component of `viewer`, seeding the placeholder root first
    async fn get_component(
        &self,
        ctx: &CancellationToken,
        key: &ObjectKey,
        object: &DynamicObject,
        viewer: &ResourceViewer,
    ) -> ViewerResult<ResourceViewerComponent> {
        viewer.seed(ctx, key, object).await?;
        Ok(viewer.component().await)
    }

    /// Resolve the full graph of `object` in the background
    ///
    /// Joins the resolution already running for `key` if there is one.
    async fn visit(
        &self,
        ctx: &CancellationToken,
        key: ObjectKey,
        object: DynamicObject,
        viewer: &ResourceViewer,
    ) -> Resolution {
        let mut in_flight = self.inner.in_flight.lock().await;
        if let Some(running) = in_flight.get(&key) {
            tracing::debug!("Resolution for {} already running", key);
            return running.join(key);
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = ctx.child_token();
        let (done_tx, done_rx) = watch::channel(None);
        in_flight.insert(
            key.clone(),
            InFlight {
                generation,
                token: token.clone(),
                done: done_rx,
            },
        );
        drop(in_flight);

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let viewer = viewer.clone();
        let span = tracing::debug_span!("resolve", key = %key, generation);

        tokio::spawn(
            async move {
                let result = resolve(&inner, &token, &key, object, &viewer).await;
                let result = inner.finish(&key, generation, result).await;

                match &result {
                    Ok(resolved) => tracing::debug!("Resolved graph for {}", resolved),
                    Err(e) => tracing::warn!("Failed to resolve graph for {}: {}", key, e),
                }
                let _ = done_tx.send(Some(Outcome::from_result(&result)));
                let _ = tx.send(result);
            }
            .instrument(span),
        );

        Resolution {
            signal: Signal::Owner(rx),
        }
    }

    /// Cached component for `key` without touching its recency
    pub async fn cached(&self, key: &ObjectKey) -> Option<ResourceViewerComponent> {
        self.inner.components.lock().await.peek(key).cloned()
    }

    /// Drop the entry for `key` so the next `get` traverses again
    ///
    /// A resolution running for `key` is cancelled and its result discarded.
    pub async fn invalidate(&self, key: &ObjectKey) -> bool {
        let mut in_flight = self.inner.in_flight.lock().await;
        if let Some(running) = in_flight.remove(key) {
            tracing::debug!("Cancelling resolution for invalidated {}", key);
            running.token.cancel();
        }
        self.inner.components.lock().await.pop(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.components.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn capacity(&self) -> usize {
        self.inner.components.lock().await.cap().get()
    }
}

/// Traverse the graph of `object`
///
/// Returns the resolved key with its component; storing it is up to the
/// caller.
async fn resolve(
    inner: &CacheInner,
    ctx: &CancellationToken,
    key: &ObjectKey,
    object: DynamicObject,
    viewer: &ResourceViewer,
) -> ViewerResult<(ObjectKey, ResourceViewerComponent)> {
    let store = inner.dash.object_store();
    let live = tokio::select! {
        biased;
        _ = ctx.cancelled() => return Err(ViewerError::Cancelled),
        result = store.get(ctx, key) => result.map_err(ViewerError::ObjectStore)?,
    };
    let root = live.unwrap_or(object);

    let component = viewer.visit(ctx, &root).await?;
    if ctx.is_cancelled() {
        return Err(ViewerError::Cancelled);
    }

    let resolved = key_from_object(&root)?;
    Ok((resolved, component))
}
