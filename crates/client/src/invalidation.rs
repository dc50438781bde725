//! 缓存失效信号
//!
//! 变更或旁路操作成功后只让受影响的记录和资源列表失效，
//! 不整体刷新。

use std::collections::HashMap;
use std::sync::Arc;

use console_domain::Resource;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Invalidation {
    Record { resource: Resource, id: String },
    List { resource: Resource },
}

impl Invalidation {
    /// 一条记录变化时，它本身和所在资源的列表都需要重新获取
    pub fn for_record<S: Into<String>>(resource: Resource, id: S) -> [Invalidation; 2] {
        [
            Invalidation::Record {
                resource,
                id: id.into(),
            },
            Invalidation::List { resource },
        ]
    }

    pub fn covers(&self, key: &CacheKey) -> bool {
        match (self, key) {
            (
                Invalidation::Record { resource, id },
                CacheKey::Record {
                    resource: key_resource,
                    id: key_id,
                },
            ) => resource == key_resource && id == key_id,
            (Invalidation::List { resource }, CacheKey::List { resource: key_resource, .. }) => {
                resource == key_resource
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Record {
        resource: Resource,
        id: String,
    },
    List {
        resource: Resource,
        query: Vec<(String, String)>,
    },
}

/// 失效信号广播
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    tx: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.tx.subscribe()
    }

    /// 返回收到信号的订阅者数量；没有订阅者不算错误
    pub fn publish(&self, invalidation: Invalidation) -> usize {
        debug!("发布缓存失效信号: {:?}", invalidation);
        self.tx.send(invalidation).unwrap_or(0)
    }

    pub fn publish_record(&self, resource: Resource, id: &str) -> usize {
        Invalidation::for_record(resource, id)
            .into_iter()
            .map(|invalidation| self.publish(invalidation))
            .max()
            .unwrap_or(0)
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 内存中的查询缓存，只在失效信号到来时删除对应条目
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<CacheKey, Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        self.entries.write().await.insert(key, value);
    }

    /// 返回被删除的条目数
    pub async fn apply(&self, invalidation: &Invalidation) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !invalidation.covers(key));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// 在后台消费失效信号；落后太多时清空整个缓存
    pub fn spawn_listener(&self, bus: &InvalidationBus) -> JoinHandle<()> {
        let cache = self.clone();
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(invalidation) => {
                        let removed = cache.apply(&invalidation).await;
                        debug!("缓存失效 {:?}，删除 {} 条", invalidation, removed);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("缓存失效信号丢失 {} 条，清空缓存", skipped);
                        cache.clear().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
