// ==========================================
// S&OP 控制塔 - 导入结果缓存
// ==========================================
// 职责: 相同字节内容的工作簿只解析一次
// 键: 工作簿字节的 SHA-256；容量有界，满时淘汰最早写入项
// ==========================================

use crate::domain::outcome::IngestOutcome;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 工作簿内容哈希（十六进制）
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Arc<IngestOutcome>>,
    order: VecDeque<String>,
}

pub struct IngestCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl IngestCache {
    /// capacity 为 0 时缓存关闭（所有写入被忽略）
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // 结果是不可变快照，锁中毒后状态仍一致
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Arc<IngestOutcome>> {
        let hit = self.lock().entries.get(key).cloned();
        debug!(key = %key, hit = hit.is_some(), "缓存查询");
        hit
    }

    pub fn insert(&self, key: String, outcome: Arc<IngestOutcome>) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.lock();
        if state.entries.insert(key.clone(), outcome).is_none() {
            state.order.push_back(key);
        }

        while state.entries.len() > self.capacity {
            match state.order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                    debug!(key = %oldest, "缓存淘汰");
                }
                None => break,
            }
        }
    }

    /// 失效单个键，返回是否存在
    pub fn invalidate(&self, key: &str) -> bool {
        let mut state = self.lock();
        state.order.retain(|k| k != key);
        state.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
