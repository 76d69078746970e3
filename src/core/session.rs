//! Execution session: thread-count policy and memory-pool allocators.
//!
//! The session is established once at backend initialization and shared by
//! every inference call of that backend instance. It owns two reuse-oriented
//! scratch pools: the blob pool (ratio 0.0, any sufficiently large retained
//! buffer is reused) and the workspace pool (ratio 0.5, a retained buffer is
//! only reused when the request is at least half its size). Pool access is
//! internally synchronized, so concurrent allocate/release from in-flight
//! requests is safe; the thread count is frozen at construction and the
//! request path only reads it.

use crate::core::config::{BackendConfig, PoolScope};
use std::sync::{Arc, Mutex, OnceLock};

/// Size-compare ratio of the blob pool.
const BLOB_POOL_RATIO: f32 = 0.0;
/// Size-compare ratio of the workspace pool.
const WORKSPACE_POOL_RATIO: f32 = 0.5;

/// A reuse-oriented scratch-memory pool.
///
/// Freed buffers are retained on an internal free list instead of being
/// returned to the OS. A retained buffer satisfies an allocation of `size`
/// bytes when it is large enough and not excessively larger than the
/// request: `buffer.len() >= size && size >= buffer.len() * ratio`. Among
/// the qualifying buffers the smallest one is handed out.
#[derive(Debug)]
pub struct PoolAllocator {
    size_compare_ratio: f32,
    free: Mutex<Vec<Vec<u8>>>,
}

impl PoolAllocator {
    /// Creates a pool with the given size-compare ratio.
    ///
    /// The ratio must lie in `[0.0, 1.0]`; 0.0 reuses any buffer that
    /// fits, 1.0 reuses only exact-size buffers.
    pub fn new(size_compare_ratio: f32) -> Self {
        debug_assert!((0.0..=1.0).contains(&size_compare_ratio));
        Self {
            size_compare_ratio,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Returns the configured size-compare ratio.
    pub fn size_compare_ratio(&self) -> f32 {
        self.size_compare_ratio
    }

    /// Allocates a buffer of at least `size` bytes.
    ///
    /// The returned buffer may be larger than requested when a retained
    /// buffer was reused; callers index only the bytes they asked for.
    pub fn allocate(&self, size: usize) -> Vec<u8> {
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        let candidate = free
            .iter()
            .enumerate()
            .filter(|(_, buf)| {
                buf.len() >= size
                    && size as f32 >= buf.len() as f32 * self.size_compare_ratio
            })
            .min_by_key(|(_, buf)| buf.len())
            .map(|(idx, _)| idx);
        match candidate {
            Some(idx) => free.swap_remove(idx),
            None => vec![0u8; size],
        }
    }

    /// Returns a buffer to the pool for reuse.
    pub fn release(&self, buffer: Vec<u8>) {
        if buffer.is_empty() {
            return;
        }
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        free.push(buffer);
    }

    /// Drops all retained buffers.
    pub fn clear(&self) {
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        free.clear();
    }

    /// Returns the number of buffers currently retained.
    pub fn retained(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Shared execution configuration: thread count and pool allocators.
///
/// Created once per backend instance (or once per process, see
/// [`PoolScope`]) and referenced by every inference call. Never reset
/// mid-session.
#[derive(Debug)]
pub struct ExecutionSession {
    threads: usize,
    blob_pool: Arc<PoolAllocator>,
    workspace_pool: Arc<PoolAllocator>,
}

static PROCESS_SESSION: OnceLock<Arc<ExecutionSession>> = OnceLock::new();

impl ExecutionSession {
    /// Configures a new session from backend configuration.
    pub fn configure(config: &BackendConfig) -> Self {
        let threads = config.effective_threads();
        tracing::debug!(threads, "configured execution session");
        Self {
            threads,
            blob_pool: Arc::new(PoolAllocator::new(BLOB_POOL_RATIO)),
            workspace_pool: Arc::new(PoolAllocator::new(WORKSPACE_POOL_RATIO)),
        }
    }

    /// Returns the session for the scope the configuration asks for.
    ///
    /// With [`PoolScope::Process`] the first configuration call creates the
    /// process-wide session and later calls return it untouched, so the
    /// thread count and pools are frozen after first configuration.
    pub fn for_scope(config: &BackendConfig) -> Arc<ExecutionSession> {
        match config.pool_scope {
            PoolScope::PerBackend => Arc::new(Self::configure(config)),
            PoolScope::Process => {
                let session = PROCESS_SESSION.get_or_init(|| Arc::new(Self::configure(config)));
                if session.threads != config.effective_threads() {
                    tracing::warn!(
                        configured = session.threads,
                        requested = config.effective_threads(),
                        "process-wide session already configured; thread count unchanged"
                    );
                }
                Arc::clone(session)
            }
        }
    }

    /// Returns the thread count every execution context is bound to.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the blob pool allocator.
    pub fn blob_pool(&self) -> &Arc<PoolAllocator> {
        &self.blob_pool
    }

    /// Returns the workspace pool allocator.
    pub fn workspace_pool(&self) -> &Arc<PoolAllocator> {
        &self.workspace_pool
    }
}
