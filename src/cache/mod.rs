//! 解析结果缓存
//!
//! - `fingerprint`: 由规范化请求上下文生成的缓存 key
//! - `coalescing`: 缓存 + 同 key 并发请求合并（singleflight）+ 代次隔离

pub mod coalescing;
pub mod fingerprint;

pub use coalescing::{CacheStats, CoalescingCache};
pub use fingerprint::ContextFingerprint;
