use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use xxhash_rust::xxh64::xxh64;

use crate::resolve::context::ResolvedContext;

/// 请求上下文指纹
///
/// 只取 (surface, page_scope, domain, device, language)，不含 `now`。
/// 规范串按字段名排序生成，与字段声明顺序无关。每个值带长度前缀
/// (`key=len:value`)，值里出现 `;` 或 `=` 也不会与其它上下文混淆。
#[derive(Debug, Clone)]
pub struct ContextFingerprint {
    canonical: Arc<str>,
    digest: u64,
}

impl ContextFingerprint {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let sorted: BTreeMap<&str, &str> = pairs.into_iter().collect();
        let canonical = sorted
            .iter()
            .map(|(k, v)| format!("{}={}:{}", k, v.len(), v))
            .collect::<Vec<_>>()
            .join(";");
        let digest = xxh64(canonical.as_bytes(), 0);
        Self {
            canonical: Arc::from(canonical),
            digest,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn digest(&self) -> u64 {
        self.digest
    }
}

impl From<&ResolvedContext> for ContextFingerprint {
    fn from(ctx: &ResolvedContext) -> Self {
        let device: &str = ctx.device.as_ref();
        Self::from_pairs([
            ("surface", ctx.surface.as_str()),
            ("page_scope", ctx.page_scope.as_str()),
            ("domain", ctx.domain.as_deref().unwrap_or("")),
            ("device", device),
            ("language", ctx.language.as_str()),
        ])
    }
}

impl PartialEq for ContextFingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.canonical == other.canonical
    }
}

impl Eq for ContextFingerprint {}

impl Hash for ContextFingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

impl fmt::Display for ContextFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.digest)
    }
}
