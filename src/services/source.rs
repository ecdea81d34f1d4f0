use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::{ContentRepository, ContentUnit};

/// 解析所需记录的异步来源
///
/// 部署为远程服务时，HTTP/RPC 边界就放在这里，其余接口不变。
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_units(&self) -> Result<Vec<ContentUnit>>;
}

#[async_trait]
impl ContentSource for ContentRepository {
    async fn fetch_units(&self) -> Result<Vec<ContentUnit>> {
        // 本地存储是同步读取，这里让出一次以保持异步边界语义
        tokio::task::yield_now().await;
        self.try_list()
    }
}
