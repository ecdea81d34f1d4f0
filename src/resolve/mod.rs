//! 推广内容解析
//!
//! - `context`: 请求上下文及其规范化
//! - `engine`: 资格判定、排序、轮播模式与单 slot 胜出模式
//! - `rotation`: 轮播消费者的游标

pub mod context;
pub mod engine;
pub mod rotation;

pub use context::{ContextDefaults, PageContext, PlacementQuery, ResolvedContext};
pub use engine::{PageResolution, rank, resolve_for_placement, resolve_page, resolve_slot};
pub use rotation::Rotation;
