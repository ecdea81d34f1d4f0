//! Service layer
//!
//! - `source`: the asynchronous fetch boundary in front of the repository
//! - `serving`: cache-fronted resolution for rendering collaborators
//! - `content`: authoring boundary, invalidates served results on every mutation

pub mod content;
pub mod serving;
pub mod source;

pub use content::ContentService;
pub use serving::ServingService;
pub use source::ContentSource;
