mod context;

pub use context::{GitContext, is_repository};
