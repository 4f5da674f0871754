pub mod category;
pub mod metadata;
pub mod walk;

pub use category::FileCategory;
pub use metadata::extract;
pub use walk::{WalkEvent, WalkStats, Walker};
