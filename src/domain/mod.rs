mod collection;
pub mod models;

pub use collection::RecordCollection;
pub use models::*;
