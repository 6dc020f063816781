pub mod backend;
pub mod document;
mod import;

pub use backend::{DocumentBackend, Lopdf};
pub use document::{DocumentInfo, PagedDocument};
