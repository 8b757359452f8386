pub mod compression;
pub mod models;

pub use compression::{from_compressed, to_compressed, read_header, CodecError};
pub use models::{category_from_slug, ContentItem, Difficulty, UnknownDifficulty};
