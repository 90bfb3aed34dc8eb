#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ContentRepository, ContentWriter, InMemoryRepository, KeyValueStore, Storage, StorageError,
};
