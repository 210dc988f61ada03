//! Portrait Storage Layer
//!
//! This crate stores uploaded profile photos. Objects are addressed by
//! relative paths such as `images/user/7_101626143005.png`, which are also
//! the URLs recorded in the database.

pub mod backend;
pub mod error;
pub mod local;

pub use backend::{StorageBackend, photo_object_path};
pub use error::StorageError;
pub use local::LocalStorage;
