pub mod db;
pub mod hasher;
pub mod memory;

pub use db::DbAdapter;
pub use hasher::Argon2Hasher;
pub use memory::InMemoryStore;
