pub mod file_token_storage;
pub mod in_memory_token_storage;

pub use file_token_storage::FileTokenStorage;
pub use in_memory_token_storage::InMemoryTokenStorage;
