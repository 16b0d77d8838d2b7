// Infrastructure layer - Configuration, storage adapters and wire helpers
pub mod config;
pub mod file_session_store;
pub mod memory_session_store;
pub mod mock_data;
pub mod ndjson_stream;
