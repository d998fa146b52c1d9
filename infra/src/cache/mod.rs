//! Redis cache layer backing the session store.

pub mod redis_client;
pub mod session_store;


pub use redis_client::RedisClient;
pub use session_store::RedisSessionStore;

pub use sg_shared::config::CacheConfig;
