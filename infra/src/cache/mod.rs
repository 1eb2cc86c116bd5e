//! Redis caching layer
//!
//! Backs the domain's ephemeral store with Redis: verification codes,
//! rate-limit markers, failure counters, lock records and sessions.

pub mod redis_store;

pub use redis_store::RedisStore;
