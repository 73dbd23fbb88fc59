// Adapters layer: concrete implementations for external systems (http, mongodb, filesystem).

pub mod http;
pub mod mongo;
pub mod storage;
