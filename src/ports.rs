use std::future::Future;
use std::pin::Pin;

use axum::body::Bytes;

use crate::error::Result;

pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Keyed blob storage for product and story images.
pub trait ImageStore: Send + Sync {
    fn put<'a>(&'a self, key: &'a str, bytes: Bytes, content_type: &'a str)
        -> PortFuture<'a, ()>;

    fn get<'a>(&'a self, key: &'a str) -> PortFuture<'a, StoredObject>;

    /// Deleting a key that does not exist is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> PortFuture<'a, ()>;
}

/// Delivers a text message to a chat.
pub trait Notifier: Send + Sync {
    fn send<'a>(&'a self, chat_id: &'a str, text: &'a str) -> PortFuture<'a, ()>;
}
