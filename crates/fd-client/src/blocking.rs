//! Synchronous adapter over [`AwClient`].

use std::collections::HashSet;

use fd_core::{BucketStore, Event, Submitter};
use tokio::runtime::{Builder, Runtime};

use crate::{AwClient, ClientConfig, ClientError};

/// Blocking ActivityWatch client.
///
/// Owns a current-thread runtime and blocks on it for every call. Must not be
/// used from inside another async runtime.
#[derive(Debug)]
pub struct BlockingClient {
    inner: AwClient,
    runtime: Runtime,
}

impl BlockingClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;
        let inner = AwClient::new(config)?;
        Ok(Self { inner, runtime })
    }
}

impl BucketStore for BlockingClient {
    type Error = ClientError;

    fn list_bucket_ids(&self) -> Result<HashSet<String>, ClientError> {
        self.runtime.block_on(self.inner.bucket_ids())
    }

    fn create_bucket(&self, bucket_id: &str, event_type: &str) -> Result<(), ClientError> {
        self.runtime
            .block_on(self.inner.create_bucket(bucket_id, event_type))
    }

    fn delete_bucket(&self, bucket_id: &str) -> Result<(), ClientError> {
        self.runtime.block_on(self.inner.delete_bucket(bucket_id))
    }
}

impl Submitter for BlockingClient {
    type Error = ClientError;

    fn submit(&self, bucket_id: &str, events: &[Event]) -> Result<(), ClientError> {
        self.runtime
            .block_on(self.inner.insert_events(bucket_id, events))
    }
}
