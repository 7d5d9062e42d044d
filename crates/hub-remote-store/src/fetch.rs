//! Page fetch abstraction for ordering list pages from the hub.
//!
//! Implementations translate page orders into whatever the session layer
//! speaks; the store only cares whether an order was accepted.

use crossbeam_channel::Sender;

/// Synchronous rejection reasons a fetcher can report.
#[derive(Debug, PartialEq, Eq)]
pub enum FetchError {
    /// The session handshake has not completed; the order should be queued
    /// and replayed once the session is ready.
    NotReady,
}

/// One page order handed to the fetch collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Page-aligned start offset, in server coordinates.
    pub start: usize,
    /// Store generation this order belongs to. Responses must echo it so
    /// arrivals for a cleared list can be dropped.
    pub generation: u64,
}

/// Dispatches page orders to the source of the list.
pub trait PageFetcher {
    fn fetch(&mut self, request: PageRequest) -> Result<(), FetchError>;
}

/// Fetcher that forwards page orders over a channel to a session worker.
pub struct ChannelFetcher {
    req_tx: Sender<PageRequest>,
}

impl ChannelFetcher {
    pub fn new(req_tx: Sender<PageRequest>) -> Self {
        Self { req_tx }
    }
}

impl PageFetcher for ChannelFetcher {
    fn fetch(&mut self, request: PageRequest) -> Result<(), FetchError> {
        self.req_tx.send(request).map_err(|_| FetchError::NotReady)
    }
}
