//! Import notifications.
//!
//! After a listing has been stored, the raw listing is handed to subscribers
//! so they can process it on their own. Delivery is fire-and-forget: the
//! updater never waits for or inspects a subscriber.

use std::sync::Arc;

use epg_protocol::IncomingListing;
use log::trace;
use tokio::sync::broadcast;

/// Receives every listing that was imported successfully.
pub trait EpgEvents {
    fn on_import_epg_programs(&self, listing: &IncomingListing);
}

/// Discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl EpgEvents for NoEvents {
    fn on_import_epg_programs(&self, _listing: &IncomingListing) {}
}

/// Publishes imported listings on a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEvents {
    sender: broadcast::Sender<Arc<IncomingListing>>,
}

impl BroadcastEvents {
    /// Create a publisher with room for `capacity` undelivered listings per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<IncomingListing>> {
        self.sender.subscribe()
    }
}

impl EpgEvents for BroadcastEvents {
    fn on_import_epg_programs(&self, listing: &IncomingListing) {
        // No subscribers is not an error.
        if self.sender.send(Arc::new(listing.clone())).is_err() {
            trace!("BroadcastEvents: no subscriber for imported listing");
        }
    }
}
