//! Hand-off queue between the pipeline and the network publish client.
//!
//! [`Uplink`] is the connectivity collaborator as the pipeline sees it:
//! a link-state flag plus a bounded queue of samples waiting to be sent.
//! The transport side (Wi-Fi / broker client) updates the link state and
//! drains the queue with [`Uplink::take`]; how it publishes is its own
//! business.

use heapless::Deque;
use log::info;

use crate::app::ports::{LinkStatus, PublishPort};
use crate::config::PUBLISH_QUEUE_DEPTH;
use crate::sample::Sample;

pub struct Uplink<const N: usize = PUBLISH_QUEUE_DEPTH> {
    queue: Deque<Sample, N>,
    connected: bool,
    rssi_dbm: Option<i8>,
}

impl<const N: usize> Default for Uplink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Uplink<N> {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            connected: false,
            rssi_dbm: None,
        }
    }

    /// Transport side: record a link state change.
    pub fn set_connected(&mut self, connected: bool, rssi_dbm: Option<i8>) {
        if connected != self.connected {
            info!("uplink: {}", if connected { "connected" } else { "disconnected" });
        }
        self.connected = connected;
        self.rssi_dbm = if connected { rssi_dbm } else { None };
    }

    /// Transport side: next sample to publish, oldest first.
    pub fn take(&mut self) -> Option<Sample> {
        self.queue.pop_front()
    }

    /// Drop everything queued.  Returns how many samples were discarded.
    pub fn discard_pending(&mut self) -> usize {
        let count = self.queue.len();
        self.queue.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<const N: usize> PublishPort for Uplink<N> {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn enqueue(&mut self, sample: Sample) -> bool {
        self.queue.push_back(sample).is_ok()
    }
}

impl<const N: usize> LinkStatus for Uplink<N> {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn rssi_dbm(&self) -> Option<i8> {
        self.rssi_dbm
    }
}
