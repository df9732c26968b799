//! Point-to-point message transport between ranks.
//!
//! Every ordered pair of ranks gets its own zero-capacity channel, so a
//! send blocks until the destination has taken the message and a receive
//! only ever matches messages from the named source. Dropping an
//! `Endpoint` disconnects all of its channels; peers blocked on it wake up
//! with `HppError::Disconnected`.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use crate::error::{HppError, Result};
use crate::state::Cell;

/// What a message carries. Receivers state the tag they expect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// Coordinator to worker: a band's rows at the start of a step.
    Scatter,
    /// Worker to predecessor: first row after the EVEN pass.
    Ghost,
    /// Worker to successor: the row it computed for the successor's band.
    Align,
    /// Last worker to coordinator: lattice row 0.
    WrapRow,
    /// Worker to coordinator: the rest of a band after the ODD pass.
    Gather,
}

#[derive(Debug)]
pub struct Message {
    pub tag: Tag,
    pub cells: Vec<Cell>,
}

/// One rank's view of the world: its identity and its channel ends.
pub struct Endpoint {
    rank: usize,
    size: usize,
    outbox: Vec<SyncSender<Message>>, // indexed by destination
    inbox: Vec<Receiver<Message>>,    // indexed by source
}

/// Build fully connected endpoints for `size` ranks, in rank order.
pub fn world(size: usize) -> Vec<Endpoint> {
    let mut outboxes: Vec<Vec<SyncSender<Message>>> = (0..size).map(|_| Vec::new()).collect();
    let mut inboxes: Vec<Vec<Receiver<Message>>> = (0..size).map(|_| Vec::new()).collect();

    for outbox in outboxes.iter_mut() {
        for inbox in inboxes.iter_mut() {
            let (tx, rx) = sync_channel(0);
            outbox.push(tx);
            inbox.push(rx);
        }
    }

    outboxes
        .into_iter()
        .zip(inboxes)
        .enumerate()
        .map(|(rank, (outbox, inbox))| Endpoint {
            rank,
            size,
            outbox,
            inbox,
        })
        .collect()
}

impl Endpoint {
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Previous rank on the ring.
    #[inline]
    pub fn predecessor(&self) -> usize {
        (self.rank + self.size - 1) % self.size
    }

    /// Next rank on the ring.
    #[inline]
    pub fn successor(&self) -> usize {
        (self.rank + 1) % self.size
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.rank + 1 == self.size
    }

    /// Send a copy of `cells` to `dest`, blocking until it is received.
    pub fn send(&self, dest: usize, tag: Tag, cells: &[Cell]) -> Result<()> {
        debug_assert_ne!(dest, self.rank, "rank {} sending to itself", self.rank);
        let message = Message {
            tag,
            cells: cells.to_vec(),
        };
        self.outbox[dest]
            .send(message)
            .map_err(|_| HppError::Disconnected {
                rank: self.rank,
                peer: dest,
            })
    }

    /// Receive the next message from `source` into `dest`.
    ///
    /// The message must carry `tag` and exactly `dest.len()` cells.
    pub fn recv_into(&self, source: usize, tag: Tag, dest: &mut [Cell]) -> Result<()> {
        debug_assert_ne!(source, self.rank, "rank {} receiving from itself", self.rank);
        let message = self.inbox[source]
            .recv()
            .map_err(|_| HppError::Disconnected {
                rank: self.rank,
                peer: source,
            })?;

        if message.tag != tag || message.cells.len() != dest.len() {
            return Err(HppError::Protocol {
                rank: self.rank,
                peer: source,
                expected: tag,
                got: message.tag,
                len: message.cells.len(),
            });
        }

        dest.copy_from_slice(&message.cells);
        Ok(())
    }
}
