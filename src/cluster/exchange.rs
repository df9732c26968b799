//! Ring boundary exchange.
//!
//! Every rank hands one row to a neighbour and receives one row from the
//! other neighbour. With blocking sends a ring where everybody sends first
//! is a circular wait, so each rank takes a fixed role:
//!
//! - rank 0 sends first,
//! - the last rank receives first,
//! - ranks in between send first when even and receive first when odd.
//!
//! Rank 0 is the head of the chain in either direction, so every blocked
//! send has a receiver that is already waiting or about to be.

use tracing::trace;

use super::comm::{Endpoint, Tag};
use crate::error::Result;
use crate::state::Cell;

/// Which way rows travel around the ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Send to the predecessor, receive from the successor. Fills the ghost
    /// row below a band before the ODD pass.
    Backward,
    /// Send to the successor, receive from the predecessor. Hands each band
    /// the top row it needs before the next EVEN pass.
    Forward,
}

/// Order of the two halves of an exchange for one rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    SendFirst,
    ReceiveFirst,
}

/// The role `rank` takes in a ring of `size` ranks.
pub fn role(rank: usize, size: usize) -> Role {
    if rank == 0 {
        Role::SendFirst
    } else if rank + 1 == size || rank % 2 == 1 {
        Role::ReceiveFirst
    } else {
        Role::SendFirst
    }
}

/// Exchange one row of `buf` with the ring neighbours.
///
/// Row `send_row` goes out, row `recv_row` is overwritten with the
/// neighbour's row. All ranks must call this with the same direction. A
/// single rank is its own neighbour and just copies the row across.
pub fn exchange_rows(
    endpoint: &Endpoint,
    direction: Direction,
    buf: &mut [Cell],
    width: usize,
    send_row: usize,
    recv_row: usize,
) -> Result<()> {
    let (dest, source, tag) = match direction {
        Direction::Backward => (endpoint.predecessor(), endpoint.successor(), Tag::Ghost),
        Direction::Forward => (endpoint.successor(), endpoint.predecessor(), Tag::Align),
    };
    let outgoing = send_row * width..(send_row + 1) * width;
    let incoming = recv_row * width..(recv_row + 1) * width;

    if endpoint.size() == 1 {
        buf.copy_within(outgoing, incoming.start);
        return Ok(());
    }

    let role = role(endpoint.rank(), endpoint.size());
    trace!(
        rank = endpoint.rank(),
        ?direction,
        ?role,
        dest,
        source,
        "exchanging boundary row"
    );

    match role {
        Role::SendFirst => {
            endpoint.send(dest, tag, &buf[outgoing])?;
            endpoint.recv_into(source, tag, &mut buf[incoming])?;
        }
        Role::ReceiveFirst => {
            endpoint.recv_into(source, tag, &mut buf[incoming])?;
            endpoint.send(dest, tag, &buf[outgoing])?;
        }
    }

    Ok(())
}
