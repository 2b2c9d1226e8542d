//! In-process [`Database`] implementation.
//!
//! Aggregates are kept whole in a single map, so a write replaces the
//! entire [`Listing`] with its embedded reviews, responses and reports.

mod impls;

use std::{collections::HashMap, sync::Arc};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{listing, Listing};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx {
            state: Arc::default(),
        })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Shared [`State`] of the store.
    state: Arc<State>,
}

/// Transactional [`Memory`] client.
///
/// Writes are buffered and applied to the shared [`State`] atomically on
/// `Commit`. A dropped [`Tx`] discards its writes and releases the
/// aggregate locks it holds.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Shared [`State`] of the store.
    state: Arc<State>,

    /// Inner representation of this client.
    inner: Arc<Inner>,
}

/// Inner representation of the [`Tx`] client.
#[derive(Debug, Default)]
struct Inner {
    /// Aggregate locks held by this transaction.
    guards: Mutex<Vec<OwnedMutexGuard<()>>>,

    /// Writes buffered until `Commit`.
    pending: Mutex<Vec<Write>>,
}

impl Tx {
    /// Creates a new [`Tx`] client on top of the provided [`NonTx`] one.
    #[must_use]
    pub fn from_non_tx(client: &NonTx) -> Self {
        Self {
            state: Arc::clone(&client.state),
            inner: Arc::default(),
        }
    }
}

/// Shared state of a [`Memory`] store.
#[derive(Debug, Default)]
pub struct State {
    /// Stored [`Listing`]s, soft-deleted ones included.
    listings: Mutex<HashMap<listing::Id, Listing>>,

    /// Per-aggregate locks serializing writes to the same [`Listing`].
    locks: Mutex<HashMap<listing::Id, Arc<Mutex<()>>>>,
}

/// Buffered write of a [`Tx`] client.
#[derive(Debug)]
enum Write {
    /// New [`Listing`] to store.
    Insert(Listing),

    /// Existing [`Listing`] to replace, conditional on its
    /// [`listing::Revision`].
    Update(Listing),
}

/// Connection to the shared [`State`] of a [`Memory`] store.
pub trait Connection {
    /// Returns the shared [`State`] behind this connection.
    fn state(&self) -> &State;
}

impl Connection for NonTx {
    fn state(&self) -> &State {
        &self.state
    }
}

impl Connection for Tx {
    fn state(&self) -> &State {
        &self.state
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Conditional write carried a stale [`listing::Revision`].
    #[display(
        "`Listing(id: {id})` write carries stale revision {stale}"
    )]
    RevisionConflict {
        /// ID of the [`Listing`] the write was aimed at.
        id: listing::Id,

        /// Stale [`listing::Revision`] the write carried.
        stale: listing::Revision,
    },

    /// Conditional write was aimed at a [`Listing`] that is gone.
    #[display("`Listing(id: {_0})` is gone")]
    Vanished(#[error(not(source))] listing::Id),
}
