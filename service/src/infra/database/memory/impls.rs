//! [`Database`] implementations.

use std::{mem, sync::Arc};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    read,
};

use super::{Connection, Error, Memory, NonTx, Tx, Write};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::from_non_tx(&self.0)))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let writes = mem::take(&mut *self.0.inner.pending.lock().await);
        let mut listings = self.0.state.listings.lock().await;

        // Validate every conditional write upfront, so a failed `Commit`
        // leaves the store untouched.
        for write in &writes {
            if let Write::Update(new) = write {
                let stored = listings.get(&new.id).ok_or_else(|| {
                    tracerr::new!(database::Error::from(Error::Vanished(
                        new.id
                    )))
                })?;
                if stored.revision != new.revision {
                    return Err(tracerr::new!(database::Error::from(
                        Error::RevisionConflict {
                            id: new.id,
                            stale: new.revision,
                        },
                    )));
                }
            }
        }

        for write in writes {
            match write {
                Write::Insert(new) => {
                    _ = listings.insert(new.id, new);
                }
                Write::Update(mut new) => {
                    new.revision = new.revision.next();
                    _ = listings.insert(new.id, new);
                }
            }
        }
        drop(listings);

        self.0.inner.guards.lock().await.clear();

        Ok(())
    }
}

impl Database<Lock<By<Listing, listing::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let mutex = Arc::clone(
            self.0.state.locks.lock().await.entry(id).or_default(),
        );
        let guard = mutex.lock_owned().await;
        self.0.inner.guards.lock().await.push(guard);

        Ok(())
    }
}

impl Database<Insert<Listing>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.inner.pending.lock().await.push(Write::Insert(listing));

        Ok(())
    }
}

impl Database<Update<Listing>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.inner.pending.lock().await.push(Write::Update(listing));

        Ok(())
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Memory<C>
where
    C: Connection + Sync,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        Ok(self
            .state()
            .listings
            .lock()
            .await
            .get(&id)
            .filter(|listing| !listing.is_deleted())
            .cloned())
    }
}

impl<C>
    Database<
        Select<By<read::listing::list::Page, read::listing::list::Selector>>,
    > for Memory<C>
where
    C: Connection + Sync,
{
    type Ok = read::listing::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::list::Page, read::listing::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use common::pagination::Order;

        let read::listing::list::Selector {
            arguments,
            filter: read::listing::list::Filter { title },
        } = by.into_inner();

        let needle =
            title.as_ref().map(|t| AsRef::<str>::as_ref(t).to_lowercase());
        let mut ids = self
            .state()
            .listings
            .lock()
            .await
            .values()
            .filter(|l| !l.is_deleted())
            .filter(|l| {
                needle.as_ref().map_or(true, |needle| {
                    AsRef::<str>::as_ref(&l.title)
                        .to_lowercase()
                        .contains(needle)
                })
            })
            .map(|l| l.id)
            .collect::<Vec<_>>();

        ids.sort_unstable_by_key(|id| Uuid::from(*id));
        if arguments.kind().order() == Order::Descending {
            ids.reverse();
        }

        // A cursor pointing at a `Listing` gone from the feed yields an
        // empty page.
        let start = match arguments.cursor() {
            Some(cursor) => match ids.iter().position(|id| id == cursor) {
                Some(pos) if arguments.kind().is_including() => pos,
                Some(pos) => pos + 1,
                None => ids.len(),
            },
            None => 0,
        };

        let limit = arguments.limit();
        let has_more = ids.len().saturating_sub(start) > limit;
        let edges = ids
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|id| (id, id))
            .collect::<Vec<_>>();

        Ok(read::listing::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::listing::list::TotalCount, ()>>>
    for Memory<C>
where
    C: Connection + Sync,
{
    type Ok = read::listing::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::listing::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let count = self
            .state()
            .listings
            .lock()
            .await
            .values()
            .filter(|l| !l.is_deleted())
            .count();

        Ok(i32::try_from(count).unwrap_or(i32::MAX).into())
    }
}

impl Database<Delete<By<Listing, listing::DeletionDateTime>>>
    for Memory<NonTx>
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing, listing::DeletionDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline = by.into_inner();

        let mut listings = self.state().listings.lock().await;
        let before = listings.len();
        listings.retain(|_, l| l.deleted_at.map_or(true, |at| at > deadline));
        let removed = before - listings.len();

        // A pruned `Listing` cannot be locked meaningfully anymore, so its
        // mutex goes too.
        self.state()
            .locks
            .lock()
            .await
            .retain(|id, _| listings.contains_key(id));
        drop(listings);

        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Commit, Delete, Insert, Lock, Select, Transact},
        DateTime,
    };

    use crate::{
        domain::{listing, user, Listing},
        infra::{database, Database as _},
        read,
    };

    use super::{Error, Memory};

    fn listing(owner: user::Id) -> Listing {
        Listing {
            id: listing::Id::new(),
            owner,
            title: "Loft with a view".parse().unwrap(),
            address: "7 Canal St, Manchester".parse().unwrap(),
            price: "180000GBP".parse().unwrap(),
            boosted_until: None,
            stats: listing::ViewStats::default(),
            favorites: listing::Favorites::default(),
            reviews: Vec::new(),
            reports: Vec::new(),
            revision: listing::Revision::default(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    async fn stored(db: &Memory, id: listing::Id) -> Option<Listing> {
        db.execute(Select(By::<Option<Listing>, _>::new(id)))
            .await
            .unwrap()
    }

    async fn insert(db: &Memory, listing: Listing) {
        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(listing)).await.unwrap();
        tx.execute(Commit).await.unwrap();
    }

    #[tokio::test]
    async fn writes_apply_on_commit_only() {
        let db = Memory::new();
        let new = listing(user::Id::new());
        let id = new.id;

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(new)).await.unwrap();
        assert!(stored(&db, id).await.is_none());

        tx.execute(Commit).await.unwrap();
        assert!(stored(&db, id).await.is_some());
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let db = Memory::new();
        let new = listing(user::Id::new());
        let id = new.id;

        {
            let tx = db.execute(Transact).await.unwrap();
            tx.execute(Insert(new)).await.unwrap();
        }

        assert!(stored(&db, id).await.is_none());
    }

    #[tokio::test]
    async fn stale_revision_write_is_rejected() {
        let db = Memory::new();
        let new = listing(user::Id::new());
        let id = new.id;
        insert(&db, new).await;

        let stale = stored(&db, id).await.unwrap();

        let mut fresh = stored(&db, id).await.unwrap();
        let tx = db.execute(Transact).await.unwrap();
        fresh.record_view(Some(user::Id::new()), DateTime::now());
        tx.execute(common::operations::Update(fresh)).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(common::operations::Update(stale)).await.unwrap();
        let err = tx.execute(Commit).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            database::Error::Memory(Error::RevisionConflict { .. }),
        ));
        assert_eq!(stored(&db, id).await.unwrap().stats.views(), 1);
    }

    #[tokio::test]
    async fn aggregate_lock_serializes_transactions() {
        let db = Memory::new();
        let new = listing(user::Id::new());
        let id = new.id;
        insert(&db, new).await;

        let tx1 = db.execute(Transact).await.unwrap();
        tx1.execute(Lock(By::<Listing, _>::new(id))).await.unwrap();

        let tx2 = db.execute(Transact).await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            tx2.execute(Lock(By::<Listing, _>::new(id))),
        )
        .await;
        assert!(blocked.is_err());

        drop(tx1);
        tx2.execute(Lock(By::<Listing, _>::new(id))).await.unwrap();
    }

    #[tokio::test]
    async fn soft_deleted_listing_is_hidden_from_reads() {
        let db = Memory::new();
        let mut new = listing(user::Id::new());
        let id = new.id;
        new.deleted_at = Some(DateTime::now().coerce());
        insert(&db, new).await;

        assert!(stored(&db, id).await.is_none());

        let total: read::listing::list::TotalCount = db
            .execute(Select(By::new(())))
            .await
            .unwrap();
        assert_eq!(i32::from(total), 0);
    }

    #[tokio::test]
    async fn prune_removes_expired_soft_deleted_only() {
        let db = Memory::new();
        let now = DateTime::now();

        let alive = listing(user::Id::new());
        let alive_id = alive.id;
        insert(&db, alive).await;

        let mut fresh = listing(user::Id::new());
        fresh.deleted_at = Some(now.coerce());
        let fresh_id = fresh.id;
        insert(&db, fresh).await;

        let mut expired = listing(user::Id::new());
        expired.deleted_at =
            Some((now - Duration::from_secs(60 * 60)).coerce());
        insert(&db, expired).await;

        let removed = db
            .execute(Delete(By::<Listing, listing::DeletionDateTime>::new(
                (now - Duration::from_secs(60)).coerce(),
            )))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(stored(&db, alive_id).await.is_some());
        // Still soft-deleted, hidden but not reclaimed yet.
        assert!(stored(&db, fresh_id).await.is_none());
    }

    #[tokio::test]
    async fn feed_paginates_forward() {
        let db = Memory::new();
        for _ in 0..3 {
            insert(&db, listing(user::Id::new())).await;
        }

        let args = read::listing::list::Arguments::new(
            Some(2),
            None,
            None::<i32>,
            None,
            10,
        )
        .unwrap();
        let page: read::listing::list::Page = db
            .execute(Select(By::new(read::listing::list::Selector {
                arguments: args,
                filter: read::listing::list::Filter::default(),
            })))
            .await
            .unwrap();

        assert_eq!(page.edges.len(), 2);
        assert!(page.page_info().has_next_page);

        let cursor = page.edges.last().unwrap().cursor;
        let args = read::listing::list::Arguments::new(
            Some(2),
            Some(cursor),
            None::<i32>,
            None,
            10,
        )
        .unwrap();
        let page: read::listing::list::Page = db
            .execute(Select(By::new(read::listing::list::Selector {
                arguments: args,
                filter: read::listing::list::Filter::default(),
            })))
            .await
            .unwrap();

        assert_eq!(page.edges.len(), 1);
        assert!(!page.page_info().has_next_page);
    }
}
