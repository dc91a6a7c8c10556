//! Makes sure the policy container and object exist.
//!
//! Listings are prefix-filtered by the store, so every page is scanned for
//! an exact name match. List-then-create is not atomic; a concurrent creator
//! winning the race shows up as "already exists", which counts as success.

use crate::error::AdapterResult;
use policyblob_store::{ListPage, ObjectStore, StoreResult};
use tracing::debug;

#[derive(Clone, Copy)]
enum Listing<'a> {
    Containers,
    Objects { container: &'a str },
}

/// Creates the container and an empty object when either is missing.
///
/// Calling it again on the same target is a no-op; existing content is
/// never overwritten.
pub async fn ensure_exists(
    store: &dyn ObjectStore,
    container: &str,
    object: &str,
) -> AdapterResult<()> {
    if !exists(store, Listing::Containers, container).await? {
        match store.create_container(container).await {
            Ok(()) => debug!("created container {container}"),
            Err(e) if e.is_already_exists() => {
                debug!("container {container} appeared concurrently: {e}")
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !exists(store, Listing::Objects { container }, object).await? {
        store.upload(container, object, Vec::new()).await?;
        debug!("created empty policy object {container}/{object}");
    }

    Ok(())
}

async fn exists(store: &dyn ObjectStore, listing: Listing<'_>, name: &str) -> StoreResult<bool> {
    let mut marker = None;
    loop {
        let page: ListPage = match listing {
            Listing::Containers => store.list_containers(name, marker).await?,
            Listing::Objects { container } => store.list_objects(container, name, marker).await?,
        };
        if page.contains(name) {
            return Ok(true);
        }
        if !page.has_more() {
            return Ok(false);
        }
        marker = page.next_marker;
    }
}
