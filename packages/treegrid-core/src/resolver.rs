use tracing::debug;

use crate::config::TreeConfig;
use crate::error::Result;
use crate::record::{Record, RecordRef};
use crate::store::RecordStore;

/// Determine the tree's root for the record currently in context.
///
/// Probes the start record's root-pointer attribute and follows it when set.
/// A null or absent pointer is not an error: by the self-rooted convention it
/// means the start record is itself the root. Either way the root is refetched
/// in full so its label attribute is populated for the snapshot.
pub async fn resolve_root<S>(store: &S, config: &TreeConfig, start: &RecordRef) -> Result<Record>
where
    S: RecordStore + ?Sized,
{
    let Some(root_attribute) = config.root_attribute.as_deref() else {
        // Root mapping disabled: every record is its own root.
        return store.retrieve_one(&start.entity, &start.id, &[]).await;
    };

    let probe = store
        .retrieve_one(
            &start.entity,
            &start.id,
            &[config.id_attribute.as_str(), root_attribute],
        )
        .await?;

    let root_id = probe
        .text(root_attribute)
        .or_else(|| probe.text(&config.id_attribute))
        .unwrap_or(&start.id)
        .to_string();
    debug!(start = %start.id, root = %root_id, "resolved tree root");

    store.retrieve_one(&start.entity, &root_id, &[]).await
}
