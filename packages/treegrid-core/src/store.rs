use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::record::Record;

/// Async adapter over the host's record store.
///
/// Filter and order expressions are opaque strings in the host's native query
/// dialect; this crate only ever emits the shapes produced by [`equals_filter`]
/// and [`ascending_order`]. `max_count` truncates silently, there is no
/// continuation token.
#[async_trait]
pub trait RecordStore {
    /// Fetch one record by id. An empty `attributes` slice selects every field.
    async fn retrieve_one(&self, entity: &str, id: &str, attributes: &[&str]) -> Result<Record>;

    /// Fetch up to `max_count` records matching `filter`, ordered by `order`.
    async fn retrieve_many(
        &self,
        entity: &str,
        filter: &str,
        order: &str,
        max_count: usize,
    ) -> Result<Vec<Record>>;
}

/// `"<attribute> eq <value>"` in the host dialect.
pub fn equals_filter(attribute: &str, value: &str) -> String {
    format!("{attribute} eq {value}")
}

/// `"<attribute> asc"` in the host dialect.
pub fn ascending_order(attribute: &str) -> String {
    format!("{attribute} asc")
}

/// In-memory record store for early prototyping and tests.
///
/// Understands only the two query shapes this crate emits; anything else is a
/// transport failure, which keeps adapter misuse loud in tests.
#[derive(Default)]
pub struct MemoryRecordStore {
    id_attribute: String,
    records: HashMap<String, Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new(id_attribute: impl Into<String>) -> Self {
        Self {
            id_attribute: id_attribute.into(),
            records: HashMap::new(),
        }
    }

    pub fn insert(&mut self, entity: impl Into<String>, record: Record) {
        self.records.entry(entity.into()).or_default().push(record);
    }

    fn entity_records(&self, entity: &str) -> &[Record] {
        self.records.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn retrieve_one(&self, entity: &str, id: &str, _attributes: &[&str]) -> Result<Record> {
        // The memory adapter does not project columns; the full record comes back.
        self.entity_records(entity)
            .iter()
            .find(|r| r.text(&self.id_attribute) == Some(id))
            .cloned()
            .ok_or_else(|| Error::not_found(entity, id))
    }

    async fn retrieve_many(
        &self,
        entity: &str,
        filter: &str,
        order: &str,
        max_count: usize,
    ) -> Result<Vec<Record>> {
        let (filter_attr, filter_value) = filter
            .split_once(" eq ")
            .ok_or_else(|| Error::Transport(format!("unsupported filter expression: {filter}")))?;
        let order_attr = order
            .strip_suffix(" asc")
            .ok_or_else(|| Error::Transport(format!("unsupported order expression: {order}")))?;

        let mut matches: Vec<Record> = self
            .entity_records(entity)
            .iter()
            .filter(|r| r.text(filter_attr) == Some(filter_value))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.text(order_attr)
                .unwrap_or_default()
                .cmp(b.text(order_attr).unwrap_or_default())
        });
        matches.truncate(max_count);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryRecordStore {
        let mut store = MemoryRecordStore::new("itemid");
        for (id, name, root) in [("1", "beta", "1"), ("2", "alpha", "1"), ("3", "gamma", "9")] {
            store.insert(
                "item",
                Record::new()
                    .with("itemid", id)
                    .with("name", name)
                    .with("rootref", root),
            );
        }
        store
    }

    #[tokio::test]
    async fn retrieve_one_finds_by_id_attribute() {
        let store = store();
        let record = store.retrieve_one("item", "2", &[]).await.unwrap();
        assert_eq!(record.text("name"), Some("alpha"));

        let missing = store.retrieve_one("item", "42", &[]).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn retrieve_many_filters_orders_and_truncates() {
        let store = store();
        let filter = equals_filter("rootref", "1");
        let order = ascending_order("name");

        let all = store.retrieve_many("item", &filter, &order, 10).await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.text("name").unwrap()).collect();
        assert_eq!(names, ["alpha", "beta"]);

        let capped = store.retrieve_many("item", &filter, &order, 1).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].text("name"), Some("alpha"));
    }

    #[tokio::test]
    async fn foreign_dialects_are_rejected() {
        let store = store();
        let err = store
            .retrieve_many("item", "rootref gt 1", "name asc", 10)
            .await;
        assert!(matches!(err, Err(Error::Transport(_))));
    }
}
