//! In-memory registry of referenced entities and stored quality metrics.

use dashmap::{DashMap, DashSet};
use qcvault_core::quality_metric::{
    EntityKind, EntityRef, QualityMetricError, QualityMetricRepository, StoredQualityMetric,
};
use qcvault_shared::types::{PageRequest, QualityMetricId};
use uuid::Uuid;

/// Lock-sharded store for entity references and quality metric records.
#[derive(Debug, Default)]
pub struct Registry {
    entities: DashSet<EntityRef>,
    metrics: DashMap<QualityMetricId, StoredQualityMetric>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity, generating an id when none is given.
    pub fn register(&self, kind: EntityKind, id: Option<Uuid>) -> Uuid {
        let id = id.unwrap_or_else(Uuid::new_v4);
        self.entities.insert(EntityRef::new(kind, id));
        id
    }

    /// Whether the entity is registered.
    #[must_use]
    pub fn contains(&self, reference: &EntityRef) -> bool {
        self.entities.contains(reference)
    }

    /// Number of stored quality metrics.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }
}

impl QualityMetricRepository for Registry {
    async fn reference_exists(&self, reference: EntityRef) -> Result<bool, QualityMetricError> {
        Ok(self.contains(&reference))
    }

    async fn create(
        &self,
        metric: StoredQualityMetric,
    ) -> Result<StoredQualityMetric, QualityMetricError> {
        if self.metrics.contains_key(&metric.uuid) {
            return Err(QualityMetricError::repository(format!(
                "quality metric {} already exists",
                metric.uuid
            )));
        }
        self.metrics.insert(metric.uuid, metric.clone());
        Ok(metric)
    }

    async fn find_by_id(
        &self,
        id: QualityMetricId,
    ) -> Result<Option<StoredQualityMetric>, QualityMetricError> {
        Ok(self.metrics.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<StoredQualityMetric>, u64), QualityMetricError> {
        let mut all: Vec<StoredQualityMetric> =
            self.metrics.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by(|a, b| {
            a.date_created
                .cmp(&b.date_created)
                .then_with(|| a.uuid.into_inner().cmp(&b.uuid.into_inner()))
        });

        let total = all.len() as u64;
        let data = all
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect();
        Ok((data, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_generates_id() {
        let registry = Registry::new();
        let id = registry.register(EntityKind::Lab, None);
        assert!(registry.contains(&EntityRef::new(EntityKind::Lab, id)));
    }

    #[test]
    fn test_register_keeps_given_id() {
        let registry = Registry::new();
        let given = Uuid::new_v4();
        assert_eq!(registry.register(EntityKind::Award, Some(given)), given);
    }

    #[tokio::test]
    async fn test_kind_is_part_of_identity() {
        let registry = Registry::new();
        let id = registry.register(EntityKind::File, None);
        let as_replicate = EntityRef::new(EntityKind::Replicate, id);
        assert!(
            !registry
                .reference_exists(as_replicate)
                .await
                .expect("lookup")
        );
    }
}
