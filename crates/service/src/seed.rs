//! Stock data used to bootstrap an empty store.

use models::Category;
use tracing::info;

use crate::adapters::CategoriesAdapter;
use crate::errors::ServiceError;
use crate::storage::DocumentStore;

pub fn default_categories() -> Vec<Category> {
    let cat = |name: &str, description: &str, icon: &str, color: &str| Category {
        name: name.into(),
        description: description.into(),
        icon: icon.into(),
        color: color.into(),
        service_count: None,
    };
    vec![
        cat("توصيل داخلي", "توصيل الطلبات والأغراض داخل المدينة", "🚚", "#22c55e"),
        cat("رحلات خارجية", "رحلات بين المدن مع تحديد الوجهات", "🚌", "#3b82f6"),
        cat("صيانة منزلية", "سباكة وكهرباء وتكييف", "🔧", "#f59e0b"),
    ]
}

/// Insert the stock categories when the categories collection is empty; returns how many were written.
pub async fn seed_if_empty(store: &dyn DocumentStore) -> Result<usize, ServiceError> {
    let categories = CategoriesAdapter::new(store)?;
    if !categories.list().await?.is_empty() {
        info!("categories already present; skipping seed");
        return Ok(0);
    }
    let defaults = default_categories();
    for c in &defaults {
        categories.create(c).await?;
    }
    info!(count = defaults.len(), "seeded default categories");
    Ok(defaults.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::COLLECTIONS;
    use crate::file::document_store::FileDocumentStore;

    #[tokio::test]
    async fn seeding_runs_once() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("seed_{}", uuid::Uuid::new_v4()));
        let store = FileDocumentStore::open(&dir, &COLLECTIONS).await?;
        assert_eq!(seed_if_empty(store.as_ref()).await?, 3);
        assert_eq!(seed_if_empty(store.as_ref()).await?, 0);
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
