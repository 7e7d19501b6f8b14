//! Self-healing default seeding.
//!
//! Runs on every fetch, not just the first. Categories are matched to the catalog
//! by title and metrics by (category, name), so the seeder only ever adds what is
//! missing and repeated runs converge. Rows the user created or renamed are never
//! touched.

use crate::{
    config::catalog::Catalog,
    entities::{Category as CategoryEntity, MetricDefinition as MetricEntity},
    errors::Result,
    model::{Category, MetricDefinition},
    remote::records,
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, EntityTrait};
use std::collections::HashSet;
use tracing::{info, instrument};
use uuid::Uuid;

/// What a healing pass added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Categories inserted
    pub categories_added: usize,
    /// Metric definitions inserted
    pub metrics_added: usize,
}

impl SeedReport {
    /// Whether nothing was missing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.categories_added == 0 && self.metrics_added == 0
    }
}

fn missing_categories(catalog: &Catalog, existing: &[Category]) -> Vec<Category> {
    let titles: HashSet<&str> = existing.iter().map(|c| c.title.as_str()).collect();
    let mut next_order = existing
        .iter()
        .map(|c| c.sort_order)
        .max()
        .map_or(0, |max| max + 1);

    catalog
        .categories
        .iter()
        .filter(|seed| !titles.contains(seed.title.as_str()))
        .map(|seed| {
            let category = Category {
                id: Uuid::new_v4().to_string(),
                title: seed.title.clone(),
                icon: seed.icon.clone(),
                color: seed.color.clone(),
                sort_order: next_order,
            };
            next_order += 1;
            category
        })
        .collect()
}

fn missing_metrics(
    catalog: &Catalog,
    categories: &[Category],
    existing: &[MetricDefinition],
) -> Vec<MetricDefinition> {
    let present: HashSet<(&str, &str)> = existing
        .iter()
        .filter_map(|m| m.area_id.as_deref().map(|area| (area, m.name.as_str())))
        .collect();

    categories
        .iter()
        .flat_map(|category| {
            catalog
                .metrics_for(&category.title)
                .iter()
                .map(move |seed| (category, seed))
        })
        .filter(|(category, seed)| !present.contains(&(category.id.as_str(), seed.name.as_str())))
        .map(|(category, seed)| MetricDefinition {
            id: Uuid::new_v4().to_string(),
            area_id: Some(category.id.clone()),
            name: seed.name.clone(),
            unit: seed.unit.clone(),
        })
        .collect()
}

/// Inserts whatever catalog defaults the user is missing and appends them to the
/// in-memory lists, so the caller can return the healed set without re-reading.
///
/// # Errors
/// Returns a database error if an insert fails.
#[instrument(skip(db, catalog, categories, metrics))]
pub async fn heal_defaults<C>(
    db: &C,
    user_id: &str,
    catalog: &Catalog,
    categories: &mut Vec<Category>,
    metrics: &mut Vec<MetricDefinition>,
) -> Result<SeedReport>
where
    C: ConnectionTrait,
{
    let new_categories = missing_categories(catalog, categories);
    if !new_categories.is_empty() {
        let created_at = Utc::now().timestamp_millis();
        CategoryEntity::insert_many(
            new_categories
                .iter()
                .map(|category| records::category_row(category, user_id, created_at)),
        )
        .exec_without_returning(db)
        .await?;
    }
    let categories_added = new_categories.len();
    categories.extend(new_categories);

    let new_metrics = missing_metrics(catalog, categories, metrics);
    if !new_metrics.is_empty() {
        MetricEntity::insert_many(
            new_metrics
                .iter()
                .map(|metric| records::metric_row(metric, user_id)),
        )
        .exec_without_returning(db)
        .await?;
    }
    let metrics_added = new_metrics.len();
    metrics.extend(new_metrics);

    let report = SeedReport {
        categories_added,
        metrics_added,
    };
    if !report.is_noop() {
        info!(
            user_id,
            categories_added, metrics_added, "Seeded missing catalog defaults"
        );
    }
    Ok(report)
}
