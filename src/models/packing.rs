use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ordering::SortOrder;
use super::{deserialize_some, text_enum};
use crate::errors::AppError;
use crate::utils::validation::validate_payload;

text_enum! {
    pub enum PackingCategory {
        Clothes => "clothes",
        Toiletries => "toiletries",
        Electronics => "electronics",
        Documents => "documents",
        Medicine => "medicine",
        Other => "other",
    }
    default = Other;
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct PackingItem {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub name: String,
    pub category: PackingCategory,
    pub is_packed: bool,
    pub quantity: i32,
    pub notes: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize, Validate, Debug)]
pub struct NewPackingItem {
    pub trip_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[serde(default)]
    pub category: PackingCategory,
    #[serde(default)]
    pub is_packed: bool,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub notes: Option<String>,
}

impl NewPackingItem {
    pub fn validate_all(&self) -> Result<(), AppError> {
        validate_payload(self)
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct PackingItemPatch {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub category: Option<PackingCategory>,
    pub is_packed: Option<bool>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl PackingItemPatch {
    pub fn apply(self, item: &mut PackingItem) -> Result<(), AppError> {
        validate_payload(&self)?;

        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(is_packed) = self.is_packed {
            item.is_packed = is_packed;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct BulkToggleRequest {
    pub item_ids: Vec<Uuid>,
    pub is_packed: bool,
}

impl BulkToggleRequest {
    /// Requested ids with repeats removed, first occurrence kept.
    pub fn unique_ids(&self) -> Vec<Uuid> {
        let mut seen = std::collections::HashSet::with_capacity(self.item_ids.len());
        self.item_ids.iter().copied().filter(|id| seen.insert(*id)).collect()
    }
}

#[derive(Deserialize, Debug)]
pub struct PackingReorderRequest {
    pub item_orders: Vec<SortOrder>,
}

/// Packed share of `total` as a percentage with one decimal.
pub fn progress_percent(packed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (packed as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: PackingCategory,
    pub total: i64,
    pub packed: i64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct CategoryProgress {
    pub category: PackingCategory,
    pub total: i64,
    pub packed: i64,
    pub progress_percent: f64,
}

#[derive(Serialize, Debug)]
pub struct PackingProgress {
    pub total_items: i64,
    pub packed_items: i64,
    pub progress_percent: f64,
    pub by_category: Vec<CategoryProgress>,
}

impl PackingProgress {
    pub fn from_counts(counts: Vec<CategoryCount>) -> Self {
        let total_items = counts.iter().map(|c| c.total).sum();
        let packed_items = counts.iter().map(|c| c.packed).sum();
        let by_category = counts
            .into_iter()
            .map(|c| CategoryProgress {
                category: c.category,
                total: c.total,
                packed: c.packed,
                progress_percent: progress_percent(c.packed, c.total),
            })
            .collect();

        PackingProgress {
            total_items,
            packed_items,
            progress_percent: progress_percent(packed_items, total_items),
            by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one_unpacked_item_in_other() {
        let item: NewPackingItem = serde_json::from_value(serde_json::json!({
            "trip_id": Uuid::new_v4(),
            "name": "Passport",
        }))
        .unwrap();
        assert_eq!(item.category, PackingCategory::Other);
        assert_eq!(item.quantity, 1);
        assert!(!item.is_packed);
        assert!(item.validate_all().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let item: NewPackingItem = serde_json::from_value(serde_json::json!({
            "trip_id": Uuid::new_v4(),
            "name": "Socks",
            "quantity": 0,
        }))
        .unwrap();
        assert!(matches!(item.validate_all(), Err(AppError::BadRequest(_))));

        let mut existing = PackingItem {
            id: Uuid::new_v4(),
            trip_id: Uuid::new_v4(),
            name: "Socks".to_string(),
            category: PackingCategory::Clothes,
            is_packed: false,
            quantity: 4,
            notes: None,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let patch: PackingItemPatch = serde_json::from_str(r#"{"quantity": 0}"#).unwrap();
        assert!(patch.apply(&mut existing).is_err());
        assert_eq!(existing.quantity, 4);
    }

    #[test]
    fn bulk_toggle_drops_repeated_ids() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let request = BulkToggleRequest {
            item_ids: vec![a, b, a],
            is_packed: true,
        };
        assert_eq!(request.unique_ids(), vec![a, b]);
    }

    #[test]
    fn progress_rounds_to_one_decimal() {
        assert_eq!(progress_percent(1, 3), 33.3);
        assert_eq!(progress_percent(2, 3), 66.7);
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(5, 5), 100.0);
    }

    #[test]
    fn progress_sums_categories() {
        let progress = PackingProgress::from_counts(vec![
            CategoryCount { category: PackingCategory::Clothes, total: 3, packed: 3 },
            CategoryCount { category: PackingCategory::Documents, total: 1, packed: 0 },
        ]);
        assert_eq!(progress.total_items, 4);
        assert_eq!(progress.packed_items, 3);
        assert_eq!(progress.progress_percent, 75.0);
        assert_eq!(progress.by_category[0].progress_percent, 100.0);
        assert_eq!(progress.by_category[1].progress_percent, 0.0);
    }
}
