use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::utils::validation::validate_payload;

/// Largest accepted sort key. New rows are appended at `max + 1`, which must
/// stay inside the `INTEGER` column.
pub const MAX_SORT_ORDER: i32 = 1_000_000;

#[derive(Deserialize, Serialize, Validate, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub id: Uuid,
    #[validate(range(min = 0, max = 1000000, message = "sort_order must be between 0 and 1000000"))]
    pub sort_order: i32,
}

/// Rejects batches that name the same row twice or use out-of-range keys.
pub fn validate_sort_orders(orders: &[SortOrder]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(orders.len());
    for order in orders {
        validate_payload(order)?;
        if !seen.insert(order.id) {
            return Err(AppError::BadRequest(format!(
                "Item {} appears more than once",
                order.id
            )));
        }
    }
    Ok(())
}

pub fn ids(orders: &[SortOrder]) -> Vec<Uuid> {
    orders.iter().map(|order| order.id).collect()
}

pub fn sort_orders(orders: &[SortOrder]) -> Vec<i32> {
    orders.iter().map(|order| order.sort_order).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_rejected() {
        let id = Uuid::new_v4();
        let orders = [
            SortOrder { id, sort_order: 0 },
            SortOrder { id: Uuid::new_v4(), sort_order: 1 },
            SortOrder { id, sort_order: 2 },
        ];
        assert!(matches!(validate_sort_orders(&orders), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn keys_outside_the_range_are_rejected() {
        let id = Uuid::new_v4();
        for bad in [-1, MAX_SORT_ORDER + 1, i32::MAX] {
            let orders = [SortOrder { id, sort_order: bad }];
            assert!(
                matches!(validate_sort_orders(&orders), Err(AppError::BadRequest(_))),
                "{} accepted",
                bad
            );
        }
        let edge = [SortOrder { id, sort_order: MAX_SORT_ORDER }];
        assert!(validate_sort_orders(&edge).is_ok());
    }

    #[test]
    fn splits_into_parallel_columns() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let orders = [
            SortOrder { id: a, sort_order: 5 },
            SortOrder { id: b, sort_order: 1 },
        ];
        assert!(validate_sort_orders(&orders).is_ok());
        assert_eq!(ids(&orders), vec![a, b]);
        assert_eq!(sort_orders(&orders), vec![5, 1]);
    }
}
