//! Best-fit matching of waitlisted parties against available tables.
//!
//! Read-side only: the admin waitlist view pairs each waitlisted
//! registration with the tables that could seat it right now. Promotion is
//! a separate, explicit transactional operation -- nothing here mutates.

use serde::Serialize;

use crate::types::DbId;

/// A candidate table as seen by the matcher.
#[derive(Debug, Clone, Serialize)]
pub struct TableSlot {
    pub id: DbId,
    pub table_number: i32,
    pub capacity: i32,
    pub min_order: i32,
    pub table_order: i32,
}

/// A table fits a party when the guest count lies in `[min_order, capacity]`.
fn fits(slot: &TableSlot, guest_count: i32) -> bool {
    guest_count >= slot.min_order && guest_count <= slot.capacity
}

/// All tables that could seat `guest_count` guests, in the given order.
pub fn fitting_tables<'a>(guest_count: i32, tables: &'a [TableSlot]) -> Vec<&'a TableSlot> {
    tables.iter().filter(|t| fits(t, guest_count)).collect()
}

/// The smallest sufficient table: minimum capacity, ties broken by
/// `table_order`. `None` when no table can ever seat the party -- a
/// legitimate terminal waitlist state, not an error.
pub fn best_fit<'a>(guest_count: i32, tables: &'a [TableSlot]) -> Option<&'a TableSlot> {
    tables
        .iter()
        .filter(|t| fits(t, guest_count))
        .min_by_key(|t| (t.capacity, t.table_order))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: DbId, capacity: i32, min_order: i32, table_order: i32) -> TableSlot {
        TableSlot {
            id,
            table_number: id as i32,
            capacity,
            min_order,
            table_order,
        }
    }

    #[test]
    fn picks_smallest_sufficient_table() {
        let tables = vec![slot(1, 8, 2, 0), slot(2, 4, 2, 1), slot(3, 6, 2, 2)];
        assert_eq!(best_fit(4, &tables).unwrap().id, 2);
    }

    #[test]
    fn capacity_tie_broken_by_table_order() {
        let tables = vec![slot(1, 4, 2, 5), slot(2, 4, 2, 1)];
        assert_eq!(best_fit(3, &tables).unwrap().id, 2);
    }

    #[test]
    fn bounds_are_inclusive() {
        let tables = vec![slot(1, 6, 3, 0)];
        assert_eq!(best_fit(3, &tables).unwrap().id, 1);
        assert_eq!(best_fit(6, &tables).unwrap().id, 1);
    }

    #[test]
    fn below_every_min_order_has_no_match() {
        let tables = vec![slot(1, 8, 4, 0), slot(2, 6, 4, 1)];
        assert!(best_fit(2, &tables).is_none());
        assert!(fitting_tables(2, &tables).is_empty());
    }

    #[test]
    fn above_every_capacity_has_no_match() {
        let tables = vec![slot(1, 4, 2, 0), slot(2, 6, 2, 1)];
        assert!(best_fit(10, &tables).is_none());
    }

    #[test]
    fn fitting_tables_keeps_input_order() {
        let tables = vec![slot(1, 8, 2, 0), slot(2, 4, 2, 1), slot(3, 6, 5, 2)];
        let fitting = fitting_tables(4, &tables);
        let ids: Vec<DbId> = fitting.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
