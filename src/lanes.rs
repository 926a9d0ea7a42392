//! Lane assignment: greedy interval partitioning of dated items.
//!
//! Items are visited in order of start date and each one takes the first
//! lane whose last item ended strictly before it starts. Because both dates
//! are inclusive, an item ending on the 5th and one starting on the 5th
//! never share a lane. This first-fit order is optimal: the number of lanes
//! equals the largest set of items that all overlap each other.

use chrono::NaiveDate;

use crate::model::{Item, ItemId};

/// An item together with the lane it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedItem {
    pub item: Item,
    pub lane: usize,
}

/// Result of one packing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packing {
    /// Items in the order they were packed (by start date, ties in input order).
    pub placed: Vec<PlacedItem>,
    pub lane_count: usize,
}

impl Packing {
    /// Lane of the item with the given id, if it was packed.
    pub fn lane_of(&self, id: ItemId) -> Option<usize> {
        self.placed
            .iter()
            .find(|p| p.item.id == id)
            .map(|p| p.lane)
    }

    /// Placed items grouped per lane, lanes in index order.
    pub fn lanes(&self) -> Vec<Vec<&PlacedItem>> {
        let mut lanes: Vec<Vec<&PlacedItem>> = vec![Vec::new(); self.lane_count];
        for placed in &self.placed {
            lanes[placed.lane].push(placed);
        }
        lanes
    }
}

/// Assign every item to a lane so that no two items in one lane overlap.
pub fn pack(items: &[Item]) -> Packing {
    let mut sorted: Vec<&Item> = items.iter().collect();
    // `sort_by_key` is stable, so equal starts keep their input order.
    sorted.sort_by_key(|it| it.start);

    let mut lane_ends: Vec<NaiveDate> = Vec::new();
    let mut placed = Vec::with_capacity(sorted.len());

    for item in sorted {
        let lane = match lane_ends.iter().position(|end| *end < item.start) {
            Some(free) => {
                lane_ends[free] = item.end;
                free
            }
            None => {
                lane_ends.push(item.end);
                lane_ends.len() - 1
            }
        };
        placed.push(PlacedItem {
            item: item.clone(),
            lane,
        });
    }

    tracing::trace!(items = placed.len(), lanes = lane_ends.len(), "Packed lanes");

    Packing {
        placed,
        lane_count: lane_ends.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: ItemId, start: &str, end: &str) -> Item {
        Item::parse(id, format!("Item {id}"), start, end).unwrap()
    }

    #[test]
    fn reuses_lane_once_it_frees_up() {
        let items = vec![
            item(1, "2024-01-01", "2024-01-05"),
            item(2, "2024-01-03", "2024-01-06"),
            item(3, "2024-01-10", "2024-01-12"),
        ];
        let packing = pack(&items);
        assert_eq!(packing.lane_count, 2);
        assert_eq!(packing.lane_of(1), Some(0));
        assert_eq!(packing.lane_of(2), Some(1));
        assert_eq!(packing.lane_of(3), Some(0));
    }

    #[test]
    fn touching_endpoints_need_a_new_lane() {
        let items = vec![
            item(1, "2024-01-01", "2024-01-05"),
            item(2, "2024-01-05", "2024-01-08"),
        ];
        let packing = pack(&items);
        assert_eq!(packing.lane_count, 2);
        assert_eq!(packing.lane_of(2), Some(1));
    }

    #[test]
    fn next_day_start_shares_the_lane() {
        let items = vec![
            item(1, "2024-01-01", "2024-01-05"),
            item(2, "2024-01-06", "2024-01-08"),
        ];
        let packing = pack(&items);
        assert_eq!(packing.lane_count, 1);
    }

    #[test]
    fn output_is_sorted_by_start_with_stable_ties() {
        let items = vec![
            item(10, "2024-03-01", "2024-03-02"),
            item(20, "2024-01-01", "2024-01-02"),
            item(30, "2024-03-01", "2024-03-04"),
            item(40, "2024-01-01", "2024-01-09"),
        ];
        let packing = pack(&items);
        let order: Vec<ItemId> = packing.placed.iter().map(|p| p.item.id).collect();
        assert_eq!(order, vec![20, 40, 10, 30]);
        assert_eq!(packing.lane_of(20), Some(0));
        assert_eq!(packing.lane_of(40), Some(1));
        assert_eq!(packing.lane_of(10), Some(0));
        assert_eq!(packing.lane_of(30), Some(1));
    }

    #[test]
    fn first_fit_prefers_lowest_free_lane() {
        let items = vec![
            item(1, "2024-01-01", "2024-01-02"),
            item(2, "2024-01-01", "2024-01-10"),
            item(3, "2024-01-01", "2024-01-03"),
            item(4, "2024-01-05", "2024-01-06"),
        ];
        let packing = pack(&items);
        assert_eq!(packing.lane_count, 3);
        // Lanes 0 and 2 are both free by the 5th; the lower one wins.
        assert_eq!(packing.lane_of(4), Some(0));
    }

    #[test]
    fn empty_input_has_no_lanes() {
        let packing = pack(&[]);
        assert_eq!(packing.lane_count, 0);
        assert!(packing.placed.is_empty());
        assert!(packing.lanes().is_empty());
    }

    #[test]
    fn lanes_groups_items() {
        let items = vec![
            item(1, "2024-01-01", "2024-01-05"),
            item(2, "2024-01-03", "2024-01-06"),
            item(3, "2024-01-10", "2024-01-12"),
        ];
        let packing = pack(&items);
        let lanes = packing.lanes();
        let ids: Vec<Vec<ItemId>> = lanes
            .iter()
            .map(|lane| lane.iter().map(|p| p.item.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![1, 3], vec![2]]);
    }
}
