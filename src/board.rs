//! The authoritative item list plus its packed lanes and the active gesture.

use std::collections::HashSet;

use crate::error::{Result, TimelineError};
use crate::interaction::{GestureMachine, GestureView, PressTarget};
use crate::lanes::{pack, Packing};
use crate::model::{Item, ItemId};

/// Owns the item list. Every commit swaps in a whole new list and repacks
/// all lanes from scratch.
#[derive(Debug, Clone)]
pub struct Board {
    items: Vec<Item>,
    packing: Packing,
    gestures: GestureMachine,
}

impl Board {
    /// Validate the items (ids unique, `start <= end`) and pack them.
    pub fn new(items: Vec<Item>, pixels_per_day: f32) -> Result<Self> {
        validate_items(&items)?;
        let gestures = GestureMachine::new(pixels_per_day)?;
        let packing = pack(&items);
        tracing::info!(
            items = items.len(),
            lanes = packing.lane_count,
            "Board loaded"
        );
        Ok(Self {
            items,
            packing,
            gestures,
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|it| it.id == id)
    }

    pub fn packing(&self) -> &Packing {
        &self.packing
    }

    pub fn gesture(&self) -> GestureView<'_> {
        self.gestures.view()
    }

    pub fn is_dragging(&self) -> bool {
        self.gestures.is_dragging()
    }

    pub fn set_pixels_per_day(&mut self, pixels_per_day: f32) -> Result<()> {
        self.gestures.set_pixels_per_day(pixels_per_day)
    }

    /// Pointer down on a bar. A pending rename is committed first, the way a
    /// text field commits when it loses focus. A press that would be rejected
    /// leaves the rename pending.
    pub fn press(&mut self, id: ItemId, target: PressTarget, x: f32) -> Result<Option<Item>> {
        self.check_new_gesture(id)?;
        let renamed = self.finish_rename()?;
        self.gestures.press(&self.items, id, target, x)?;
        Ok(renamed)
    }

    pub fn pointer_move(&mut self, x: f32) -> Result<()> {
        self.gestures.pointer_move(x)
    }

    /// Pointer up: commit the drag. Returns the updated item, if any.
    pub fn release(&mut self) -> Result<Option<Item>> {
        let active = self.gestures.view().active_item;
        match self.gestures.release(&self.items)? {
            Some(next) => Ok(self.commit(next, active)),
            None => Ok(None),
        }
    }

    /// Double-click on a label. Any other pending rename is committed first.
    pub fn begin_rename(&mut self, id: ItemId) -> Result<Option<Item>> {
        self.check_new_gesture(id)?;
        let renamed = self.finish_rename()?;
        self.gestures.begin_rename(&self.items, id)?;
        Ok(renamed)
    }

    pub fn draft(&self) -> Option<&str> {
        self.gestures.draft()
    }

    pub fn draft_mut(&mut self) -> Option<&mut String> {
        self.gestures.draft_mut()
    }

    /// Name field lost focus: write the draft. Returns the renamed item.
    pub fn finish_rename(&mut self) -> Result<Option<Item>> {
        let active = self.gestures.view().active_item;
        match self.gestures.finish_rename(&self.items)? {
            Some(next) => Ok(self.commit(next, active)),
            None => Ok(None),
        }
    }

    fn check_new_gesture(&self, id: ItemId) -> Result<()> {
        if self.gestures.is_dragging() {
            return Err(TimelineError::GestureInProgress);
        }
        if self.item(id).is_none() {
            return Err(TimelineError::UnknownItem(id));
        }
        Ok(())
    }

    fn commit(&mut self, next: Vec<Item>, active: Option<ItemId>) -> Option<Item> {
        self.items = next;
        self.packing = pack(&self.items);
        let updated = active.and_then(|id| self.item(id)).cloned();
        if let Some(item) = &updated {
            tracing::info!(
                item = item.id,
                name = %item.name,
                start = %item.start,
                end = %item.end,
                lanes = self.packing.lane_count,
                "Committed item"
            );
        }
        updated
    }
}

fn validate_items(items: &[Item]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        item.validate()?;
        if !seen.insert(item.id) {
            return Err(TimelineError::DuplicateId(item.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{Edge, GestureMode};

    fn board() -> Board {
        Board::new(
            vec![
                Item::parse(1, "Alpha", "2024-01-01", "2024-01-05").unwrap(),
                Item::parse(2, "Beta", "2024-01-03", "2024-01-06").unwrap(),
                Item::parse(3, "Gamma", "2024-01-10", "2024-01-12").unwrap(),
            ],
            10.0,
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_ids() {
        let a = Item::parse(1, "a", "2024-01-01", "2024-01-02").unwrap();
        let err = Board::new(vec![a.clone(), a], 10.0).unwrap_err();
        assert!(matches!(err, TimelineError::DuplicateId(1)));
    }

    #[test]
    fn rejects_reversed_item() {
        let mut a = Item::parse(1, "a", "2024-01-01", "2024-01-02").unwrap();
        std::mem::swap(&mut a.start, &mut a.end);
        let err = Board::new(vec![a], 10.0).unwrap_err();
        assert!(matches!(err, TimelineError::InvariantViolation(_)));
    }

    #[test]
    fn moving_an_item_repacks_lanes() {
        let mut b = board();
        assert_eq!(b.packing().lane_count, 2);
        assert_eq!(b.packing().lane_of(2), Some(1));

        // Slide Beta past Alpha's end so the two no longer overlap.
        b.press(2, PressTarget::Body, 0.0).unwrap();
        b.pointer_move(30.0).unwrap();
        let updated = b.release().unwrap().unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(updated.start.to_string(), "2024-01-06");
        assert_eq!(b.packing().lane_count, 1);
        assert_eq!(b.packing().lane_of(2), Some(0));
        assert_eq!(b.items().len(), 3);
        assert_eq!(b.gesture().mode, GestureMode::Idle);
    }

    #[test]
    fn pressing_while_renaming_commits_the_rename() {
        let mut b = board();
        assert_eq!(b.begin_rename(1).unwrap(), None);
        if let Some(draft) = b.draft_mut() {
            draft.push_str(" (renamed)");
        }
        let renamed = b.press(3, PressTarget::Edge(Edge::Right), 0.0).unwrap().unwrap();
        assert_eq!(renamed.name, "Alpha (renamed)");
        assert_eq!(b.item(1).unwrap().name, "Alpha (renamed)");
        assert_eq!(b.gesture().mode, GestureMode::Resizing(Edge::Right));
    }

    #[test]
    fn rename_then_rename_other_commits_first() {
        let mut b = board();
        b.begin_rename(1).unwrap();
        if let Some(draft) = b.draft_mut() {
            *draft = "First".into();
        }
        let renamed = b.begin_rename(2).unwrap().unwrap();
        assert_eq!(renamed.name, "First");
        assert_eq!(b.draft(), Some("Beta"));
    }

    #[test]
    fn failed_press_keeps_the_pending_rename() {
        let mut b = board();
        b.begin_rename(1).unwrap();
        if let Some(draft) = b.draft_mut() {
            *draft = "Kept".into();
        }

        let err = b.press(99, PressTarget::Body, 0.0).unwrap_err();
        assert!(matches!(err, TimelineError::UnknownItem(99)));
        assert_eq!(b.gesture().mode, GestureMode::Editing);
        assert_eq!(b.draft(), Some("Kept"));
        assert_eq!(b.item(1).unwrap().name, "Alpha");

        let err = b.begin_rename(99).unwrap_err();
        assert!(matches!(err, TimelineError::UnknownItem(99)));
        assert_eq!(b.draft(), Some("Kept"));

        let renamed = b.finish_rename().unwrap().unwrap();
        assert_eq!(renamed.name, "Kept");
    }

    #[test]
    fn zoom_waits_for_the_drag_to_finish() {
        let mut b = board();
        b.press(2, PressTarget::Body, 0.0).unwrap();
        b.pointer_move(30.0).unwrap();
        assert!(matches!(
            b.set_pixels_per_day(40.0),
            Err(TimelineError::GestureInProgress)
        ));
        let updated = b.release().unwrap().unwrap();
        assert_eq!(updated.start.to_string(), "2024-01-06");
        b.set_pixels_per_day(40.0).unwrap();
    }

    #[test]
    fn release_without_gesture_returns_none() {
        let mut b = board();
        let before = b.items().to_vec();
        assert_eq!(b.release().unwrap(), None);
        assert_eq!(b.items(), before.as_slice());
    }
}
