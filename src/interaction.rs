//! Pointer and text gestures on timeline bars.
//!
//! A bar can be moved by dragging its body, resized by dragging either edge,
//! or renamed inline. At most one gesture is active; the whole state lives in
//! the [`Gesture`] union so that no combination of stale flags can exist.
//!
//! Drag previews are always derived from the snapshot taken at press time and
//! the total pointer offset, never from the previous preview. Releasing
//! recomputes the final dates the same way and hands back a fresh item list.

use crate::error::{Result, TimelineError};
use crate::model::item::shift_days;
use crate::model::{Item, ItemId};

/// Which edge of a bar is being resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

/// Where on a bar the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Body,
    Edge(Edge),
}

/// An in-flight drag: snapshot at press time plus the accumulated offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub snapshot: Item,
    pub anchor_x: f32,
    pub offset_px: f32,
    pub preview: Item,
}

/// An in-flight inline rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub id: ItemId,
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingBar(Drag),
    DraggingEdge(Edge, Drag),
    Editing(Rename),
}

/// Coarse gesture kind, for cursors and status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    Moving,
    Resizing(Edge),
    Editing,
}

/// What the renderer needs to draw the ghost bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureView<'a> {
    pub mode: GestureMode,
    pub preview: Option<&'a Item>,
    pub active_item: Option<ItemId>,
}

/// Tracks the active gesture and turns pointer offsets into day offsets.
#[derive(Debug, Clone)]
pub struct GestureMachine {
    pixels_per_day: f32,
    gesture: Gesture,
}

impl GestureMachine {
    pub fn new(pixels_per_day: f32) -> Result<Self> {
        check_scale(pixels_per_day)?;
        Ok(Self {
            pixels_per_day,
            gesture: Gesture::Idle,
        })
    }

    pub fn pixels_per_day(&self) -> f32 {
        self.pixels_per_day
    }

    /// Change the scale used for later pointer moves (e.g. after zooming).
    ///
    /// Rejected while a drag is active: its offset was measured at the old
    /// scale and the commit must land where the preview shows.
    pub fn set_pixels_per_day(&mut self, pixels_per_day: f32) -> Result<()> {
        check_scale(pixels_per_day)?;
        if self.is_dragging() {
            return Err(TimelineError::GestureInProgress);
        }
        self.pixels_per_day = pixels_per_day;
        Ok(())
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.gesture,
            Gesture::DraggingBar(_) | Gesture::DraggingEdge(..)
        )
    }

    pub fn view(&self) -> GestureView<'_> {
        match &self.gesture {
            Gesture::Idle => GestureView {
                mode: GestureMode::Idle,
                preview: None,
                active_item: None,
            },
            Gesture::DraggingBar(drag) => GestureView {
                mode: GestureMode::Moving,
                preview: Some(&drag.preview),
                active_item: Some(drag.snapshot.id),
            },
            Gesture::DraggingEdge(edge, drag) => GestureView {
                mode: GestureMode::Resizing(*edge),
                preview: Some(&drag.preview),
                active_item: Some(drag.snapshot.id),
            },
            Gesture::Editing(rename) => GestureView {
                mode: GestureMode::Editing,
                preview: None,
                active_item: Some(rename.id),
            },
        }
    }

    /// Pointer pressed on an item's body or one of its edge handles.
    ///
    /// Only valid from `Idle`; any other state is left untouched and the
    /// press is rejected.
    pub fn press(&mut self, items: &[Item], id: ItemId, target: PressTarget, x: f32) -> Result<()> {
        if !self.is_idle() {
            return Err(TimelineError::GestureInProgress);
        }
        let snapshot = find(items, id)?.clone();
        let drag = Drag {
            preview: snapshot.clone(),
            snapshot,
            anchor_x: x,
            offset_px: 0.0,
        };
        self.gesture = match target {
            PressTarget::Body => Gesture::DraggingBar(drag),
            PressTarget::Edge(edge) => Gesture::DraggingEdge(edge, drag),
        };
        tracing::debug!(item = id, ?target, x, "Gesture started");
        Ok(())
    }

    /// Pointer moved to `x`. Ignored unless a drag is active.
    pub fn pointer_move(&mut self, x: f32) -> Result<()> {
        let pixels_per_day = self.pixels_per_day;
        let (edge, drag) = match &mut self.gesture {
            Gesture::DraggingBar(drag) => (None, drag),
            Gesture::DraggingEdge(edge, drag) => (Some(*edge), drag),
            Gesture::Idle | Gesture::Editing(_) => return Ok(()),
        };
        let offset_px = x - drag.anchor_x;
        let preview = reshape(&drag.snapshot, edge, offset_days(offset_px, pixels_per_day))?;
        drag.offset_px = offset_px;
        drag.preview = preview;
        Ok(())
    }

    /// Pointer released: commit the drag and return the replacement list.
    ///
    /// Returns `None` when no drag was active. The machine is back in `Idle`
    /// afterwards even if the commit failed.
    pub fn release(&mut self, items: &[Item]) -> Result<Option<Vec<Item>>> {
        let (edge, drag) = match std::mem::take(&mut self.gesture) {
            Gesture::DraggingBar(drag) => (None, drag),
            Gesture::DraggingEdge(edge, drag) => (Some(edge), drag),
            other => {
                self.gesture = other;
                return Ok(None);
            }
        };
        let days = offset_days(drag.offset_px, self.pixels_per_day);
        let updated = reshape(&drag.snapshot, edge, days)?;
        tracing::debug!(item = updated.id, days, ?edge, "Gesture committed");
        replace(items, drag.snapshot.id, |item| {
            item.start = updated.start;
            item.end = updated.end;
        })
        .map(Some)
    }

    /// Double-click on a label: start editing that item's name.
    pub fn begin_rename(&mut self, items: &[Item], id: ItemId) -> Result<()> {
        if !self.is_idle() {
            return Err(TimelineError::GestureInProgress);
        }
        let item = find(items, id)?;
        self.gesture = Gesture::Editing(Rename {
            id,
            draft: item.name.clone(),
        });
        Ok(())
    }

    /// The pending name while editing.
    pub fn draft(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Editing(rename) => Some(&rename.draft),
            _ => None,
        }
    }

    /// Mutable access to the pending name, for text widgets.
    pub fn draft_mut(&mut self) -> Option<&mut String> {
        match &mut self.gesture {
            Gesture::Editing(rename) => Some(&mut rename.draft),
            _ => None,
        }
    }

    /// Replace the pending name. Ignored when not editing.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            *draft = text.into();
        }
    }

    /// Focus left the name field: write the draft into the item.
    ///
    /// Returns `None` when no rename was active.
    pub fn finish_rename(&mut self, items: &[Item]) -> Result<Option<Vec<Item>>> {
        let rename = match std::mem::take(&mut self.gesture) {
            Gesture::Editing(rename) => rename,
            other => {
                self.gesture = other;
                return Ok(None);
            }
        };
        let Rename { id, draft } = rename;
        replace(items, id, move |item| item.name = draft).map(Some)
    }
}

fn check_scale(pixels_per_day: f32) -> Result<()> {
    if pixels_per_day.is_finite() && pixels_per_day > 0.0 {
        Ok(())
    } else {
        Err(TimelineError::InvalidScale(pixels_per_day))
    }
}

/// Whole days represented by a pixel offset. Half days round up, toward
/// later dates, in both drag directions.
pub fn offset_days(offset_px: f32, pixels_per_day: f32) -> i64 {
    (offset_px / pixels_per_day + 0.5).floor() as i64
}

/// Apply a day offset to a snapshot: both dates for a move, one date for a
/// resize. Resizes stop at a one-day bar instead of crossing over.
fn reshape(snapshot: &Item, edge: Option<Edge>, days: i64) -> Result<Item> {
    let mut item = snapshot.clone();
    match edge {
        None => {
            item.start = shift_days(snapshot.start, days)?;
            item.end = shift_days(snapshot.end, days)?;
        }
        Some(Edge::Left) => {
            item.start = shift_days(snapshot.start, days)?.min(snapshot.end);
        }
        Some(Edge::Right) => {
            item.end = shift_days(snapshot.end, days)?.max(snapshot.start);
        }
    }
    Ok(item)
}

fn find(items: &[Item], id: ItemId) -> Result<&Item> {
    items
        .iter()
        .find(|it| it.id == id)
        .ok_or(TimelineError::UnknownItem(id))
}

/// Build a new list where only the item with `id` is changed.
fn replace(items: &[Item], id: ItemId, update: impl FnOnce(&mut Item)) -> Result<Vec<Item>> {
    let index = items
        .iter()
        .position(|it| it.id == id)
        .ok_or(TimelineError::UnknownItem(id))?;
    let mut next = items.to_vec();
    update(&mut next[index]);
    Ok(next)
}
