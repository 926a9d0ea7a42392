pub mod item;
pub mod timeline;

pub use item::{Item, ItemId};
pub use timeline::{MonthSegment, TimelineViewport};
