use chrono::{Datelike, NaiveDate};

use super::item::{shift_days, Item};

/// Smallest and largest zoom levels, in pixels per day.
pub const MIN_PIXELS_PER_DAY: f32 = 8.0;
pub const MAX_PIXELS_PER_DAY: f32 = 120.0;

/// A run of consecutive visible days that fall in the same month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSegment {
    /// e.g. "January 2024"
    pub label: String,
    pub days: usize,
    pub width: f32,
}

/// Manages the visible date range of the timeline and its pixel scale.
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date (inclusive).
    pub end: NaiveDate,
    /// Pixels per day (controls zoom level).
    pub pixels_per_day: f32,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate, pixels_per_day: f32) -> Self {
        Self {
            start,
            end,
            pixels_per_day,
        }
    }

    /// A viewport spanning all items with one spare day on each side.
    pub fn fit(items: &[Item], pixels_per_day: f32) -> Self {
        let today = chrono::Local::now().date_naive();
        let min = items.iter().map(|it| it.start).min().unwrap_or(today);
        let max = items.iter().map(|it| it.end).max().unwrap_or(today);
        let start = shift_days(min, -1).unwrap_or(min);
        let end = shift_days(max, 1).unwrap_or(max);
        Self::new(start, end, pixels_per_day)
    }

    /// Whole days from `a` to `b`, never negative.
    pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
        (b - a).num_days().max(0)
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        Self::days_between(self.start, date) as f32 * self.pixels_per_day
    }

    /// Width of a bar covering `start..=end`.
    pub fn bar_width(&self, start: NaiveDate, end: NaiveDate) -> f32 {
        (Self::days_between(start, end) + 1) as f32 * self.pixels_per_day
    }

    /// Number of visible day columns.
    pub fn total_days(&self) -> usize {
        Self::days_between(self.start, self.end) as usize + 1
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.total_days() as f32 * self.pixels_per_day
    }

    /// Every visible date, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take(self.total_days())
            .collect()
    }

    /// Group visible days into month header segments.
    pub fn month_segments(&self) -> Vec<MonthSegment> {
        let mut segments: Vec<MonthSegment> = Vec::new();
        let mut current: Option<(NaiveDate, usize)> = None;

        for day in self.days() {
            current = match current {
                Some((first, count))
                    if first.month() == day.month() && first.year() == day.year() =>
                {
                    Some((first, count + 1))
                }
                Some((first, count)) => {
                    segments.push(self.segment(first, count));
                    Some((day, 1))
                }
                None => Some((day, 1)),
            };
        }
        if let Some((first, count)) = current {
            segments.push(self.segment(first, count));
        }
        segments
    }

    fn segment(&self, first: NaiveDate, days: usize) -> MonthSegment {
        MonthSegment {
            label: first.format("%B %Y").to_string(),
            days,
            width: days as f32 * self.pixels_per_day,
        }
    }

    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.pixels_per_day = (self.pixels_per_day * 1.2).min(MAX_PIXELS_PER_DAY);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.pixels_per_day = (self.pixels_per_day / 1.2).max(MIN_PIXELS_PER_DAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::parse_date;

    fn sample() -> Vec<Item> {
        vec![
            Item::parse(1, "a", "2024-01-29", "2024-02-02").unwrap(),
            Item::parse(2, "b", "2024-02-01", "2024-02-03").unwrap(),
        ]
    }

    #[test]
    fn fit_pads_one_day_each_side() {
        let vp = TimelineViewport::fit(&sample(), 56.0);
        assert_eq!(vp.start, parse_date("2024-01-28").unwrap());
        assert_eq!(vp.end, parse_date("2024-02-04").unwrap());
        assert_eq!(vp.total_days(), 8);
        assert_eq!(vp.total_width(), 8.0 * 56.0);
    }

    #[test]
    fn bars_are_inclusive_of_both_ends() {
        let vp = TimelineViewport::fit(&sample(), 10.0);
        let d = |s| parse_date(s).unwrap();
        assert_eq!(vp.date_to_x(d("2024-01-29")), 10.0);
        assert_eq!(vp.bar_width(d("2024-02-01"), d("2024-02-01")), 10.0);
        assert_eq!(vp.bar_width(d("2024-02-01"), d("2024-02-03")), 30.0);
        // Dates before the view start clamp to zero rather than going negative.
        assert_eq!(vp.date_to_x(d("2023-12-01")), 0.0);
    }

    #[test]
    fn month_segments_split_at_month_change() {
        let vp = TimelineViewport::fit(&sample(), 10.0);
        let segments = vp.month_segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].label, "January 2024");
        assert_eq!(segments[0].days, 4);
        assert_eq!(segments[1].label, "February 2024");
        assert_eq!(segments[1].days, 4);
        let total: f32 = segments.iter().map(|s| s.width).sum();
        assert_eq!(total, vp.total_width());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = TimelineViewport::fit(&sample(), MAX_PIXELS_PER_DAY);
        vp.zoom_in();
        assert_eq!(vp.pixels_per_day, MAX_PIXELS_PER_DAY);
        for _ in 0..50 {
            vp.zoom_out();
        }
        assert_eq!(vp.pixels_per_day, MIN_PIXELS_PER_DAY);
    }
}
