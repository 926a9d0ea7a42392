use chrono::{Datelike, Weekday};
use egui::{Align2, Color32, Id, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use gantt_lanes::board::Board;
use gantt_lanes::error::{Result, TimelineError};
use gantt_lanes::interaction::{Edge, GestureMode, PressTarget};
use gantt_lanes::model::{Item, ItemId, TimelineViewport};

use crate::ui::theme;

/// Vertical geometry of one lane.
#[derive(Debug, Clone, Copy)]
pub struct LaneGeometry {
    pub row_height: f32,
    pub row_gap: f32,
}

impl LaneGeometry {
    fn pitch(&self) -> f32 {
        self.row_height + self.row_gap
    }

    fn lane_top(&self, origin: Pos2, lane: usize) -> f32 {
        origin.y + theme::HEADER_HEIGHT + lane as f32 * self.pitch()
    }
}

/// Result details from interactions in the timeline chart.
#[derive(Debug, Default)]
pub struct ChartInteraction {
    /// Last item written back to the board this frame.
    pub committed: Option<Item>,
    pub error: Option<TimelineError>,
    pub zoom: Option<ZoomRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomRequest {
    In,
    Out,
}

impl ChartInteraction {
    fn record(&mut self, result: Result<Option<Item>>) {
        match result {
            Ok(Some(item)) => self.committed = Some(item),
            Ok(None) => {}
            Err(e) => self.error = Some(e),
        }
    }
}

/// Render the lane chart and route pointer/text events into the board.
pub fn show_timeline_chart(
    board: &mut Board,
    viewport: &TimelineViewport,
    geometry: LaneGeometry,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    let lane_count = board.packing().lane_count;
    let chart_width = viewport.total_width().max(available.x);
    let chart_height = theme::HEADER_HEIGHT + lane_count as f32 * geometry.pitch() + 12.0;

    // Ctrl+scroll zooms
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll > 0.0 {
            interaction.zoom = Some(ZoomRequest::In);
        } else if scroll < 0.0 {
            interaction.zoom = Some(ZoomRequest::Out);
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::hover(),
            );
            let origin = response.rect.min;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_lanes(&painter, origin, chart_width, lane_count, geometry);
            draw_grid(&painter, origin, viewport, response.rect.bottom());
            draw_header(&painter, origin, viewport, chart_width);

            // The placed list is replaced on commit, so iterate a copy.
            let placed = board.packing().placed.clone();
            let active = board.gesture().active_item;

            for p in &placed {
                let item = &p.item;
                let top = geometry.lane_top(origin, p.lane) + geometry.row_gap * 0.5;
                let bar_rect = bar_rect(origin, viewport, item, top, geometry.row_height);
                let editing = board.gesture().mode == GestureMode::Editing && active == Some(item.id);

                draw_bar(&painter, bar_rect, item, active == Some(item.id) && !editing, !editing);

                let bar_response = ui.interact(
                    bar_rect,
                    ui.make_persistent_id(("item-bar", item.id)),
                    Sense::click_and_drag(),
                );
                let left_response = ui.interact(
                    handle_rect(bar_rect, Edge::Left),
                    ui.make_persistent_id(("item-resize-left", item.id)),
                    Sense::drag(),
                );
                let right_response = ui.interact(
                    handle_rect(bar_rect, Edge::Right),
                    ui.make_persistent_id(("item-resize-right", item.id)),
                    Sense::drag(),
                );

                let press_x = || {
                    ui.input(|i| i.pointer.press_origin())
                        .or_else(|| bar_response.interact_pointer_pos())
                        .map(|p| p.x)
                        .unwrap_or(bar_rect.left())
                };

                if left_response.drag_started() {
                    interaction.record(board.press(item.id, PressTarget::Edge(Edge::Left), press_x()));
                } else if right_response.drag_started() {
                    interaction.record(board.press(item.id, PressTarget::Edge(Edge::Right), press_x()));
                } else if bar_response.drag_started() {
                    interaction.record(board.press(item.id, PressTarget::Body, press_x()));
                }

                if bar_response.double_clicked() {
                    interaction.record(board.begin_rename(item.id));
                }

                if left_response.hovered() || right_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                    draw_handles(&painter, bar_rect);
                } else if bar_response.hovered() && board.gesture().mode == GestureMode::Idle {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        Id::new(("item-tip", item.id)),
                        |ui| {
                            ui.strong(&item.name);
                            ui.label(format!("{} — {}", item.start, item.end));
                        },
                    );
                }

                if board.gesture().active_item == Some(item.id)
                    && board.gesture().mode == GestureMode::Editing
                {
                    show_name_editor(board, item.id, bar_rect, ui, &mut interaction);
                }
            }

            drive_drag(board, ui, &mut interaction);
            draw_preview(board, origin, viewport, geometry, &painter);
            forget_stale_focus(board, ui);
        });

    interaction
}

/// Feed pointer movement and release into an active drag.
fn drive_drag(board: &mut Board, ui: &mut Ui, interaction: &mut ChartInteraction) {
    if !board.is_dragging() {
        return;
    }
    match board.gesture().mode {
        GestureMode::Resizing(_) => ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal),
        _ => ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing),
    }
    if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
        if let Err(e) = board.pointer_move(pos.x) {
            interaction.error = Some(e);
        }
    }
    if ui.input(|i| i.pointer.any_released()) {
        interaction.record(board.release());
    }
}

/// Inline text field over the bar label; losing focus commits the name.
fn show_name_editor(
    board: &mut Board,
    id: ItemId,
    bar_rect: Rect,
    ui: &mut Ui,
    interaction: &mut ChartInteraction,
) {
    let focus_key = rename_focus_key();
    let lost_focus = match board.draft_mut() {
        Some(draft) => {
            let field_rect = Rect::from_min_size(
                bar_rect.min + Vec2::new(4.0, 3.0),
                Vec2::new((bar_rect.width() - 8.0).max(80.0), 20.0),
            );
            let response = ui.put(
                field_rect,
                egui::TextEdit::singleline(draft)
                    .font(theme::font_bar())
                    .text_color(theme::TEXT_PRIMARY),
            );
            let focused_for: Option<ItemId> = ui.ctx().data(|d| d.get_temp(focus_key));
            if focused_for != Some(id) {
                response.request_focus();
                ui.ctx().data_mut(|d| d.insert_temp(focus_key, id));
            }
            response.lost_focus()
        }
        None => false,
    };
    if lost_focus {
        ui.ctx().data_mut(|d| d.remove::<ItemId>(focus_key));
        interaction.record(board.finish_rename());
    }
}

/// Remembers which item's name field already received focus.
fn rename_focus_key() -> Id {
    Id::new("rename-focus")
}

/// A rename can end without the field losing focus (another press or
/// double-click commits it), so drop the remembered id once it no longer
/// matches the item being edited.
fn forget_stale_focus(board: &Board, ui: &Ui) {
    let key = rename_focus_key();
    let remembered: Option<ItemId> = ui.ctx().data(|d| d.get_temp(key));
    if focus_is_stale(remembered, editing_item(board)) {
        ui.ctx().data_mut(|d| d.remove::<ItemId>(key));
    }
}

fn editing_item(board: &Board) -> Option<ItemId> {
    let view = board.gesture();
    (view.mode == GestureMode::Editing)
        .then_some(view.active_item)
        .flatten()
}

fn focus_is_stale(remembered: Option<ItemId>, editing: Option<ItemId>) -> bool {
    remembered.is_some() && remembered != editing
}

fn bar_rect(
    origin: Pos2,
    viewport: &TimelineViewport,
    item: &Item,
    top: f32,
    height: f32,
) -> Rect {
    Rect::from_min_size(
        Pos2::new(origin.x + viewport.date_to_x(item.start), top),
        Vec2::new(viewport.bar_width(item.start, item.end), height),
    )
}

fn handle_rect(bar_rect: Rect, edge: Edge) -> Rect {
    let x = match edge {
        Edge::Left => bar_rect.left(),
        Edge::Right => bar_rect.right(),
    };
    Rect::from_min_max(
        Pos2::new(x - theme::HANDLE_WIDTH * 0.5, bar_rect.top()),
        Pos2::new(x + theme::HANDLE_WIDTH * 0.5, bar_rect.bottom()),
    )
}

fn draw_lanes(
    painter: &egui::Painter,
    origin: Pos2,
    width: f32,
    lane_count: usize,
    geometry: LaneGeometry,
) {
    for lane in 0..lane_count {
        let y = geometry.lane_top(origin, lane);
        let fill = if lane % 2 == 1 {
            theme::BG_LANE_ALT
        } else {
            theme::BG_DARK
        };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, geometry.pitch())),
            0.0,
            fill,
        );
        painter.line_segment(
            [
                Pos2::new(origin.x, y + geometry.pitch()),
                Pos2::new(origin.x + width, y + geometry.pitch()),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
        painter.text(
            Pos2::new(origin.x + 6.0, y + 2.0),
            Align2::LEFT_TOP,
            format!("Lane {}", lane + 1),
            theme::font_small(),
            theme::TEXT_DIM,
        );
    }
}

fn draw_grid(painter: &egui::Painter, origin: Pos2, viewport: &TimelineViewport, bottom: f32) {
    for (i, day) in viewport.days().into_iter().enumerate() {
        let x = origin.x + viewport.date_to_x(day);
        let color = if i % 7 == 0 {
            theme::GRID_LINE_MAJOR
        } else {
            theme::GRID_LINE
        };
        painter.line_segment(
            [Pos2::new(x, origin.y + theme::HEADER_HEIGHT), Pos2::new(x, bottom)],
            Stroke::new(0.5, color),
        );
    }
}

fn draw_header(painter: &egui::Painter, origin: Pos2, viewport: &TimelineViewport, width: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, theme::HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );

    // Month row
    let mut x = origin.x;
    for segment in viewport.month_segments() {
        let rect = Rect::from_min_size(
            Pos2::new(x, origin.y),
            Vec2::new(segment.width, theme::MONTH_HEIGHT),
        );
        painter.with_clip_rect(rect).text(
            Pos2::new(x + 6.0, rect.center().y),
            Align2::LEFT_CENTER,
            &segment.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
        painter.line_segment(
            [Pos2::new(x, origin.y), Pos2::new(x, origin.y + theme::MONTH_HEIGHT)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        x += segment.width;
    }

    // Day row
    let show_weekday = viewport.pixels_per_day >= 28.0;
    for day in viewport.days() {
        let x = origin.x + viewport.date_to_x(day);
        let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        let color = if weekend {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };
        let label = if show_weekday {
            day.format("%a %-d").to_string()
        } else {
            day.day().to_string()
        };
        painter.text(
            Pos2::new(
                x + viewport.pixels_per_day * 0.5,
                origin.y + theme::MONTH_HEIGHT + theme::DAYS_HEIGHT * 0.5,
            ),
            Align2::CENTER_CENTER,
            label,
            theme::font_sub(),
            color,
        );
    }

    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + theme::HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + theme::HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_bar(painter: &egui::Painter, rect: Rect, item: &Item, is_active: bool, show_label: bool) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(
        rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(rect, rounding, theme::color_for(item.id));

    if is_active {
        painter.rect_stroke(
            rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if show_label && rect.width() > 30.0 {
        let clipped = painter.with_clip_rect(rect.shrink(2.0));
        clipped.text(
            Pos2::new(rect.left() + 6.0, rect.top() + 4.0),
            Align2::LEFT_TOP,
            &item.name,
            theme::font_bar(),
            theme::TEXT_ON_BAR,
        );
        clipped.text(
            Pos2::new(rect.left() + 6.0, rect.bottom() - 4.0),
            Align2::LEFT_BOTTOM,
            format!("{} — {}", item.start, item.end),
            theme::font_small(),
            Color32::from_white_alpha(200),
        );
    }
}

fn draw_handles(painter: &egui::Painter, bar_rect: Rect) {
    let handle_h = bar_rect.height() * 0.55;
    let handle_y = bar_rect.center().y - handle_h / 2.0;
    for x in [bar_rect.left() - 1.5, bar_rect.right() - 2.5] {
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
            Rounding::same(2.0),
            theme::HANDLE_COLOR,
        );
    }
}

/// Ghost bar for the tentative dates, drawn in the item's current lane.
fn draw_preview(
    board: &Board,
    origin: Pos2,
    viewport: &TimelineViewport,
    geometry: LaneGeometry,
    painter: &egui::Painter,
) {
    let view = board.gesture();
    let Some(preview) = view.preview else {
        return;
    };
    let Some(lane) = board.packing().lane_of(preview.id) else {
        return;
    };
    let top = geometry.lane_top(origin, lane) + geometry.row_gap * 0.5;
    let rect = bar_rect(origin, viewport, preview, top, geometry.row_height);
    painter.rect_filled(
        rect,
        Rounding::same(theme::BAR_ROUNDING),
        theme::color_for(preview.id).gamma_multiply(theme::PREVIEW_ALPHA),
    );
    painter.rect_stroke(
        rect,
        Rounding::same(theme::BAR_ROUNDING),
        Stroke::new(1.0, theme::HANDLE_COLOR),
    );
    painter.text(
        Pos2::new(rect.left() + 6.0, rect.bottom() - 4.0),
        Align2::LEFT_BOTTOM,
        format!("{} — {}", preview.start, preview.end),
        theme::font_small(),
        theme::TEXT_ON_BAR,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantt_lanes::model::item::parse_date;

    #[test]
    fn focus_memory_is_dropped_when_rename_ends_without_blur() {
        let day = |s| parse_date(s).unwrap();
        let mut board = Board::new(
            vec![
                Item::new(1, "Alpha", day("2024-01-01"), day("2024-01-03")),
                Item::new(2, "Beta", day("2024-01-02"), day("2024-01-04")),
            ],
            20.0,
        )
        .unwrap();

        board.begin_rename(1).unwrap();
        assert!(!focus_is_stale(Some(1), editing_item(&board)));

        // Pressing another bar commits the rename; the field never blurred.
        board.press(2, PressTarget::Body, 0.0).unwrap();
        assert!(focus_is_stale(Some(1), editing_item(&board)));
        board.release().unwrap();

        board.begin_rename(2).unwrap();
        assert!(focus_is_stale(Some(1), editing_item(&board)));
        assert!(!focus_is_stale(None, editing_item(&board)));
    }
}
