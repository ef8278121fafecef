// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::cache::resolve_image_ref;
use crate::app::data::Media;
use crate::app::favorites::FavoritesState;
use crate::app::prefetch::PosterLoader;
use crate::app::types::CardAction;

pub const H_SPACING: f32 = 4.0;
pub const V_SPACING: f32 = 10.0;
const CARD_W: f32 = 170.0;
const TEXT_H: f32 = 48.0;
const BUTTON_H: f32 = 26.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardMode {
    /// Media list: cards toggle favorites.
    Browse,
    /// Favorites list: cards ask to be removed.
    Favorites,
}

fn draw_corner_badge(p: &eg::Painter, rect: eg::Rect, label: &str) {
    if label.is_empty() {
        return;
    }
    let pad = 6.0;
    let r = eg::Rect::from_min_size(
        eg::pos2(rect.left() + pad, rect.top() + pad),
        eg::vec2(56.0, 20.0),
    );

    let visuals = p.ctx().style().visuals.clone();
    let bg = visuals.extreme_bg_color.gamma_multiply(0.92);
    let fg = visuals.strong_text_color();

    p.rect_filled(r, eg::Rounding::same(6.0), bg);
    p.rect_stroke(r, eg::Rounding::same(6.0), eg::Stroke::new(1.0, fg));
    p.text(
        r.center(),
        eg::Align2::CENTER_CENTER,
        label,
        eg::FontId::monospace(12.0),
        fg,
    );
}

/// Draw `items` as poster cards. Returns the first action clicked this frame.
pub(crate) fn ui_card_grid(
    ui: &mut eg::Ui,
    ctx: &eg::Context,
    posters: &mut PosterLoader,
    catalog_location: &str,
    items: &[Media],
    favorites: &FavoritesState,
    mode: CardMode,
) -> Option<CardAction> {
    let card_h: f32 = CARD_W * 1.5 + TEXT_H + BUTTON_H;
    let mut action = None;

    eg::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            let avail = ui.available_width();
            let cols = ((avail + H_SPACING) / (CARD_W + H_SPACING))
                .floor()
                .max(1.0) as usize;

            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

                for (col, media) in items.iter().enumerate() {
                    if col > 0 && col % cols == 0 {
                        ui.end_row();
                    }

                    ui.allocate_ui_with_layout(
                        eg::vec2(CARD_W, card_h),
                        eg::Layout::top_down(eg::Align::Min),
                        |ui| {
                            ui.set_min_size(eg::vec2(CARD_W, card_h));
                            let rect = ui.max_rect();
                            let poster_rect = eg::Rect::from_min_size(
                                rect.min,
                                eg::vec2(CARD_W, CARD_W * 1.5),
                            );

                            let poster = ui
                                .allocate_rect(poster_rect, eg::Sense::click())
                                .on_hover_cursor(eg::CursorIcon::PointingHand);
                            let tex = resolve_image_ref(catalog_location, &media.cover_image_ref)
                                .and_then(|loc| posters.texture(ctx, &loc));
                            if let Some(tex) = &tex {
                                ui.painter().image(
                                    tex.id(),
                                    poster_rect,
                                    eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                                    eg::Color32::WHITE,
                                );
                            } else {
                                ui.painter().rect_filled(
                                    poster_rect,
                                    6.0,
                                    eg::Color32::from_gray(40),
                                );
                            }
                            draw_corner_badge(ui.painter(), poster_rect, media.category.label());
                            if poster.hovered() {
                                ui.painter().rect_stroke(
                                    poster_rect.shrink(1.0),
                                    6.0,
                                    eg::Stroke::new(2.0, eg::Color32::YELLOW),
                                );
                            }
                            if poster.clicked() {
                                action = Some(CardAction::Open(media.id.clone()));
                            }

                            ui.add(
                                eg::Label::new(
                                    eg::RichText::new(media.title_line()).size(14.0).strong(),
                                )
                                .truncate(),
                            );
                            ui.label(eg::RichText::new(&media.genre).size(12.0).weak());

                            match mode {
                                CardMode::Browse => {
                                    let label = if favorites.contains(&media.id) {
                                        "★ Favorite"
                                    } else {
                                        "☆ Add to favorites"
                                    };
                                    if ui.button(label).clicked() {
                                        action = Some(CardAction::ToggleFavorite(media.id.clone()));
                                    }
                                }
                                CardMode::Favorites => {
                                    if ui.button("Remove").clicked() {
                                        action = Some(CardAction::RequestRemove(media.id.clone()));
                                    }
                                }
                            }
                        },
                    );
                }

                ui.end_row();
            });
        });

    action
}
