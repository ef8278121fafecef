// src/app/detail.rs
use eframe::egui as eg;

use super::cache::resolve_image_ref;
use super::catalog::CatalogState;
use super::favorites::FavoritesState;
use super::prefetch::PosterLoader;
use super::routes::Route;
use super::ui::ui_catalog_status;
use super::views::{CatalogBanner, DetailStatus, DetailView};
use super::Intent;

pub(crate) fn ui_detail_panel(
    ui: &mut eg::Ui,
    ctx: &eg::Context,
    view: &DetailView,
    catalog: &CatalogState,
    favorites: &FavoritesState,
    posters: &mut PosterLoader,
    catalog_location: &str,
) -> Option<Intent> {
    let mut intent = None;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        if ui.button("← Back").clicked() {
            intent = Some(Intent::Go(Route::MediaList));
        }
        ui.heading("Details");
    });
    ui.separator();

    let item = match view.status(catalog) {
        DetailStatus::Ready(item) => item,
        DetailStatus::NotFound(id) => {
            ui.label(format!("No title with id `{id}` in the catalog."));
            return intent;
        }
        DetailStatus::Loading => {
            ui_catalog_status(ui, &CatalogBanner::Loading);
            return intent;
        }
        DetailStatus::Failed(error) => {
            ui_catalog_status(ui, &CatalogBanner::Failed(error));
            return intent;
        }
    };

    eg::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            ui.horizontal_top(|ui| {
                // Detail art, falling back to the cover
                let image_ref = if item.detail_image_ref.trim().is_empty() {
                    &item.cover_image_ref
                } else {
                    &item.detail_image_ref
                };
                let avail_w = (ui.available_width() * 0.4).clamp(160.0, 420.0);
                let art_size = eg::vec2(avail_w, avail_w * 1.5);
                let tex = resolve_image_ref(catalog_location, image_ref)
                    .and_then(|loc| posters.texture(ctx, &loc));

                if let Some(tex) = &tex {
                    ui.image((tex.id(), art_size));
                } else {
                    let (rect, _resp) = ui.allocate_exact_size(art_size, eg::Sense::hover());
                    ui.painter().rect_filled(rect, 8.0, eg::Color32::from_gray(40));
                    ui.painter().text(
                        rect.center(),
                        eg::Align2::CENTER_CENTER,
                        "Image loading…",
                        eg::FontId::proportional(14.0),
                        eg::Color32::WHITE,
                    );
                }

                ui.add_space(12.0);
                ui.vertical(|ui| {
                    ui.heading(item.title_line());
                    ui.label(
                        eg::RichText::new(format!("{}  •  {}", item.category.label(), item.genre))
                            .weak(),
                    );
                    if !item.director.is_empty() {
                        ui.label(format!("Director: {}", item.director));
                    }

                    ui.add_space(8.0);
                    let label = if view.is_favorite() {
                        "★ Remove from favorites"
                    } else {
                        "☆ Add to favorites"
                    };
                    if ui.button(label).clicked() {
                        view.toggle_favorite(catalog, favorites);
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    if item.synopsis.is_empty() {
                        ui.label(eg::RichText::new("No synopsis available.").italics());
                    } else {
                        ui.add(eg::Label::new(&item.synopsis).wrap());
                    }
                });
            });
        });

    intent
}
