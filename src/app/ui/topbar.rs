// src/app/ui/topbar.rs
use std::time::Instant;

use eframe::egui as eg;

use crate::app::data::MediaCategory;
use crate::app::views::MediaListView;

// ---------- FILTER BAR ----------
pub(crate) fn ui_filter_bar(ui: &mut eg::Ui, view: &mut MediaListView, now: Instant) {
    ui.horizontal(|ui| {
        let mut changed = false;

        // Category
        let selected = MediaCategory::ALL
            .iter()
            .find(|c| c.as_str() == view.form.category)
            .map_or("All", |c| c.label());
        eg::ComboBox::from_id_source("category_combo")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_value(&mut view.form.category, String::new(), "All")
                    .clicked()
                {
                    changed = true;
                }
                for category in MediaCategory::ALL {
                    if ui
                        .selectable_value(
                            &mut view.form.category,
                            category.as_str().to_string(),
                            category.label(),
                        )
                        .clicked()
                    {
                        changed = true;
                    }
                }
            });

        ui.separator();

        // Genre
        let resp = ui.add(
            eg::TextEdit::singleline(&mut view.form.genre)
                .hint_text("Genre…")
                .desired_width(160.0),
        );
        if resp.changed() {
            changed = true;
        }
        let genres = view.genres();
        if !genres.is_empty() {
            eg::ComboBox::from_id_source("genre_combo")
                .selected_text("Pick")
                .width(120.0)
                .show_ui(ui, |ui| {
                    for genre in genres {
                        let on = view.form.genre == genre;
                        if ui.selectable_label(on, &genre).clicked() {
                            view.form.genre = genre;
                            changed = true;
                        }
                    }
                });
        }

        ui.separator();
        if ui
            .add_enabled(!view.form.is_empty(), eg::Button::new("Reset"))
            .clicked()
        {
            view.reset_filters(now);
        } else if changed {
            view.form_changed(now);
        }

        ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
            ui.label(format!("{} titles", view.filtered().len()));
        });
    });
}
