// src/app/ui/mod.rs
pub mod grid;
pub mod topbar;

use std::time::Instant;

use eframe::egui as eg;

use super::auth::AuthState;
use super::routes::Route;
use super::views::{CatalogBanner, LoginView};
use super::{ActiveView, Intent};
use grid::CardMode;

const ERROR_COLOR: eg::Color32 = eg::Color32::from_rgb(220, 80, 80);

/// Loading and error states shared by the catalog-backed screens.
/// Returns true when the catalog is settled and content can be drawn.
pub(crate) fn ui_catalog_status(ui: &mut eg::Ui, banner: &CatalogBanner) -> bool {
    match banner {
        CatalogBanner::Loading => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.add(eg::Spinner::new().size(18.0));
                ui.label("Loading catalog…");
            });
            false
        }
        CatalogBanner::Failed(error) => {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.colored_label(ERROR_COLOR, error);
            });
            false
        }
        CatalogBanner::Settled => true,
    }
}

fn ui_empty_state(ui: &mut eg::Ui, text: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(eg::RichText::new(text).italics());
    });
}

fn ui_login_form(ui: &mut eg::Ui, view: &mut LoginView, auth: &AuthState) -> Option<Intent> {
    let mut submit = false;
    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.heading("Sign in");
        ui.add_space(12.0);

        ui.add(
            eg::TextEdit::singleline(&mut view.username)
                .hint_text("Username")
                .desired_width(220.0),
        );
        let pass = ui.add(
            eg::TextEdit::singleline(&mut view.password)
                .hint_text("Password")
                .password(true)
                .desired_width(220.0),
        );
        if pass.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter)) {
            submit = true;
        }

        ui.add_space(8.0);
        if ui.button("Log in").clicked() {
            submit = true;
        }
        if let Some(err) = view.error {
            ui.add_space(6.0);
            ui.colored_label(ERROR_COLOR, err.message());
        }
    });

    if submit && view.submit(auth) {
        Some(Intent::Go(Route::MediaList))
    } else {
        None
    }
}

impl crate::app::CineApp {
    // ---------- NAV BAR ----------
    pub(crate) fn ui_render_nav(&self, ui: &mut eg::Ui) -> Option<Intent> {
        let mut intent = None;
        ui.horizontal(|ui| {
            ui.heading("cinelist");
            ui.separator();

            if ui
                .selectable_label(self.route == Route::MediaList, "Media")
                .clicked()
            {
                intent = Some(Intent::Go(Route::MediaList));
            }
            let fav_label = format!("Favorites ({})", self.favorites.current_ids().len());
            if ui
                .selectable_label(self.route == Route::Favorites, fav_label)
                .clicked()
            {
                intent = Some(Intent::Go(Route::Favorites));
            }

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                if ui.button("Log out").clicked() {
                    intent = Some(Intent::Logout);
                }
            });
        });
        intent
    }

    // ---------- BODY ----------
    pub(crate) fn ui_render_view(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) -> Option<Intent> {
        let location = self.config.catalog_source.as_str();
        match &mut self.view {
            ActiveView::Login(view) => ui_login_form(ui, view, &self.auth),

            ActiveView::MediaList(view) => {
                topbar::ui_filter_bar(ui, view, Instant::now());
                ui.separator();
                if !ui_catalog_status(ui, &view.banner()) {
                    return None;
                }
                let items = view.filtered();
                if items.is_empty() {
                    ui_empty_state(ui, "No titles match the current filters.");
                    return None;
                }
                grid::ui_card_grid(
                    ui,
                    ctx,
                    &mut self.posters,
                    location,
                    &items,
                    &self.favorites,
                    CardMode::Browse,
                )
                .map(Intent::Card)
            }

            ActiveView::Favorites(view) => {
                ui.heading("My favorites");
                ui.separator();
                if !ui_catalog_status(ui, &view.banner()) {
                    return None;
                }
                let items = view.media();
                if items.is_empty() {
                    ui_empty_state(ui, "You have no favorites yet.");
                    return None;
                }
                grid::ui_card_grid(
                    ui,
                    ctx,
                    &mut self.posters,
                    location,
                    &items,
                    &self.favorites,
                    CardMode::Favorites,
                )
                .map(Intent::Card)
            }

            ActiveView::Detail(view) => super::detail::ui_detail_panel(
                ui,
                ctx,
                view,
                &self.catalog,
                &self.favorites,
                &mut self.posters,
                location,
            ),
        }
    }

    // ---------- CONFIRMATION ----------
    pub(crate) fn ui_render_confirm(&mut self, ctx: &eg::Context) {
        let ActiveView::Favorites(view) = &mut self.view else {
            return;
        };
        let Some(pending) = view.gate.pending().cloned() else {
            return;
        };

        let mut answer: Option<Option<bool>> = None;
        let mut open = true;
        eg::Window::new("Confirm removal")
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(&pending.message);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Remove").clicked() {
                        answer = Some(Some(true));
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(Some(false));
                    }
                });
            });

        // closing the window or Escape counts as dismissal
        if answer.is_none() && (!open || ctx.input(|i| i.key_pressed(eg::Key::Escape))) {
            answer = Some(None);
        }
        if let Some(answer) = answer {
            view.resolve(answer, &self.favorites);
        }
    }
}
