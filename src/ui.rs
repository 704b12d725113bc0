use std::ops::RangeInclusive;

use egui::Color32;
use egui_plot::{AxisHints, Corner, GridMark, Legend, Plot, Points};

use crate::survey::{PatternSurvey, SurveyParams};

/// Default vertical distance between adjacent pattern rows, in plot units.
pub const DEFAULT_SPACING: u32 = 20;

/// Survey and layout parameters entered via the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotParams {
    pub base: u64,
    pub limit: u64,
    pub spacing: u32,
}

impl PlotParams {
    /// Parse the sidebar fields, clamping to sane ranges. `None` when any
    /// field is not an integer.
    pub fn from_fields(base: &str, limit: &str, spacing: &str) -> Option<PlotParams> {
        let base = base.trim().parse::<u64>().ok()?;
        let limit = limit.trim().parse::<u64>().ok()?;
        let spacing = spacing.trim().parse::<u32>().ok()?;
        Some(PlotParams {
            base: base.clamp(2, 1 << 20),
            limit: limit.clamp(1, 1_000_000),
            spacing: spacing.clamp(1, 500),
        })
    }

    pub fn survey_params(&self) -> SurveyParams {
        SurveyParams::new(self.base, self.limit)
    }
}

/// Actions that the UI can emit for the main application to handle.
#[derive(Debug, Default)]
pub struct UiActions {
    pub apply: Option<PlotParams>,
    pub export_snapshot: bool,
    pub quit: bool,
}

/// Persistent state for the egui overlay.
pub struct UiState {
    /// Whether the sidebar panel is visible.
    pub show_sidebar: bool,
    /// Whether the pattern key panel is visible.
    pub show_key: bool,
    /// Editable parameter strings for the sidebar fields.
    pub base_str: String,
    pub limit_str: String,
    pub spacing_str: String,
}

impl UiState {
    pub fn new(params: &SurveyParams, spacing: u32) -> Self {
        Self {
            show_sidebar: true,
            show_key: true,
            base_str: params.base.to_string(),
            limit_str: params.limit.to_string(),
            spacing_str: spacing.to_string(),
        }
    }
}

/// Draw the overlay and return any actions the user triggered.
pub fn draw_ui(
    ctx: &egui::Context,
    state: &mut UiState,
    survey: &PatternSurvey,
    spacing: u32,
) -> UiActions {
    let mut actions = UiActions::default();
    let mut reset_view = false;

    // ── Top menu bar ──
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("Survey", |ui| {
                if ui.button("Re-run Survey").clicked() {
                    actions.apply = PlotParams::from_fields(
                        &state.base_str,
                        &state.limit_str,
                        &state.spacing_str,
                    );
                    ui.close_menu();
                }
                if ui.button("Export Snapshot (S)").clicked() {
                    actions.export_snapshot = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    actions.quit = true;
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("🏠 Reset Plot View").clicked() {
                    reset_view = true;
                    ui.close_menu();
                }
                ui.separator();
                ui.checkbox(&mut state.show_sidebar, "Show Sidebar");
                ui.checkbox(&mut state.show_key, "Show Pattern Key (K)");
            });
        });
    });

    // ── Left sidebar panel ──
    if state.show_sidebar {
        egui::SidePanel::left("sidebar")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Hancock");
                ui.separator();

                // ── Status ──
                ui.label(format!("Base: {}", survey.params.base));
                ui.label(format!("Range: 1..={}", survey.params.limit));
                ui.label(format!("Patterns: {}", survey.distinct_patterns()));
                if survey.has_unresolved() {
                    ui.label(format!(
                        "Unresolved: {}",
                        survey.count_of(crate::label::OTHER_LABEL)
                    ));
                }
                ui.separator();

                // ── Survey parameters ──
                ui.label("Survey Parameters");
                ui.horizontal(|ui| {
                    ui.label("Base:");
                    ui.add(egui::TextEdit::singleline(&mut state.base_str).desired_width(50.0));
                });
                ui.horizontal(|ui| {
                    ui.label("N:");
                    ui.add(egui::TextEdit::singleline(&mut state.limit_str).desired_width(70.0));
                });
                ui.horizontal(|ui| {
                    ui.label("Spacing:");
                    ui.add(egui::TextEdit::singleline(&mut state.spacing_str).desired_width(50.0));
                });
                if ui.button("Apply").clicked() {
                    actions.apply = PlotParams::from_fields(
                        &state.base_str,
                        &state.limit_str,
                        &state.spacing_str,
                    );
                }
                ui.separator();

                // ── Row counts ──
                ui.label("Counts");
                for label in &survey.rows {
                    let [r, g, b] = survey.color_of(label);
                    ui.horizontal(|ui| {
                        ui.colored_label(Color32::from_rgb(r, g, b), "●");
                        ui.label(format!("{label}: {}", survey.count_of(label)));
                    });
                }
            });
    }

    // ── Bottom pattern key panel ──
    if state.show_key {
        egui::TopBottomPanel::bottom("key_panel")
            .default_height(120.0)
            .show(ctx, |ui| {
                ui.label("Pattern Key");
                let key = survey.pattern_key();
                if key.is_empty() {
                    ui.label("No cycles detected within the iteration bound.");
                } else {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        for line in key {
                            ui.monospace(line);
                        }
                    });
                }
            });
    }

    // ── Central scatter plot ──
    egui::CentralPanel::default().show(ctx, |ui| {
        let spacing_f = f64::from(spacing);
        let row_count = survey.rows.len();
        let rows = survey.rows.clone();
        let rows_for_fmt = rows.clone();

        let y_formatter = move |mark: GridMark, _range: &RangeInclusive<f64>| -> String {
            let row = (mark.value / spacing_f).round();
            if row < 0.0 || (mark.value - row * spacing_f).abs() > 1e-6 {
                return String::new();
            }
            rows_for_fmt.get(row as usize).cloned().unwrap_or_default()
        };

        let mut plot = Plot::new("pattern_scatter")
            .legend(Legend::default().position(Corner::RightTop))
            .custom_x_axes(vec![AxisHints::new_x().label("positive integer")])
            .custom_y_axes(vec![AxisHints::new_y()
                .label("pattern")
                .formatter(y_formatter)])
            .y_grid_spacer(move |_input| {
                (0..row_count)
                    .map(|row| GridMark {
                        value: row as f64 * spacing_f,
                        step_size: spacing_f,
                    })
                    .collect()
            })
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format!("n = {:.0}", value.x)
                } else {
                    format!("{name}\nn = {:.0}", value.x)
                }
            });
        if reset_view {
            plot = plot.reset();
        }

        plot.show(ui, |plot_ui| {
            for (row, label) in rows.iter().enumerate() {
                let y = row as f64 * spacing_f;
                let points: Vec<[f64; 2]> = survey
                    .members_of(label)
                    .into_iter()
                    .map(|n| [n as f64, y])
                    .collect();
                let [r, g, b] = survey.color_of(label);
                plot_ui.points(
                    Points::new(points)
                        .color(Color32::from_rgb(r, g, b))
                        .radius(2.5)
                        .name(label),
                );
            }
        });
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_state_initializes_from_params() {
        let state = UiState::new(&SurveyParams::new(10, 255), DEFAULT_SPACING);
        assert_eq!(state.base_str, "10");
        assert_eq!(state.limit_str, "255");
        assert_eq!(state.spacing_str, "20");
        assert!(state.show_sidebar);
        assert!(state.show_key);
    }

    #[test]
    fn plot_params_parse_and_clamp() {
        let p = PlotParams::from_fields("10", "255", "20").unwrap();
        assert_eq!(p.base, 10);
        assert_eq!(p.limit, 255);
        assert_eq!(p.spacing, 20);

        // Degenerate bases and zero spacing are clamped, not rejected.
        let p = PlotParams::from_fields("1", "0", "0").unwrap();
        assert_eq!(p.base, 2);
        assert_eq!(p.limit, 1);
        assert_eq!(p.spacing, 1);
    }

    #[test]
    fn plot_params_reject_non_integers() {
        assert!(PlotParams::from_fields("ten", "255", "20").is_none());
        assert!(PlotParams::from_fields("10", "", "20").is_none());
        assert!(PlotParams::from_fields("10", "255", "-3").is_none());
    }

    #[test]
    fn plot_params_convert_to_survey_params() {
        let p = PlotParams::from_fields("16", "100", "10").unwrap();
        let sp = p.survey_params();
        assert_eq!(sp.base, 16);
        assert_eq!(sp.limit, 100);
    }
}
