use eframe::egui::{Color32, RichText, Ui};

use crate::data::filter::{BinCount, ScatterPoint};
use crate::data::model::VehicleListing;
use crate::state::{AppState, CONCLUSION};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Presentation seam
// ---------------------------------------------------------------------------

/// What the dashboard needs from a presentation layer. Everything passed in
/// is already filtered; implementations only draw.
pub trait Renderer {
    /// `rows` is what should be shown, `total` the size of the filtered view.
    fn render_table(&mut self, columns: &[String], rows: &[&VehicleListing], total: usize);
    fn render_histogram(&mut self, prices: &[f64], bins: BinCount);
    fn render_scatter(&mut self, points: &[ScatterPoint]);
    fn render_message(&mut self, text: &str);
}

/// Feed the current view of `state` to `renderer`: table, price histogram,
/// odometer/price scatter and, once requested, the conclusion.
pub fn render_dashboard<R: Renderer>(state: &AppState, renderer: &mut R) {
    let Some(view) = state.view() else {
        return;
    };

    let rows: Vec<&VehicleListing> = view.head(state.table_rows()).collect();
    renderer.render_table(view.columns(), &rows, view.len());
    renderer.render_histogram(&view.prices(), state.bins);
    renderer.render_scatter(&view.scatter_points());

    if state.show_conclusion {
        renderer.render_message(CONCLUSION);
    }
}

// ---------------------------------------------------------------------------
// egui implementation
// ---------------------------------------------------------------------------

pub struct EguiRenderer<'u> {
    pub ui: &'u mut Ui,
}

impl Renderer for EguiRenderer<'_> {
    fn render_table(&mut self, columns: &[String], rows: &[&VehicleListing], total: usize) {
        self.ui.heading("Available listings");
        self.ui.label(format!("Showing {} of {total} rows", rows.len()));
        table::listings_table(self.ui, columns, rows);
        self.ui.add_space(12.0);
    }

    fn render_histogram(&mut self, prices: &[f64], bins: BinCount) {
        self.ui.heading("Price distribution (USD)");
        plot::price_histogram(self.ui, prices, bins);
        self.ui.add_space(12.0);
    }

    fn render_scatter(&mut self, points: &[ScatterPoint]) {
        self.ui.heading("Odometer vs. price");
        plot::odometer_scatter(self.ui, points);
        self.ui.add_space(12.0);
    }

    fn render_message(&mut self, text: &str) {
        self.ui
            .label(RichText::new(text).size(16.0).color(Color32::from_rgb(0x2e, 0x7d, 0x32)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::data::filter::DateRange;

    /// Remembers what it was asked to draw.
    #[derive(Default)]
    struct Recorder {
        table: Option<(usize, usize)>,
        histogram: Option<(usize, u32)>,
        scatter: Vec<ScatterPoint>,
        messages: Vec<String>,
    }

    impl Renderer for Recorder {
        fn render_table(&mut self, _: &[String], rows: &[&VehicleListing], total: usize) {
            self.table = Some((rows.len(), total));
        }
        fn render_histogram(&mut self, prices: &[f64], bins: BinCount) {
            self.histogram = Some((prices.len(), bins.get()));
        }
        fn render_scatter(&mut self, points: &[ScatterPoint]) {
            self.scatter = points.to_vec();
        }
        fn render_message(&mut self, text: &str) {
            self.messages.push(text.to_string());
        }
    }

    fn loaded_state(rows: usize) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles_us.csv");
        let mut csv = String::from("price,odometer,model_year\n");
        for i in 0..rows {
            csv.push_str(&format!("{},{},{}\n", 1000 + i, 500 * i, 2000 + i % 20));
        }
        std::fs::write(&path, csv).unwrap();

        let mut state = AppState::new(DashboardConfig::default());
        state.load_source(&path).unwrap();
        (dir, state)
    }

    #[test]
    fn nothing_is_drawn_without_a_dataset() {
        let mut rec = Recorder::default();
        render_dashboard(&AppState::default(), &mut rec);
        assert!(rec.table.is_none() && rec.histogram.is_none() && rec.messages.is_empty());
    }

    #[test]
    fn table_shows_head_until_full_view_requested() {
        let (_dir, mut state) = loaded_state(25);

        let mut rec = Recorder::default();
        render_dashboard(&state, &mut rec);
        assert_eq!(rec.table, Some((10, 25)));

        state.show_full_table = true;
        let mut rec = Recorder::default();
        render_dashboard(&state, &mut rec);
        assert_eq!(rec.table, Some((25, 25)));
    }

    #[test]
    fn charts_receive_the_filtered_columns() {
        let (_dir, mut state) = loaded_state(12);
        state.set_bins(55);
        // No date column: any range is a pass-through.
        state.set_date_range(DateRange::default());

        let mut rec = Recorder::default();
        render_dashboard(&state, &mut rec);

        assert_eq!(rec.histogram, Some((12, 55)));
        assert_eq!(rec.scatter.len(), 12);
        assert_eq!(rec.scatter[0].price, 1011.0);
        assert_eq!(rec.scatter[0].model_year, Some(2011.0));
    }

    #[test]
    fn conclusion_appears_after_click() {
        let (_dir, mut state) = loaded_state(3);

        let mut rec = Recorder::default();
        render_dashboard(&state, &mut rec);
        assert!(rec.messages.is_empty());

        state.reveal_conclusion();
        let mut rec = Recorder::default();
        render_dashboard(&state, &mut rec);
        assert_eq!(rec.messages, vec![CONCLUSION.to_string()]);
    }
}
