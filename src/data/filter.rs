use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};

use super::model::{CleanedDataset, VehicleListing};

// ---------------------------------------------------------------------------
// Interaction parameters
// ---------------------------------------------------------------------------

/// Inclusive posting-date bounds. The filter only applies when both ends are
/// set; a half-open selection means "no filter".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Bounds as timestamps (midnight of each day), if the range is active.
    fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.start?.and_hms_opt(0, 0, 0)?;
        let end = self.end?.and_hms_opt(0, 0, 0)?;
        Some((start, end))
    }

    pub fn is_active(&self) -> bool {
        self.bounds().is_some()
    }

    pub fn contains(&self, posted: Option<NaiveDateTime>) -> bool {
        match (self.bounds(), posted) {
            (None, _) => true,
            (Some((start, end)), Some(d)) => start <= d && d <= end,
            (Some(_), None) => false,
        }
    }
}

/// Histogram bin count, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BinCount(u32);

impl BinCount {
    pub const MIN: u32 = 10;
    pub const MAX: u32 = 100;
    pub const DEFAULT: u32 = 30;

    pub fn new(n: u32) -> Self {
        Self(n.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BinCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// One point of the odometer/price scatter plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub odometer: f64,
    pub price: f64,
    /// Drives the colour scale.
    pub model_year: Option<f64>,
}

/// Aggregates shown next to the charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSummary {
    pub count: usize,
    pub price_min: f64,
    pub price_max: f64,
    pub price_mean: f64,
    pub price_median: f64,
    pub odometer_mean: f64,
}

/// Rows of a [`CleanedDataset`] visible for the current interaction, in
/// dataset order. Borrowing keeps the dataset itself untouched.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a CleanedDataset,
    indices: Cow<'a, [usize]>,
}

/// Select the listings posted within `range`.
///
/// Pass-through when the dataset has no `date_posted` column or the range is
/// not fully specified. Otherwise listings without a date are excluded.
pub fn filter<'a>(dataset: &'a CleanedDataset, range: &DateRange) -> FilteredView<'a> {
    let indices = if !dataset.has_date_posted || !range.is_active() {
        (0..dataset.len()).collect()
    } else {
        dataset
            .listings
            .iter()
            .enumerate()
            .filter(|(_, l)| range.contains(l.date_posted))
            .map(|(i, _)| i)
            .collect()
    };
    FilteredView {
        dataset,
        indices: Cow::Owned(indices),
    }
}

impl<'a> FilteredView<'a> {
    /// A view over row indices computed earlier by [`filter`].
    pub fn from_indices(dataset: &'a CleanedDataset, indices: &'a [usize]) -> Self {
        Self {
            dataset,
            indices: Cow::Borrowed(indices),
        }
    }

    /// Keep the selection without the borrow of the dataset.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices.into_owned()
    }

    pub fn columns(&self) -> &'a [String] {
        let dataset = self.dataset;
        &dataset.columns
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a VehicleListing> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.listings[i])
    }

    pub fn head(&self, n: usize) -> impl Iterator<Item = &'a VehicleListing> + '_ {
        self.rows().take(n)
    }

    /// The `price` column, for the histogram.
    pub fn prices(&self) -> Vec<f64> {
        self.rows().map(|l| l.price).collect()
    }

    pub fn scatter_points(&self) -> Vec<ScatterPoint> {
        self.rows()
            .map(|l| ScatterPoint {
                odometer: l.odometer,
                price: l.price,
                model_year: l.model_year,
            })
            .collect()
    }

    pub fn summary(&self) -> Option<ViewSummary> {
        if self.is_empty() {
            return None;
        }
        let count = self.len();
        let n = count as f64;
        let prices = self.prices();

        // Listings are sorted by price descending, so the ends are the extremes.
        let price_max = prices[0];
        let price_min = prices[count - 1];
        let price_median = if count % 2 == 1 {
            prices[count / 2]
        } else {
            (prices[count / 2 - 1] + prices[count / 2]) / 2.0
        };

        Some(ViewSummary {
            count,
            price_min,
            price_max,
            price_mean: prices.iter().sum::<f64>() / n,
            price_median,
            odometer_mean: self.rows().map(|l| l.odometer).sum::<f64>() / n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cleaner::CleanReport;
    use crate::data::model::CellValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn listing(price: f64, odometer: f64, posted: Option<NaiveDate>) -> VehicleListing {
        let date_posted = posted.map(|d| d.and_hms_opt(0, 0, 0).unwrap());
        VehicleListing {
            price,
            odometer,
            model_year: Some(2015.0),
            date_posted,
            cells: vec![
                CellValue::Float(price),
                CellValue::Float(odometer),
                CellValue::Float(2015.0),
                date_posted.map_or(CellValue::Null, CellValue::Date),
            ],
        }
    }

    fn dataset(listings: Vec<VehicleListing>, has_date_posted: bool) -> CleanedDataset {
        CleanedDataset {
            columns: ["price", "odometer", "model_year", "date_posted"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            listings,
            has_model_year: true,
            has_date_posted,
            report: CleanReport::default(),
        }
    }

    #[test]
    fn range_between_postings_is_empty() {
        let ds = dataset(
            vec![
                listing(2000.0, 10.0, Some(date(2021, 1, 1))),
                listing(1000.0, 10.0, Some(date(2020, 1, 1))),
            ],
            true,
        );
        let view = filter(&ds, &DateRange::new(date(2020, 6, 1), date(2020, 12, 31)));
        assert!(view.is_empty());
        assert!(view.summary().is_none());
    }

    #[test]
    fn bounds_are_inclusive_and_undated_rows_excluded() {
        let ds = dataset(
            vec![
                listing(400.0, 1.0, Some(date(2020, 1, 1))),
                listing(300.0, 1.0, None),
                listing(200.0, 1.0, Some(date(2020, 3, 1))),
                listing(100.0, 1.0, Some(date(2020, 3, 2))),
            ],
            true,
        );
        let range = DateRange::new(date(2020, 1, 1), date(2020, 3, 1));
        let view = filter(&ds, &range);

        let kept = view.clone().into_indices();
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(FilteredView::from_indices(&ds, &kept).prices(), vec![400.0, 200.0]);
        for l in view.rows() {
            let d = l.date_posted.unwrap().date();
            assert!(date(2020, 1, 1) <= d && d <= date(2020, 3, 1));
        }
    }

    #[test]
    fn half_open_range_is_no_filter() {
        let ds = dataset(
            vec![listing(1.0, 1.0, None), listing(1.0, 2.0, Some(date(2020, 1, 1)))],
            true,
        );
        let range = DateRange {
            start: Some(date(2030, 1, 1)),
            end: None,
        };
        assert!(!range.is_active());
        assert_eq!(filter(&ds, &range).len(), 2);
    }

    #[test]
    fn no_date_column_passes_through() {
        let ds = dataset(vec![listing(1.0, 1.0, None), listing(1.0, 2.0, None)], false);
        let view = filter(&ds, &DateRange::new(date(2020, 1, 1), date(2020, 1, 2)));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn head_and_columns_follow_dataset_order() {
        let ds = dataset(
            (0..15).map(|i| listing(1000.0 - i as f64, i as f64, None)).collect(),
            false,
        );
        let view = filter(&ds, &DateRange::default());

        assert_eq!(view.head(10).count(), 10);
        assert_eq!(view.head(100).count(), 15);
        assert_eq!(view.head(3).map(|l| l.price).collect::<Vec<_>>(), vec![1000.0, 999.0, 998.0]);
        assert_eq!(view.prices().len(), 15);
        assert_eq!(
            view.scatter_points()[1],
            ScatterPoint {
                odometer: 1.0,
                price: 999.0,
                model_year: Some(2015.0)
            }
        );
    }

    #[test]
    fn summary_aggregates_the_view() {
        let ds = dataset(
            vec![
                listing(400.0, 10.0, None),
                listing(300.0, 20.0, None),
                listing(200.0, 30.0, None),
                listing(100.0, 40.0, None),
            ],
            false,
        );
        let summary = filter(&ds, &DateRange::default()).summary().unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.price_max, 400.0);
        assert_eq!(summary.price_min, 100.0);
        assert_eq!(summary.price_mean, 250.0);
        assert_eq!(summary.price_median, 250.0);
        assert_eq!(summary.odometer_mean, 25.0);
    }

    #[test]
    fn bin_count_is_clamped() {
        assert_eq!(BinCount::new(5).get(), 10);
        assert_eq!(BinCount::new(250).get(), 100);
        assert_eq!(BinCount::new(42).get(), 42);
        assert_eq!(BinCount::default().get(), 30);
    }
}
