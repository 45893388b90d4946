use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{Datelike, NaiveDateTime};

use super::error::LoadError;
use super::model::{CellValue, CleanedDataset, RawTable, VehicleListing};

pub const PRICE: &str = "price";
pub const ODOMETER: &str = "odometer";
pub const MODEL_YEAR: &str = "model_year";
pub const DATE_POSTED: &str = "date_posted";

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Validity bounds applied by [`clean`]. Lower bounds on price and odometer
/// are fixed: price must be strictly positive, odometer non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanRules {
    pub price_max: f64,
    pub odometer_max: f64,
    pub model_year_min: f64,
    /// Upper bound for `model_year`, normally the current calendar year.
    pub current_year: i32,
}

impl Default for CleanRules {
    fn default() -> Self {
        Self {
            price_max: 200_000.0,
            odometer_max: 1_000_000.0,
            model_year_min: 1950.0,
            current_year: chrono::Local::now().year(),
        }
    }
}

// ---------------------------------------------------------------------------
// Drop accounting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DropReason {
    Duplicate,
    MissingPrice,
    MissingOdometer,
    PriceOutOfRange,
    OdometerOutOfRange,
    MissingModelYear,
    ModelYearOutOfRange,
}

impl DropReason {
    pub const ALL: [DropReason; 7] = [
        DropReason::Duplicate,
        DropReason::MissingPrice,
        DropReason::MissingOdometer,
        DropReason::PriceOutOfRange,
        DropReason::OdometerOutOfRange,
        DropReason::MissingModelYear,
        DropReason::ModelYearOutOfRange,
    ];
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::Duplicate => "duplicate row",
            DropReason::MissingPrice => "missing or non-numeric price",
            DropReason::MissingOdometer => "missing or non-numeric odometer",
            DropReason::PriceOutOfRange => "price out of range",
            DropReason::OdometerOutOfRange => "odometer out of range",
            DropReason::MissingModelYear => "missing model year",
            DropReason::ModelYearOutOfRange => "model year out of range",
        };
        f.write_str(text)
    }
}

/// Per-pass summary of what was kept, dropped and nulled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub raw_rows: usize,
    pub kept: usize,
    pub dropped: BTreeMap<DropReason, usize>,
    /// `date_posted` values that could not be parsed and were nulled.
    pub unparsed_dates: usize,
}

impl CleanReport {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn count(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    fn record(&mut self, reason: DropReason) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }
}

impl fmt::Display for CleanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kept {} of {} rows", self.kept, self.raw_rows)?;
        for (reason, n) in &self.dropped {
            write!(f, "; {n} {reason}")?;
        }
        if self.unparsed_dates > 0 {
            write!(f, "; {} unparsed dates", self.unparsed_dates)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stage one: per-field parse
// ---------------------------------------------------------------------------

/// Positions of the columns the pipeline interprets.
#[derive(Debug, Clone, Copy)]
struct Layout {
    price: usize,
    odometer: usize,
    model_year: Option<usize>,
    date_posted: Option<usize>,
}

impl Layout {
    fn of(table: &RawTable) -> Result<Self, LoadError> {
        Ok(Self {
            price: table
                .column_index(PRICE)
                .ok_or(LoadError::MissingColumn(PRICE))?,
            odometer: table
                .column_index(ODOMETER)
                .ok_or(LoadError::MissingColumn(ODOMETER))?,
            model_year: table.column_index(MODEL_YEAR),
            date_posted: table.column_index(DATE_POSTED),
        })
    }
}

/// A raw row with its interpreted fields coerced. Nothing here can fail;
/// values that do not coerce are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub price: Option<f64>,
    pub odometer: Option<f64>,
    pub model_year: Option<f64>,
}

impl ParsedRow {
    fn try_parse(row: &[CellValue], layout: &Layout) -> Self {
        let numeric = |idx: usize| row.get(idx).and_then(CellValue::as_f64);
        Self {
            price: numeric(layout.price),
            odometer: numeric(layout.odometer),
            model_year: layout.model_year.and_then(numeric),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage two: predicate
// ---------------------------------------------------------------------------

/// Decide whether a parsed row is kept, yielding its validated
/// `(price, odometer)`. Mandatory fields are checked before ranges, so a row
/// reports the first rule it breaks.
///
/// When the source has a `model_year` column a row without a usable value is
/// dropped, the same as a comparison against a missing value failing.
pub fn check_row(
    row: &ParsedRow,
    rules: &CleanRules,
    has_model_year: bool,
) -> Result<(f64, f64), DropReason> {
    let price = row.price.ok_or(DropReason::MissingPrice)?;
    let odometer = row.odometer.ok_or(DropReason::MissingOdometer)?;

    if !(price > 0.0 && price <= rules.price_max) {
        return Err(DropReason::PriceOutOfRange);
    }
    if !(0.0..=rules.odometer_max).contains(&odometer) {
        return Err(DropReason::OdometerOutOfRange);
    }
    if has_model_year {
        let year = row.model_year.ok_or(DropReason::MissingModelYear)?;
        if !(rules.model_year_min..=f64::from(rules.current_year)).contains(&year) {
            return Err(DropReason::ModelYearOutOfRange);
        }
    }
    Ok((price, odometer))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Turn a raw table into a [`CleanedDataset`]:
///
/// 1. drop exact duplicate rows, keeping the first occurrence; rows that only
///    become equal once their columns are coerced count as duplicates too
/// 2. coerce `price`, `odometer`, `model_year` to numbers
/// 3. drop rows missing `price` or `odometer`
/// 4. drop rows outside the [`CleanRules`] ranges
/// 5. coerce `date_posted`, nulling what does not parse
/// 6. stable sort by price, highest first
///
/// The only error is a source lacking `price` or `odometer` altogether.
pub fn clean(table: &RawTable, rules: &CleanRules) -> Result<CleanedDataset, LoadError> {
    let layout = Layout::of(table)?;
    let has_model_year = layout.model_year.is_some();
    let mut report = CleanReport {
        raw_rows: table.len(),
        ..CleanReport::default()
    };

    let mut seen_raw: HashSet<&[CellValue]> = HashSet::with_capacity(table.len());
    let mut seen_coerced: HashSet<Vec<CellValue>> = HashSet::with_capacity(table.len());
    let mut listings = Vec::new();

    for row in &table.rows {
        if !seen_raw.insert(row.as_slice()) {
            report.record(DropReason::Duplicate);
            continue;
        }

        let parsed = ParsedRow::try_parse(row, &layout);
        let (price, odometer) = match check_row(&parsed, rules, has_model_year) {
            Ok(valid) => valid,
            Err(reason) => {
                log::trace!("dropping row ({reason}): {row:?}");
                report.record(reason);
                continue;
            }
        };

        let date_cell = layout.date_posted.and_then(|idx| row.get(idx));
        let date_posted = date_cell.and_then(CellValue::as_datetime);
        let listing = build_listing(row, &layout, (price, odometer), parsed.model_year, date_posted);

        // e.g. `15000` and `15000.0` from a source with per-cell types
        if !seen_coerced.insert(listing.cells.clone()) {
            log::trace!("dropping row (duplicate once coerced): {row:?}");
            report.record(DropReason::Duplicate);
            continue;
        }
        if date_posted.is_none() && date_cell.is_some_and(|c| !c.is_null()) {
            report.unparsed_dates += 1;
        }
        listings.push(listing);
    }

    // `sort_by` is stable, so equal prices keep their source order.
    listings.sort_by(|a, b| b.price.total_cmp(&a.price));

    report.kept = listings.len();
    log::info!("Cleaned listings: {report}");

    Ok(CleanedDataset {
        columns: table.columns.clone(),
        listings,
        has_model_year,
        has_date_posted: layout.date_posted.is_some(),
        report,
    })
}

fn build_listing(
    row: &[CellValue],
    layout: &Layout,
    (price, odometer): (f64, f64),
    model_year: Option<f64>,
    date_posted: Option<NaiveDateTime>,
) -> VehicleListing {
    let mut cells = row.to_vec();
    let mut set = |idx: Option<usize>, value: CellValue| {
        if let Some(cell) = idx.and_then(|i| cells.get_mut(i)) {
            *cell = value;
        }
    };
    set(Some(layout.price), CellValue::Float(price));
    set(Some(layout.odometer), CellValue::Float(odometer));
    set(layout.model_year, model_year.map_or(CellValue::Null, CellValue::Float));
    set(
        layout.date_posted,
        date_posted.map_or(CellValue::Null, CellValue::Date),
    );

    VehicleListing {
        price,
        odometer,
        model_year,
        date_posted,
        cells,
    }
}
