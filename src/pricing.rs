//! Quotation arithmetic for comparison sheets.
//!
//! Each vendor occupies a 1-based position; row `quantities[p - 1]` and
//! `prices[p - 1]` hold that vendor's quote. VAT rates are percentages.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// A vendor column of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorColumn {
    pub position: i32,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    /// VAT percentage
    pub vat: f64,
}

/// A row's quotes across all vendor columns.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotedRow {
    pub quantities: Vec<f64>,
    pub prices: Vec<f64>,
    pub vat_applicable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorTotal {
    pub position: i32,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub subtotal: f64,
    pub vat_amount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotationSummary {
    pub vendor_totals: Vec<VendorTotal>,
    /// Position of the vendor with the lowest positive total
    pub lowest_bidder: Option<i32>,
    pub lowest_total: Option<f64>,
    pub highest_total: Option<f64>,
    /// Highest minus lowest positive total
    pub potential_saving: f64,
    /// Saving as a percentage of the highest total
    pub saving_percent: f64,
}

fn quote(values: &[f64], position: i32) -> f64 {
    usize::try_from(position - 1)
        .ok()
        .and_then(|index| values.get(index).copied())
        .unwrap_or(0.0)
}

/// Amount for one cell: quantity times unit price plus VAT.
pub fn line_total(qty: f64, unit_price: f64, vat_percent: f64) -> f64 {
    qty * unit_price * (1.0 + vat_percent / 100.0)
}

pub fn vendor_total(column: &VendorColumn, rows: &[QuotedRow]) -> VendorTotal {
    let mut subtotal = 0.0;
    let mut vat_amount = 0.0;
    for row in rows {
        let net = line_total(
            quote(&row.quantities, column.position),
            quote(&row.prices, column.position),
            0.0,
        );
        subtotal += net;
        if row.vat_applicable {
            vat_amount += net * column.vat / 100.0;
        }
    }
    VendorTotal {
        position: column.position,
        vendor_id: column.vendor_id,
        vendor_name: column.vendor_name.clone(),
        subtotal,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

/// Lowest positive total; the earliest position wins a tie.
pub fn lowest_bidder(totals: &[VendorTotal]) -> Option<&VendorTotal> {
    totals
        .iter()
        .filter(|t| t.total > 0.0)
        .fold(None, |best: Option<&VendorTotal>, current| match best {
            Some(best) if best.total <= current.total => Some(best),
            _ => Some(current),
        })
}

pub fn summarize(columns: &[VendorColumn], rows: &[QuotedRow]) -> QuotationSummary {
    let vendor_totals: Vec<VendorTotal> = columns.iter().map(|c| vendor_total(c, rows)).collect();

    let lowest = lowest_bidder(&vendor_totals);
    let highest_total = vendor_totals
        .iter()
        .map(|t| t.total)
        .filter(|total| *total > 0.0)
        .fold(None, |max: Option<f64>, total| Some(max.map_or(total, |m| m.max(total))));

    let (potential_saving, saving_percent) = match (lowest, highest_total) {
        (Some(low), Some(high)) if high > 0.0 => {
            let saving = high - low.total;
            (saving, saving / high * 100.0)
        }
        _ => (0.0, 0.0),
    };

    QuotationSummary {
        lowest_bidder: lowest.map(|t| t.position),
        lowest_total: lowest.map(|t| t.total),
        highest_total,
        potential_saving,
        saving_percent,
        vendor_totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(position: i32, vat: f64) -> VendorColumn {
        VendorColumn {
            position,
            vendor_id: Uuid::new_v4(),
            vendor_name: format!("Vendor {position}"),
            vat,
        }
    }

    fn row(quantities: &[f64], prices: &[f64], vat_applicable: bool) -> QuotedRow {
        QuotedRow {
            quantities: quantities.to_vec(),
            prices: prices.to_vec(),
            vat_applicable,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn line_total_applies_vat_percentage() {
        assert!(approx(line_total(5.0, 10.0, 0.0), 50.0));
        assert!(approx(line_total(5.0, 10.0, 15.0), 57.5));
    }

    #[test]
    fn vat_only_on_applicable_rows() {
        let col = column(1, 10.0);
        let rows = [row(&[2.0], &[100.0], true), row(&[1.0], &[50.0], false)];
        let total = vendor_total(&col, &rows);
        assert!(approx(total.subtotal, 250.0));
        assert!(approx(total.vat_amount, 20.0));
        assert!(approx(total.total, 270.0));
    }

    #[test]
    fn short_arrays_read_as_zero() {
        let col = column(3, 0.0);
        let total = vendor_total(&col, &[row(&[1.0], &[9.0], true)]);
        assert!(approx(total.total, 0.0));
    }

    #[test]
    fn lowest_positive_total_wins_and_ties_keep_first() {
        let columns = [column(1, 0.0), column(2, 0.0), column(3, 0.0)];
        let rows = [row(&[1.0, 1.0, 1.0], &[0.0, 80.0, 80.0], true)];
        let summary = summarize(&columns, &rows);
        assert_eq!(summary.lowest_bidder, Some(2));
        assert_eq!(summary.highest_total, Some(80.0));
        assert!(approx(summary.potential_saving, 0.0));
    }

    #[test]
    fn saving_is_measured_against_highest_total() {
        let columns = [column(1, 0.0), column(2, 0.0)];
        let rows = [row(&[2.0, 2.0], &[50.0, 40.0], true)];
        let summary = summarize(&columns, &rows);
        assert_eq!(summary.lowest_bidder, Some(2));
        assert!(approx(summary.potential_saving, 20.0));
        assert!(approx(summary.saving_percent, 20.0));
    }

    #[test]
    fn no_quotes_means_no_bidder() {
        let summary = summarize(&[column(1, 15.0)], &[]);
        assert_eq!(summary.lowest_bidder, None);
        assert_eq!(summary.highest_total, None);
        assert!(approx(summary.saving_percent, 0.0));
    }
}
