//! NMA cost sheet roll-up

use cb_core::money::Precision;
use cb_models::{NmaCostSheet, NmaResourceItem};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::CostOverflow;

fn item_total(item: &NmaResourceItem, precision: Precision) -> Result<Decimal, CostOverflow> {
    item.quantity
        .checked_mul(item.unit_cost)
        .map(|total| precision.round(total))
        .ok_or_else(|| CostOverflow::Item {
            name: item.name.clone(),
        })
}

/// `quantity × unit_cost`, stored on the item
pub fn compute_item_total(item: &mut NmaResourceItem, precision: Precision) -> Result<Decimal, CostOverflow> {
    item.total_cost = item_total(item, precision)?;
    Ok(item.total_cost)
}

/// Recompute every item, then the sheet total. Nothing is written on error.
pub fn recompute_sheet(sheet: &mut NmaCostSheet, precision: Precision) -> Result<Decimal, CostOverflow> {
    let totals = sheet
        .items
        .iter()
        .map(|item| item_total(item, precision))
        .collect::<Result<Vec<_>, _>>()?;
    let total = totals
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(*item))
        .ok_or(CostOverflow::Totals)?;

    for (item, item_total) in sheet.items.iter_mut().zip(totals) {
        item.total_cost = item_total;
    }
    sheet.total_cost = total;

    debug!(
        sheet = %sheet.project_name,
        items = sheet.items.len(),
        total_cost = %total,
        "nma sheet recomputed"
    );

    Ok(total)
}

/// Append an item and refresh the sheet total; the item is not kept if
/// the new total cannot be computed
pub fn add_item(sheet: &mut NmaCostSheet, item: NmaResourceItem, precision: Precision) -> Result<Decimal, CostOverflow> {
    sheet.items.push(item);
    recompute_sheet(sheet, precision).inspect_err(|_| {
        sheet.items.pop();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_item_total() {
        let mut item = NmaResourceItem::new("Licence", d("3"), "pcs", d("150.50"));
        assert_eq!(compute_item_total(&mut item, Precision::default()), Ok(d("451.50")));
    }

    #[test]
    fn test_add_item_updates_sheet() {
        let mut sheet = NmaCostSheet::new("CRM module");
        let p = Precision::default();

        add_item(&mut sheet, NmaResourceItem::new("Design", d("40"), "hours", d("25")), p).unwrap();
        assert_eq!(sheet.total_cost, d("1000"));

        add_item(&mut sheet, NmaResourceItem::new("Hosting", d("12"), "months", d("9.99")), p).unwrap();
        assert_eq!(sheet.total_cost, d("1119.88"));
        assert_eq!(sheet.items[1].total_cost, d("119.88"));
    }

    #[test]
    fn test_empty_sheet() {
        let mut sheet = NmaCostSheet::new("Empty");
        sheet.total_cost = d("5");
        assert_eq!(recompute_sheet(&mut sheet, Precision::default()), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_overflowing_item_leaves_sheet_unchanged() {
        let mut sheet = NmaCostSheet::new("CRM module");
        let p = Precision::default();
        add_item(&mut sheet, NmaResourceItem::new("Design", d("40"), "hours", d("25")), p).unwrap();

        let huge = NmaResourceItem::new("Servers", Decimal::MAX, "pcs", d("2"));
        let err = add_item(&mut sheet, huge, p).unwrap_err();
        assert_eq!(err, CostOverflow::Item { name: "Servers".into() });
        assert_eq!(sheet.items.len(), 1);
        assert_eq!(sheet.total_cost, d("1000"));
    }
}
