//! One extracted commercial and the column layout it is written with.

use crate::context::HeadingContext;

/// Output column names, in order.
pub const COLUMNS: [&str; 7] = [
    "Product_Type",
    "Advertiser_Product_Title",
    "Title",
    "Plot_Notes",
    "Decade",
    "Year",
    "SuperBowlNum",
];

/// One commercial.
///
/// Content fields are `None` when the source table had no such column and
/// `Some("")` when the column existed but the cell was blank. Both are written
/// as an empty field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommercialRecord {
    pub product_type: Option<String>,
    pub advertiser_product_title: Option<String>,
    pub title: Option<String>,
    pub plot_notes: Option<String>,
    pub decade: Option<String>,
    pub year: Option<String>,
    pub super_bowl_label: Option<String>,
}

impl CommercialRecord {
    /// empty content with the heading context attached
    pub fn with_context(context: &HeadingContext) -> Self {
        CommercialRecord {
            decade: context.decade().map(str::to_owned),
            year: context.year().map(str::to_owned),
            super_bowl_label: context.super_bowl_label().map(str::to_owned),
            ..Default::default()
        }
    }

    /// Fields in [`COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        [
            &self.product_type,
            &self.advertiser_product_title,
            &self.title,
            &self.plot_notes,
            &self.decade,
            &self.year,
            &self.super_bowl_label,
        ]
        .into_iter()
        .map(|f| f.clone().unwrap_or_default())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_keep_their_slot() {
        let ctx = HeadingContext::DecadeYearSet {
            decade: "2000s".into(),
            year: "2007".into(),
            label: None,
        };
        let rec = CommercialRecord {
            title: Some("Hank".into()),
            ..CommercialRecord::with_context(&ctx)
        };
        let row = rec.to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row, ["", "", "Hank", "", "2000s", "2007", ""]);
    }
}
