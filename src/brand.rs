//! Attributes each commercial to a known brand by substring search.

use std::fmt;

use ahash::AHashMap;

use crate::csv::{CsvError, CsvTable};

pub const BRAND_COLUMN: &str = "BrandName";
pub const TEXT_COLUMN: &str = "Advertiser_Product_Title";
pub const ADVERTISER_COLUMN: &str = "Primary_Advertiser";

const TOP_MAPPED: usize = 30;
const TOP_UNMAPPED: usize = 50;

#[derive(Debug)]
pub enum BrandError {
    Csv(CsvError),
    /// the reference table lists no usable brand names
    NoBrands,
}

impl fmt::Display for BrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandError::Csv(e) => write!(f, "bad brand table: {e}"),
            BrandError::NoBrands => f.write_str("brand table has no brand names"),
        }
    }
}

impl std::error::Error for BrandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrandError::Csv(e) => Some(e),
            BrandError::NoBrands => None,
        }
    }
}

impl From<CsvError> for BrandError {
    fn from(e: CsvError) -> Self {
        BrandError::Csv(e)
    }
}

/// Known brands, lowercased, with the casing they were first listed with.
#[derive(Debug, Clone, Default)]
pub struct BrandMap {
    canonical: AHashMap<String, String>,
    /// lowercased, longest first
    ordered: Vec<String>,
}

impl BrandMap {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = BrandMap::default();
        for name in names {
            let name = name.as_ref();
            // a blank name would match any text with a space in it
            if name.trim().is_empty() {
                continue;
            }
            let lower = name.to_lowercase();
            if map.canonical.contains_key(&lower) {
                continue;
            }
            map.canonical.insert(lower.clone(), name.to_owned());
            map.ordered.push(lower);
        }
        // stable, so equal lengths stay in listing order
        map.ordered
            .sort_by_key(|b| std::cmp::Reverse(b.chars().count()));
        map
    }

    pub fn from_table(table: &CsvTable) -> Result<Self, BrandError> {
        let col = table.column(BRAND_COLUMN)?;
        let map = Self::from_names((0..table.rows.len()).map(|r| table.get(r, col)));
        if map.is_empty() {
            return Err(BrandError::NoBrands);
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Lowercased brands, longest first.
    pub fn brands(&self) -> &[String] {
        &self.ordered
    }

    pub fn match_brand(&self, text: Option<&str>) -> Option<&str> {
        match_brand(text, &self.ordered, &self.canonical)
    }
}

/// First of `brands` (lowercased, longest first) found inside `text`, in its canonical casing.
pub fn match_brand<'a>(
    text: Option<&str>,
    brands: &[String],
    canonical: &'a AHashMap<String, String>,
) -> Option<&'a str> {
    let text = text.filter(|t| !t.is_empty())?.to_lowercase();
    brands
        .iter()
        .find(|b| text.contains(b.as_str()))
        .and_then(|b| canonical.get(b))
        .map(String::as_str)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSummary {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
    /// most frequent advertisers with their counts
    pub top_mapped: Vec<(String, usize)>,
    /// most frequent texts that matched nothing
    pub top_unmapped: Vec<(String, usize)>,
}

impl MappingSummary {
    pub fn percent_mapped(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.mapped as f64 * 100.0 / self.total as f64
    }
}

/// Counts in first-seen order, so a stable sort keeps ties that way.
#[derive(Default)]
struct Tally {
    index: AHashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl Tally {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.to_owned(), self.counts.len());
                self.counts.push((key.to_owned(), 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<(String, usize)> {
        self.counts.sort_by_key(|&(_, c)| std::cmp::Reverse(c));
        self.counts.truncate(n);
        self.counts
    }
}

/// Copy of `table` with a `Primary_Advertiser` column, empty where nothing matched.
pub fn map_table(
    table: &CsvTable,
    brands: &BrandMap,
) -> Result<(CsvTable, MappingSummary), BrandError> {
    let col = table.column(TEXT_COLUMN)?;
    let mut mapped = Tally::default();
    let mut unmapped = Tally::default();
    let mut summary = MappingSummary {
        total: table.rows.len(),
        ..Default::default()
    };

    let advertisers = (0..table.rows.len())
        .map(|r| {
            let text = table.get(r, col);
            match brands.match_brand(Some(text)) {
                Some(brand) => {
                    summary.mapped += 1;
                    mapped.add(brand);
                    brand.to_owned()
                }
                None => {
                    summary.unmapped += 1;
                    if !text.is_empty() {
                        unmapped.add(text);
                    }
                    String::new()
                }
            }
        })
        .collect();

    summary.top_mapped = mapped.top(TOP_MAPPED);
    summary.top_unmapped = unmapped.top(TOP_UNMAPPED);

    let mut out = table.clone();
    out.push_column(ADVERTISER_COLUMN, advertisers);
    Ok((out, summary))
}
