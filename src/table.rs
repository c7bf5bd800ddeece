//! Turns one raw `<table>` into commercial records.

use std::fmt;

use scraper::{ElementRef, Html, Node, Selector};

use crate::context::HeadingContext;
use crate::record::CommercialRecord;

/// Spans above this are treated as markup errors.
const MAX_SPAN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductType,
    AdvertiserProductTitle,
    Title,
    PlotNotes,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::ProductType => "Product_Type",
            Field::AdvertiserProductTitle => "Advertiser_Product_Title",
            Field::Title => "Title",
            Field::PlotNotes => "Plot_Notes",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPattern {
    Exact(&'static str),
    Prefix(&'static str),
}

impl ColumnPattern {
    /// `header` must already be trimmed and lowercased
    pub fn matches(self, header: &str) -> bool {
        match self {
            ColumnPattern::Exact(s) => header == s,
            ColumnPattern::Prefix(s) => header.starts_with(s),
        }
    }
}

/// Header rename rules, first match wins.
pub const COLUMN_RULES: &[(ColumnPattern, Field)] = &[
    (ColumnPattern::Exact("product type"), Field::ProductType),
    (ColumnPattern::Exact("product/title"), Field::AdvertiserProductTitle),
    (ColumnPattern::Exact("advertiser/product"), Field::AdvertiserProductTitle),
    (ColumnPattern::Exact("title"), Field::Title),
    (ColumnPattern::Prefix("plot/notes"), Field::PlotNotes),
];

/// Maps a source header to its canonical field, if it has one.
pub fn canonical_field(header: &str) -> Option<Field> {
    let header = header.trim().to_lowercase();
    COLUMN_RULES
        .iter()
        .find(|(pat, _)| pat.matches(&header))
        .map(|&(_, field)| field)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unparseable {
    NoTable,
    NoRows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    Unparseable(Unparseable),
    /// the fields that were recognised, in header order
    MissingEssentialColumns { found: Vec<Field> },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Unparseable(Unparseable::NoTable) => f.write_str("no table in markup"),
            TableError::Unparseable(Unparseable::NoRows) => f.write_str("table has no data rows"),
            TableError::MissingEssentialColumns { found } => {
                f.write_str("essential columns not found (have: ")?;
                if found.is_empty() {
                    f.write_str("none")?;
                }
                for (i, field) in found.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl std::error::Error for TableError {}

/// A rectangular view of a table with spans expanded. Every cell is text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    /// First `<table>` in `markup`; its first row becomes the header.
    pub fn parse(markup: &str) -> Result<Grid, TableError> {
        let fragment = Html::parse_fragment(markup);
        let table_sel = Selector::parse("table").unwrap();
        let table = fragment
            .select(&table_sel)
            .next()
            .ok_or(TableError::Unparseable(Unparseable::NoTable))?;

        let mut expanded = expand_spans(table_rows(table));
        if expanded.len() < 2 {
            return Err(TableError::Unparseable(Unparseable::NoRows));
        }
        let header = expanded.remove(0);
        let width = header.len();
        for row in &mut expanded {
            row.resize(width, String::new());
        }
        Ok(Grid {
            header,
            rows: expanded,
        })
    }
}

/// `tr`s that belong to this table, skipping rows of nested tables
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => (),
        }
    }
    rows
}

fn span_attr(cell: ElementRef<'_>, attr: &str) -> usize {
    cell.attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(MAX_SPAN))
}

/// Lays cells out on a grid, copying a spanning cell's text into every slot it covers.
fn expand_spans(rows: Vec<ElementRef<'_>>) -> Vec<Vec<String>> {
    // per column: text still owed to following rows and how many rows it covers
    let mut carry: Vec<Option<(String, usize)>> = Vec::new();
    let mut out = Vec::with_capacity(rows.len());

    for tr in rows {
        let mut line: Vec<String> = Vec::new();
        let mut cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"));
        let mut col = 0;
        loop {
            let owed = match carry.get_mut(col) {
                Some(Some((text, left))) => {
                    *left -= 1;
                    Some((text.clone(), *left == 0))
                }
                _ => None,
            };
            if let Some((text, done)) = owed {
                if done {
                    carry[col] = None;
                }
                line.push(text);
                col += 1;
                continue;
            }
            let Some(cell) = cells.next() else {
                if col < carry.len() {
                    // a gap left by a short row; later columns may still be spanned
                    line.push(String::new());
                    col += 1;
                    continue;
                }
                break;
            };
            let text = cell_text(cell);
            let rowspan = span_attr(cell, "rowspan");
            for _ in 0..span_attr(cell, "colspan") {
                if carry.len() <= col {
                    carry.resize(col + 1, None);
                }
                if rowspan > 1 {
                    carry[col] = Some((text.clone(), rowspan - 1));
                }
                line.push(text.clone());
                col += 1;
            }
        }
        out.push(line);
    }
    out
}

/// All text under `cell` with whitespace collapsed.
pub fn cell_text(cell: ElementRef<'_>) -> String {
    let mut raw = String::new();
    descend(&mut raw, cell);
    normalize_ws(&raw)
}

fn descend(out: &mut String, el: ElementRef<'_>) {
    for child in el.children() {
        match child.value() {
            Node::Text(txt) => out.push_str(txt),
            Node::Element(e) => match e.name() {
                "br" => out.push(' '),
                "style" | "script" => (),
                _ => {
                    if let Some(child) = ElementRef::wrap(child) {
                        descend(out, child)
                    }
                }
            },
            _ => (),
        }
    }
}

/// Collapses runs of whitespace (including nbsp) into one space and trims.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Column position of each canonical field, leftmost header wins.
#[derive(Debug, Default)]
struct ColumnMap {
    product_type: Option<usize>,
    advertiser_product_title: Option<usize>,
    title: Option<usize>,
    plot_notes: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (i, h) in header.iter().enumerate() {
            let Some(field) = canonical_field(h) else {
                continue;
            };
            let slot = match field {
                Field::ProductType => &mut map.product_type,
                Field::AdvertiserProductTitle => &mut map.advertiser_product_title,
                Field::Title => &mut map.title,
                Field::PlotNotes => &mut map.plot_notes,
            };
            slot.get_or_insert(i);
        }
        map
    }

    fn found(&self) -> Vec<Field> {
        let mut found: Vec<(usize, Field)> = [
            (self.product_type, Field::ProductType),
            (self.advertiser_product_title, Field::AdvertiserProductTitle),
            (self.title, Field::Title),
            (self.plot_notes, Field::PlotNotes),
        ]
        .into_iter()
        .filter_map(|(i, f)| Some((i?, f)))
        .collect();
        found.sort_by_key(|&(i, _)| i);
        found.into_iter().map(|(_, f)| f).collect()
    }

    fn is_usable(&self) -> bool {
        self.product_type.is_some()
            && (self.advertiser_product_title.is_some() || self.title.is_some())
    }
}

/// Parses `markup` and projects every data row onto the output schema.
pub fn normalize(
    markup: &str,
    context: &HeadingContext,
) -> Result<Vec<CommercialRecord>, TableError> {
    let grid = Grid::parse(markup)?;
    let columns = ColumnMap::from_header(&grid.header);
    if !columns.is_usable() {
        return Err(TableError::MissingEssentialColumns {
            found: columns.found(),
        });
    }

    let template = CommercialRecord::with_context(context);
    let records = grid
        .rows
        .into_iter()
        .map(|row| {
            let take = |col: Option<usize>| col.map(|i| row[i].clone());
            CommercialRecord {
                product_type: take(columns.product_type),
                advertiser_product_title: take(columns.advertiser_product_title),
                title: take(columns.title),
                plot_notes: take(columns.plot_notes),
                ..template.clone()
            }
        })
        .collect();
    Ok(records)
}
