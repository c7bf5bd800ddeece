//! Delimited text, read and written the same way everywhere.

use std::fmt;
use std::io::Write;

use csv::{ReaderBuilder, Trim, Writer, WriterBuilder};

use crate::record::{CommercialRecord, COLUMNS};

#[derive(Debug)]
pub enum CsvError {
    /// not even a header line
    Empty,
    MissingColumn(String),
    Csv(csv::Error),
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvError::Empty => f.write_str("csv has no header"),
            CsvError::MissingColumn(name) => write!(f, "csv has no `{name}` column"),
            CsvError::Csv(e) => write!(f, "malformed csv: {e}"),
        }
    }
}

impl std::error::Error for CsvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CsvError::Csv(e) => Some(e),
            CsvError::Empty | CsvError::MissingColumn(_) => None,
        }
    }
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        CsvError::Csv(e)
    }
}

impl From<std::io::Error> for CsvError {
    fn from(e: std::io::Error) -> Self {
        CsvError::Csv(e.into())
    }
}

/// rows may be ragged in either direction
fn writer<W: Write>(w: W) -> Writer<W> {
    WriterBuilder::new().flexible(true).from_writer(w)
}

/// Header line followed by one line per record.
pub fn write_records<W: Write>(w: W, records: &[CommercialRecord]) -> Result<(), CsvError> {
    let mut wtr = writer(w);
    wtr.write_record(COLUMNS)?;
    for rec in records {
        wtr.write_record(rec.to_row())?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Result<Self, CsvError> {
        // editors like to leave a BOM on these
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(text.as_bytes());
        let header: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
        if header.iter().all(String::is_empty) {
            return Err(CsvError::Empty);
        }
        let mut rows = Vec::new();
        for rec in rdr.records() {
            rows.push(rec?.iter().map(str::to_owned).collect());
        }
        Ok(CsvTable { header, rows })
    }

    /// Index of the first column called `name`.
    pub fn column(&self, name: &str) -> Result<usize, CsvError> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CsvError::MissingColumn(name.to_owned()))
    }

    /// Cell text, empty for cells past the end of a ragged row.
    pub fn get(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    /// Appends a column. Short rows are padded so the value lines up with its
    /// header; cells past the header on long rows move one to the right.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) {
        let width = self.header.len();
        self.header.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() < width {
                row.resize(width, String::new());
            }
            row.insert(width, value);
        }
    }

    pub fn write_to<W: Write>(&self, w: W) -> Result<(), CsvError> {
        let mut wtr = writer(w);
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(row: &[&str]) -> String {
        let table = CsvTable {
            header: row.iter().map(|&s| s.to_owned()).collect(),
            rows: Vec::new(),
        };
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn quoting() {
        assert_eq!(written(&["plain", "", "a b"]), "plain,,a b\n");
        assert_eq!(
            written(&["Pepsi, Diet", "10\"", "two\nlines"]),
            "\"Pepsi, Diet\",\"10\"\"\",\"two\nlines\"\n"
        );
    }

    #[test]
    fn reads_quoted_fields() {
        let table =
            CsvTable::parse("a,b,c\r\n1,\"b, c\",\"say \"\"hi\"\"\"\r\n\r\n2,\"multi\nline\",3").unwrap();
        assert_eq!(
            table.rows,
            [
                vec!["1", "b, c", "say \"hi\""],
                vec!["2", "multi\nline", "3"],
            ]
        );
    }

    #[test]
    fn inner_quotes_kept() {
        let table = CsvTable::parse("BrandName,Ticker\nToys\"R\"Us,TOY\n").unwrap();
        assert_eq!(table.get(0, 0), "Toys\"R\"Us");
        assert_eq!(table.get(0, 1), "TOY");
    }

    #[test]
    fn trailing_empty_field_kept() {
        let table = CsvTable::parse("a,b,c\nx,y,\n").unwrap();
        assert_eq!(table.rows, [vec!["x", "y", ""]]);
    }

    #[test]
    fn table_lookup() {
        let table = CsvTable::parse("\u{feff}BrandName , Ticker\nPepsi,PEP\nApple\n").unwrap();
        assert_eq!(table.column("BrandName").unwrap(), 0);
        assert_eq!(table.column("Ticker").unwrap(), 1);
        assert!(matches!(
            table.column("Sector"),
            Err(CsvError::MissingColumn(name)) if name == "Sector"
        ));
        assert_eq!(table.get(1, 1), "");
        assert_eq!(table.get(5, 0), "");
        assert!(matches!(CsvTable::parse("\n\n"), Err(CsvError::Empty)));
        assert!(matches!(CsvTable::parse(""), Err(CsvError::Empty)));
    }

    #[test]
    fn push_column_keeps_every_cell() {
        let mut table = CsvTable::parse("a,b\n1\n2,3\n4,5,6\n").unwrap();
        table.push_column("c", vec!["x".into(), "y".into(), "z".into()]);
        assert_eq!(
            table.rows,
            [
                vec!["1", "", "x"],
                vec!["2", "3", "y"],
                vec!["4", "5", "z", "6"],
            ]
        );
    }

    #[test]
    fn records_reread() {
        let rec = CommercialRecord {
            product_type: Some("Beer".into()),
            advertiser_product_title: Some("Budweiser, \"Frogs\"".into()),
            year: Some("1995".into()),
            ..Default::default()
        };
        let mut buf = Vec::new();
        write_records(&mut buf, &[rec.clone()]).unwrap();
        let table = CsvTable::parse(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(table.header, COLUMNS);
        assert_eq!(table.rows, [rec.to_row()]);
    }
}
