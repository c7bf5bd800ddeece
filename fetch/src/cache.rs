use rusqlite::{Connection, OptionalExtension, Result};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    // numberings are stored in db, so they should only be added to
    Html = 0,
    Xhtml = 1,
    Xml = 2,
    Plain = 3,
    Csv = 4,
    Json = 5,
}

impl MediaType {
    pub fn try_new(id: i64) -> Option<Self> {
        let ret = match id {
            0 => Self::Html,
            1 => Self::Xhtml,
            2 => Self::Xml,
            3 => Self::Plain,
            4 => Self::Csv,
            5 => Self::Json,
            _ => return None,
        };
        debug_assert_eq!(id, ret as i64, "mislabeled id");
        Some(ret)
    }

    /// `None` for anything that is not a text document we know how to handle
    pub fn from_mime(s: &str) -> Option<Self> {
        let s = s.split_once(';').map_or(s, |(x, _params)| x).trim();
        let ret = match s {
            "text/html" => MediaType::Html,
            "application/xhtml+xml" => MediaType::Xhtml,
            "application/xml" | "text/xml" => MediaType::Xml,
            "text/plain" => MediaType::Plain,
            "text/csv" => MediaType::Csv,
            "application/json" => MediaType::Json,
            _ => return None,
        };
        Some(ret)
    }

    pub fn from_extension(s: &str) -> Option<Self> {
        let ret = match s {
            "html" | "htm" => MediaType::Html,
            "xhtml" => MediaType::Xhtml,
            "xml" => MediaType::Xml,
            "txt" => MediaType::Plain,
            "csv" => MediaType::Csv,
            "json" => MediaType::Json,
            _ => return None,
        };
        Some(ret)
    }

    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Html => "text/html",
            MediaType::Xhtml => "application/xhtml+xml",
            MediaType::Xml => "application/xml",
            MediaType::Plain => "text/plain",
            MediaType::Csv => "text/csv",
            MediaType::Json => "application/json",
        }
    }

    /// whether the payload can be handed to an html parser
    ///
    /// ```
    /// # use fetch::MediaType;
    ///
    /// assert!(MediaType::Html.is_markup());
    /// assert!(MediaType::Xhtml.is_markup());
    /// assert!(!MediaType::Csv.is_markup());
    /// ```
    pub fn is_markup(self) -> bool {
        matches!(self, MediaType::Html | MediaType::Xhtml | MediaType::Xml)
    }
}

/// Response bodies keyed by url.
pub struct ObjectCache {
    conn: Connection,
}

impl ObjectCache {
    pub fn new(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS cache_entries (id INTEGER PRIMARY KEY,
                            url TEXT UNIQUE NOT NULL,
                            type INTEGER NOT NULL,
                            content BLOB NOT NULL);
",
        )?;
        Ok(ObjectCache { conn })
    }

    /// replaces any earlier entry for the same url
    pub fn set(&self, key: &str, val: &[u8], ty: MediaType) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT OR REPLACE INTO cache_entries (url, type, content) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute((key, ty as i64, val))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<(MediaType, Vec<u8>)>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT type, content FROM cache_entries WHERE url=?1 LIMIT 1")?;
        let row: Option<(i64, Vec<u8>)> = stmt
            .query_row([key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;
        let Some((ty, content)) = row else {
            return Ok(None);
        };
        // an unknown id means the row was written by a newer build
        let Some(ty) = MediaType::try_new(ty) else {
            return Ok(None);
        };
        Ok(Some((ty, content)))
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("DELETE FROM cache_entries WHERE url=?1")?;
        Ok(stmt.execute([key])? > 0)
    }
}
