//! Tracks where the scan is in the article's decade → year → game hierarchy.
//!
//! The article nests a `h3` per game under a `h2` per decade, but the tables
//! themselves only follow those headings as siblings. The tracker rebuilds the
//! nesting from heading order alone.

use log::debug;
use regex_lite::Regex;

/// Major headings that end the list of commercials.
pub const STOP_HEADINGS: &[&str] = &["See also", "References", "External links"];

/// Marker wikipedia appends to section headings when the edit links are inline.
pub const EDIT_MARKER: &str = "[edit]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeadingContext {
    /// before the first decade, or inside a section that is not a decade
    #[default]
    NoContext,
    DecadeOnly { decade: String },
    /// a year heading was seen and no table has claimed it yet
    DecadeYearSet {
        decade: String,
        year: String,
        label: Option<String>,
    },
}

impl HeadingContext {
    pub fn decade(&self) -> Option<&str> {
        match self {
            HeadingContext::NoContext => None,
            HeadingContext::DecadeOnly { decade } | HeadingContext::DecadeYearSet { decade, .. } => {
                Some(decade)
            }
        }
    }

    pub fn year(&self) -> Option<&str> {
        match self {
            HeadingContext::DecadeYearSet { year, .. } => Some(year),
            _ => None,
        }
    }

    pub fn super_bowl_label(&self) -> Option<&str> {
        match self {
            HeadingContext::DecadeYearSet { label, .. } => label.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorHeading {
    Decade,
    /// the scan must end here
    Stop,
    Other,
}

/// Strips the inline edit marker and surrounding whitespace from heading text.
pub fn clean_heading(text: &str) -> String {
    text.replace(EDIT_MARKER, "").trim().to_owned()
}

pub struct HeadingTracker {
    state: HeadingContext,
    decade_reg: Regex,
    year_reg: Regex,
}

impl Default for HeadingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingTracker {
    pub fn new() -> Self {
        Self {
            state: HeadingContext::NoContext,
            decade_reg: Regex::new(r"^\d{4}s$").unwrap(),
            // the label stays opaque: anything up to the closing paren
            year_reg: Regex::new(r"^(\d{4})\s*(?:\(([^)]+)\))?").unwrap(),
        }
    }

    pub fn context(&self) -> &HeadingContext {
        &self.state
    }

    /// Feeds a top level (`h2`) heading.
    pub fn major(&mut self, text: &str) -> MajorHeading {
        let text = clean_heading(text);
        if self.decade_reg.is_match(&text) {
            debug!("switched to decade {text}");
            self.state = HeadingContext::DecadeOnly { decade: text };
            MajorHeading::Decade
        } else if STOP_HEADINGS.contains(&text.as_str()) {
            debug!("stopping at heading {text:?}");
            self.state = HeadingContext::NoContext;
            MajorHeading::Stop
        } else {
            self.state = HeadingContext::NoContext;
            MajorHeading::Other
        }
    }

    /// Feeds a nested (`h3`) heading. Ignored unless a decade is active.
    pub fn minor(&mut self, text: &str) {
        let Some(decade) = self.state.decade().map(str::to_owned) else {
            return;
        };
        let text = clean_heading(text);
        self.state = match self.year_reg.captures(&text) {
            Some(caps) => {
                let year = caps[1].to_owned();
                let label = caps.get(2).map(|m| m.as_str().trim().to_owned());
                debug!("set year/label {year} / {}", label.as_deref().unwrap_or("N/A"));
                HeadingContext::DecadeYearSet { decade, year, label }
            }
            None => {
                debug!("heading {text:?} under {decade} has no year");
                HeadingContext::DecadeOnly { decade }
            }
        };
    }

    /// Hands out the current year context once, dropping back to the decade.
    ///
    /// Returns `None` when no year is set, in which case nothing changes.
    pub fn take_year(&mut self) -> Option<HeadingContext> {
        let HeadingContext::DecadeYearSet { decade, .. } = &self.state else {
            return None;
        };
        let decade = decade.clone();
        Some(std::mem::replace(
            &mut self.state,
            HeadingContext::DecadeOnly { decade },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year_set(decade: &str, year: &str, label: Option<&str>) -> HeadingContext {
        HeadingContext::DecadeYearSet {
            decade: decade.into(),
            year: year.into(),
            label: label.map(Into::into),
        }
    }

    #[test]
    fn decade_then_year() {
        let mut t = HeadingTracker::new();
        assert_eq!(t.major("1980s[edit]"), MajorHeading::Decade);
        t.minor("1984 (XVIII)[edit]");
        assert_eq!(t.context(), &year_set("1980s", "1984", Some("XVIII")));
        assert_eq!(t.context().year(), Some("1984"));
        assert_eq!(t.context().super_bowl_label(), Some("XVIII"));
    }

    #[test]
    fn year_without_label() {
        let mut t = HeadingTracker::new();
        t.major("2020s");
        t.minor("2021");
        assert_eq!(t.context(), &year_set("2020s", "2021", None));
    }

    #[test]
    fn label_kept_opaque() {
        let mut t = HeadingTracker::new();
        t.major("2010s");
        t.minor("2016 (50 / L)");
        assert_eq!(t.context().super_bowl_label(), Some("50 / L"));
    }

    #[test]
    fn minor_ignored_without_decade() {
        let mut t = HeadingTracker::new();
        t.minor("1984 (XVIII)");
        assert_eq!(t.context(), &HeadingContext::NoContext);
    }

    #[test]
    fn unmatched_minor_clears_year() {
        let mut t = HeadingTracker::new();
        t.major("1990s");
        t.minor("1995 (XXIX)");
        t.minor("Notable campaigns");
        assert_eq!(
            t.context(),
            &HeadingContext::DecadeOnly {
                decade: "1990s".into()
            }
        );
    }

    #[test]
    fn other_major_resets_everything() {
        let mut t = HeadingTracker::new();
        t.major("1990s");
        t.minor("1995 (XXIX)");
        assert_eq!(t.major("Controversies"), MajorHeading::Other);
        assert_eq!(t.context(), &HeadingContext::NoContext);
    }

    #[test]
    fn stop_headings() {
        for heading in STOP_HEADINGS {
            let mut t = HeadingTracker::new();
            t.major("2000s");
            assert_eq!(t.major(&format!("{heading}[edit]")), MajorHeading::Stop);
        }
        // only exact matches stop
        let mut t = HeadingTracker::new();
        assert_eq!(t.major("See also these"), MajorHeading::Other);
    }

    #[test]
    fn take_year_consumes_once() {
        let mut t = HeadingTracker::new();
        t.major("1980s");
        assert_eq!(t.take_year(), None);
        t.minor("1984 (XVIII)");
        assert_eq!(t.take_year(), Some(year_set("1980s", "1984", Some("XVIII"))));
        assert_eq!(t.take_year(), None);
        assert_eq!(t.context().decade(), Some("1980s"));
    }
}
