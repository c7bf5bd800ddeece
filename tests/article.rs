use sbads::brand::{map_table, BrandMap};
use sbads::csv::{self, CsvTable};
use sbads::page::Page;
use sbads::record::COLUMNS;

const HTML: &str = r##"<!DOCTYPE html><html><head><title>List of Super Bowl commercials</title></head><body>
<div id="mw-content-text" class="mw-body-content"><div class="mw-content-ltr mw-parser-output" lang="en">
<table class="infobox"><tbody><tr><th>Part of a series</th></tr><tr><td>Advertising</td></tr></tbody></table>
<p>The Super Bowl is known for its commercials.</p>
<div class="mw-heading mw-heading2"><h2 id="1960s">1960s</h2><span class="mw-editsection"><span class="mw-editsection-bracket">[</span><a href="#">edit</a><span class="mw-editsection-bracket">]</span></span></div>
<div class="mw-heading mw-heading3"><h3 id="1967_(I)">1967 (I)</h3></div>
<table class="wikitable sortable">
<tbody><tr><th>Product type</th><th>Advertiser/product</th><th>Title</th><th>Plot/notes<sup>[1]</sup></th></tr>
<tr><td rowspan="2">Tobacco</td><td>Winston cigarettes</td><td>"Tastes Good"</td><td>Jingle.</td></tr>
<tr><td>Benson &amp; Hedges 100's</td><td></td><td>Longer cigarette,<br>longer ad.</td></tr>
</tbody></table>
<div class="mw-heading mw-heading2"><h2 id="1970s">1970s</h2></div>
<div class="mw-heading mw-heading3"><h3 id="1973_(VII)">1973 (VII)</h3></div>
<table class="wikitable"><tbody>
<tr><th>Product type</th><th>Product/title</th><th>Title</th></tr>
<tr><td>Shaving</td><td>Noxzema</td><td>Joe Namath and Farrah Fawcett</td></tr>
</tbody></table>
<table class="wikitable"><tbody>
<tr><th>Product type</th><th>Product/title</th></tr>
<tr><td>Orphan</td><td>Should not appear</td></tr>
</tbody></table>
<div class="mw-heading mw-heading3"><h3 id="1979_(XIII)">1979 (XIII)</h3></div>
<table class="wikitable"><tbody>
<tr><th>Advertiser</th><th>Notes</th></tr>
<tr><td>Coca-Cola</td><td>Hey Kid, Catch!</td></tr>
</tbody></table>
<div class="mw-heading mw-heading2"><h2 id="Notable">Notable campaigns</h2></div>
<div class="mw-heading mw-heading3"><h3 id="1984">1984</h3></div>
<table class="wikitable"><tbody>
<tr><th>Product type</th><th>Title</th></tr>
<tr><td>Computer</td><td>1984</td></tr>
</tbody></table>
<div class="mw-heading mw-heading2"><h2 id="2010s">2010s</h2></div>
<div class="mw-heading mw-heading3"><h3 id="2016">2016 (50)</h3></div>
<table class="wikitable"><tbody>
<tr><th>Product type</th><th>Advertiser/product</th><th>Title</th></tr>
<tr><td>Beer</td><td>Bud Light</td><td>"The Bud Light Party"</td></tr>
<tr><td>Snack</td><td>Doritos</td><td>"Ultrasound"</td></tr>
</tbody></table>
<div class="mw-heading mw-heading2"><h2 id="See_also">See also</h2></div>
<div class="mw-heading mw-heading2"><h2 id="2020s">2020s</h2></div>
<div class="mw-heading mw-heading3"><h3 id="2020">2020 (LIV)</h3></div>
<table class="wikitable"><tbody>
<tr><th>Product type</th><th>Title</th></tr>
<tr><td>Car</td><td>Groundhog Day</td></tr>
</tbody></table>
</div></div>
<table class="wikitable"><tr><th>Product type</th><th>Title</th></tr><tr><td>Outside</td><td>content</td></tr></table>
</body></html>"##;

fn extracted() -> sbads::Extraction {
    let html = scraper::Html::parse_document(HTML);
    let elements = Page::new().elements(&html).expect("article has content");
    sbads::extract(elements)
}

#[test]
fn article_records() {
    let ex = extracted();
    let rows: Vec<Vec<String>> = ex.records.iter().map(|r| r.to_row()).collect();
    assert_eq!(
        rows,
        [
            [
                "Tobacco",
                "Winston cigarettes",
                "\"Tastes Good\"",
                "Jingle.",
                "1960s",
                "1967",
                "I"
            ],
            [
                "Tobacco",
                "Benson & Hedges 100's",
                "",
                "Longer cigarette, longer ad.",
                "1960s",
                "1967",
                "I"
            ],
            [
                "Shaving",
                "Noxzema",
                "Joe Namath and Farrah Fawcett",
                "",
                "1970s",
                "1973",
                "VII"
            ],
            [
                "Beer",
                "Bud Light",
                "\"The Bud Light Party\"",
                "",
                "2010s",
                "2016",
                "50"
            ],
            [
                "Snack",
                "Doritos",
                "\"Ultrasound\"",
                "",
                "2010s",
                "2016",
                "50"
            ],
        ]
    );
}

#[test]
fn article_stats() {
    let ex = extracted();
    // infobox; orphan and 1984 tables have no year; 1979 fails
    assert_eq!(ex.stats.seen, 7);
    assert_eq!(ex.stats.accepted, 3);
    assert_eq!(ex.stats.unmarked, 1);
    assert_eq!(ex.stats.without_year, 2);
    assert_eq!(ex.stats.failed, 1);
    assert_eq!(ex.failures[0].year, "1979");
    assert_eq!(ex.failures[0].index, 4);
}

#[test]
fn csv_then_mapping() {
    let records = extracted().into_records().expect("tables accepted");
    let mut buf = Vec::new();
    csv::write_records(&mut buf, &records).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with(&COLUMNS.join(",")));
    assert_eq!(text.lines().count(), records.len() + 1);

    let commercials = CsvTable::parse(&text).unwrap();
    let brands = CsvTable::parse("BrandName,Ticker\nBud,BUD\nBud Light,BUD\nDoritos,PEP\n").unwrap();
    let brands = BrandMap::from_table(&brands).unwrap();
    let (mapped, summary) = map_table(&commercials, &brands).unwrap();
    let col = mapped.column("Primary_Advertiser").unwrap();
    let advertisers: Vec<&str> = (0..mapped.rows.len()).map(|r| mapped.get(r, col)).collect();
    assert_eq!(advertisers, ["", "", "", "Bud Light", "Doritos"]);
    assert_eq!(summary.mapped, 2);
    assert_eq!(summary.unmapped, 3);
}
