//! Torrents table parser.

use once_cell::sync::Lazy;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{ListingError, ListingLayout, TorrentRecord};

static TORRENTS_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.torrents").expect("valid selector"));
static TORRENT_NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".torrentname").expect("valid selector"));
static LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static BOLD: Lazy<Selector> = Lazy::new(|| Selector::parse("b").expect("valid selector"));
static IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));

/// Base for resolving relative links when reading their query string.
static LINK_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://tracker.invalid/").expect("valid base url"));

/// Cell offsets counted from the end of a row's `td` list.
const SIZE_FROM_END: usize = 5;
const SEEDERS_FROM_END: usize = 4;
const SNATCHED_FROM_END: usize = 2;

/// Extract the torrent records from a listing page, in document order.
pub fn parse_listing(
    document: &Html,
    layout: &ListingLayout,
) -> Result<Vec<TorrentRecord>, ListingError> {
    let table = document
        .select(&TORRENTS_TABLE)
        .next()
        .ok_or(ListingError::TableNotFound)?;

    let rows = table_rows(table);
    debug!(
        rows = rows.len(),
        header_rows = layout.header_rows,
        detail_rows = layout.detail_rows,
        "Found torrents table"
    );

    rows.iter()
        .enumerate()
        .skip(layout.header_rows)
        .step_by(layout.detail_rows + 1)
        .map(|(index, row)| parse_row(*row, index + 1))
        .collect()
}

/// Rows belonging to the table itself, not to tables nested in its cells.
///
/// The markup wraps the rows in a `form`; depending on how the parser repairs
/// a form inside a table they may also end up in an implicit `tbody`.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "form" | "tbody" | "thead" | "tfoot" => {
                for grandchild in child.children().filter_map(ElementRef::wrap) {
                    match grandchild.value().name() {
                        "tr" => rows.push(grandchild),
                        "tbody" => rows.extend(
                            grandchild
                                .children()
                                .filter_map(ElementRef::wrap)
                                .filter(|e| e.value().name() == "tr"),
                        ),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    rows
}

fn parse_row(row: ElementRef<'_>, index: usize) -> Result<TorrentRecord, ListingError> {
    let title = row
        .select(&TORRENT_NAME)
        .next()
        .ok_or(ListingError::MissingElement {
            row: index,
            element: "torrent name",
        })?;

    let href = title
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or(ListingError::MissingElement {
            row: index,
            element: "torrent link",
        })?;
    let id = id_from_href(href).ok_or_else(|| ListingError::InvalidField {
        row: index,
        field: "link",
        text: href.to_string(),
    })?;

    let name = title
        .select(&BOLD)
        .next()
        .map(element_text)
        .ok_or(ListingError::MissingElement {
            row: index,
            element: "title",
        })?;

    let category = row
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("title"))
        .ok_or(ListingError::MissingElement {
            row: index,
            element: "category image",
        })?
        .trim()
        .to_string();

    let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
    let cell_from_end = |offset: usize, element: &'static str| {
        cells
            .len()
            .checked_sub(offset)
            .map(|i| compact_text(cells[i]))
            .ok_or(ListingError::MissingElement {
                row: index,
                element,
            })
    };

    let size_text = cell_from_end(SIZE_FROM_END, "size cell")?;
    let size_gb = size_to_gb(&size_text).map_err(|_| ListingError::InvalidField {
        row: index,
        field: "size",
        text: size_text.clone(),
    })?;

    let seeders_text = cell_from_end(SEEDERS_FROM_END, "seeders cell")?;
    let seeders = parse_count(&seeders_text).map_err(|_| ListingError::InvalidField {
        row: index,
        field: "seeders",
        text: seeders_text.clone(),
    })?;

    let snatched_text = cell_from_end(SNATCHED_FROM_END, "snatched cell")?;
    let snatched = parse_count(&snatched_text).map_err(|_| ListingError::InvalidField {
        row: index,
        field: "snatched",
        text: snatched_text.clone(),
    })?;

    Ok(TorrentRecord {
        id,
        name,
        category,
        size_gb,
        seeders,
        snatched,
    })
}

/// The `id` query parameter of a (possibly relative) link.
///
/// Only ids made of ASCII letters, digits, `-` and `_` are accepted, since
/// the id also names the downloaded file.
fn id_from_href(href: &str) -> Option<String> {
    let url = LINK_BASE.join(href).ok()?;
    let id = url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())?;

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(id)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Cell text with all whitespace removed ("2.00 <br> GB" reads as "2.00GB").
fn compact_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Convert a size such as `"1.5GB"` or `"1,024MB"` to gigabytes.
///
/// `MB` is divided by 1024. Any other text is read as a number followed by
/// a two-character unit taken to be `GB`. Thousands separators are ignored.
pub fn size_to_gb(text: &str) -> Result<f64, ListingError> {
    let text = text.trim();
    let invalid = || ListingError::InvalidSize(text.to_string());

    let (number, factor) = match text.strip_suffix("MB") {
        Some(n) => (n, 1.0 / 1024.0),
        None => {
            let unit_start = text
                .char_indices()
                .rev()
                .nth(1)
                .map(|(i, _)| i)
                .ok_or_else(invalid)?;
            (&text[..unit_start], 1.0)
        }
    };

    let value: f64 = number
        .trim()
        .replace(',', "")
        .parse()
        .map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    Ok(value * factor)
}

/// Parse a non-negative count that may carry thousands separators (`"1,234"`).
pub fn parse_count(text: &str) -> Result<u64, ListingError> {
    text.trim()
        .replace(',', "")
        .parse()
        .map_err(|_| ListingError::InvalidCount(text.to_string()))
}
