//! Testing utilities and mock implementations.
//!
//! This module provides a mock CAPTCHA solver and HTML fixtures shaped like
//! the tracker's pages, so the session and listing code can be exercised
//! against a local HTTP server.
//!
//! # Example
//!
//! ```rust,ignore
//! use snatcher_core::testing::{fixtures, MockCaptchaSolver};
//!
//! let solver = MockCaptchaSolver::with_answer("x7k2");
//! let page = fixtures::listing_page(&[fixtures::ListingRow::new("42", "Movie", 5)]);
//! ```

mod mock_captcha_solver;

pub use mock_captcha_solver::MockCaptchaSolver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::listing::TorrentRecord;

    /// Create a test record with reasonable defaults.
    pub fn torrent_record(id: &str, seeders: u64) -> TorrentRecord {
        TorrentRecord {
            id: id.to_string(),
            name: format!("Torrent {}", id),
            category: "Movies".to_string(),
            size_gb: 1.5,
            seeders,
            snatched: 10,
        }
    }

    /// One data row of a listing page.
    #[derive(Debug, Clone)]
    pub struct ListingRow {
        pub id: String,
        pub name: String,
        pub category: String,
        pub size: String,
        pub seeders: String,
        pub snatched: String,
    }

    impl ListingRow {
        pub fn new(id: &str, name: &str, seeders: u64) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                category: "Movies".to_string(),
                size: "1.50GB".to_string(),
                seeders: seeders.to_string(),
                snatched: "0".to_string(),
            }
        }

        pub fn size(mut self, size: &str) -> Self {
            self.size = size.to_string();
            self
        }

        pub fn category(mut self, category: &str) -> Self {
            self.category = category.to_string();
            self
        }

        pub fn snatched(mut self, snatched: &str) -> Self {
            self.snatched = snatched.to_string();
            self
        }

        /// Override the raw seeders cell text.
        pub fn seeders_text(mut self, text: &str) -> Self {
            self.seeders = text.to_string();
            self
        }

        /// The `<tr>` markup for this row, laid out like the tracker's listing:
        /// category, name, comments, age, size, seeders, leechers, snatched, uploader.
        pub fn to_html(&self) -> String {
            let (number, unit) = split_unit(&self.size);
            format!(
                r#"<tr>
<td class="rowfollow nowrap"><a href="?cat=401"><img class="c_movie" src="pic/cattrans.gif" alt="{category}" title="{category}"></a></td>
<td class="rowfollow" width="100%"><table class="torrentname" width="100%"><tr>
<td class="embedded"><a title="{name}" href="details.php?id={id}&amp;hit=1"><b>{name}</b></a><br>subtitle</td>
<td class="embedded" width="20"><a href="download.php?id={id}"><img class="download" src="pic/trans.gif" alt="download"></a></td>
</tr></table></td>
<td class="rowfollow"><a href="comments.php?id={id}">0</a></td>
<td class="rowfollow nowrap"><span title="2024-06-01 12:00:00">1 day</span></td>
<td class="rowfollow">{number}<br>{unit}</td>
<td class="rowfollow" align="center"><b><a href="details.php?id={id}#peers">{seeders}</a></b></td>
<td class="rowfollow">0</td>
<td class="rowfollow"><a href="viewsnatches.php?id={id}"><b>{snatched}</b></a></td>
<td class="rowfollow"><i>anonymous</i></td>
</tr>"#,
                id = self.id,
                name = escape(&self.name),
                category = escape(&self.category),
                number = number,
                unit = unit,
                seeders = self.seeders,
                snatched = self.snatched,
            )
        }
    }

    /// Detail row that follows each data row on the listing page.
    pub fn detail_row() -> &'static str {
        r#"<tr><td class="rowfollow" colspan="9"><div class="progress"></div></td></tr>"#
    }

    /// A listing page: two header rows, then data/detail row pairs.
    pub fn listing_page(rows: &[ListingRow]) -> String {
        page(rows, true, false)
    }

    /// Same as [`listing_page`], with the rows wrapped in a `form` inside the table.
    pub fn listing_page_with_form(rows: &[ListingRow]) -> String {
        page(rows, true, true)
    }

    /// A listing page whose data rows are not followed by detail rows.
    pub fn listing_page_without_details(rows: &[ListingRow]) -> String {
        page(rows, false, false)
    }

    /// A login page carrying a CAPTCHA image and its hash token.
    pub fn login_page(captcha_src: &str, image_hash: &str) -> String {
        format!(
            r#"<html><body>
<form method="post" action="takelogin.php">
<input type="text" name="username">
<input type="password" name="password">
<img src="{src}" border="0" alt="CAPTCHA">
<input type="text" name="imagestring">
<input type="hidden" name="imagehash" value="{hash}">
<input type="submit" value="Login">
</form>
</body></html>"#,
            src = escape(captcha_src),
            hash = escape(image_hash),
        )
    }

    fn page(rows: &[ListingRow], with_details: bool, with_form: bool) -> String {
        let mut body = String::new();
        body.push_str(
            r#"<tr><td class="colhead" colspan="9">Sort by</td></tr>
<tr><td class="colhead">Type</td><td class="colhead">Name</td><td class="colhead">C</td><td class="colhead">T</td><td class="colhead">Size</td><td class="colhead">S</td><td class="colhead">L</td><td class="colhead">D</td><td class="colhead">U</td></tr>
"#,
        );
        for row in rows {
            body.push_str(&row.to_html());
            body.push('\n');
            if with_details {
                body.push_str(detail_row());
                body.push('\n');
            }
        }

        let rows_markup = if with_form {
            format!(r#"<form method="post" action="takebookmark.php">{}</form>"#, body)
        } else {
            format!("<tbody>{}</tbody>", body)
        };

        format!(
            r#"<html><head><title>Torrents</title></head><body>
<table class="main"><tr><td class="embedded">
<table class="torrents" cellspacing="0" cellpadding="5" width="100%">{}</table>
</td></tr></table>
</body></html>"#,
            rows_markup
        )
    }

    fn split_unit(size: &str) -> (&str, &str) {
        let split = size
            .char_indices()
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .unwrap_or(size.len());
        size.split_at(split)
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}
