//! Link rendering and the footnote link list
//!
//! Every anchor-like construct is funneled through [`LinkList::render`], which
//! picks the rendering for the active [`LinkMode`]. In table mode the URL is
//! recorded in the list and referenced by its 1-based index; the list is
//! printed as a footnote section once the whole document has been converted.
//!
//! ```rust
//! use plaintext_converter::links::LinkList;
//! use plaintext_converter::options::LinkMode;
//!
//! let mut links = LinkList::new();
//! let a = links.render(LinkMode::Table, "https://a.test/", "A", None, false);
//! let b = links.render(LinkMode::Table, "https://b.test/", "B", None, false);
//! let again = links.render(LinkMode::Table, "https://a.test/", "A again", None, false);
//!
//! assert_eq!(a, "A [1]");
//! assert_eq!(b, "B [2]");
//! assert_eq!(again, "A again [1]");
//! assert_eq!(
//!     links.render_footnote(),
//!     "\n\nLinks:\n------\n[1] https://a.test/\n[2] https://b.test/\n"
//! );
//! ```

use crate::options::LinkMode;
use crate::security::is_ignored_link;

/// Ordered, append-only list of unique URLs referenced in table mode
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkList {
    urls: Vec<String>,
}

impl LinkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based index of `url`, appending it if it has not been seen yet
    ///
    /// URLs are compared by exact string equality.
    pub fn index_of(&mut self, url: &str) -> usize {
        match self.urls.iter().position(|known| known == url) {
            Some(position) => position + 1,
            None => {
                self.urls.push(url.to_string());
                self.urls.len()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Render one link occurrence
    ///
    /// # Arguments
    ///
    /// * `default_mode` - Mode configured for the conversion
    /// * `url` - Link target; embedded spaces are removed
    /// * `display` - Link text as it appears in the document
    /// * `mode_override` - Mode requested by the element itself, wins over `default_mode`
    /// * `newline` - Append a newline after the rendered link
    pub fn render(
        &mut self,
        default_mode: LinkMode,
        url: &str,
        display: &str,
        mode_override: Option<LinkMode>,
        newline: bool,
    ) -> String {
        let mode = mode_override.unwrap_or(default_mode);
        let url = url.replace(' ', "");
        let newline = if newline { "\n" } else { "" };

        if mode == LinkMode::Off || is_ignored_link(&url) {
            return format!("{display}{newline}");
        }

        match mode {
            LinkMode::Table => {
                let index = self.index_of(&url);
                format!("{display} [{index}]{newline}")
            }
            LinkMode::BbCode => format!("[url={url}]{display}[/url]{newline}"),
            _ if url == display => format!("{display}{newline}"),
            LinkMode::NextLine => format!("{display}\n[{url}]{newline}"),
            _ => format!("{display} [{url}]{newline}"),
        }
    }

    /// Footnote section listing every recorded URL, or an empty string when
    /// no URL was recorded
    pub fn render_footnote(&self) -> String {
        if self.urls.is_empty() {
            return String::new();
        }

        let mut footnote = String::from("\n\nLinks:\n------\n");
        for (i, url) in self.urls.iter().enumerate() {
            footnote.push_str(&format!("[{}] {}\n", i + 1, url));
        }
        footnote
    }
}
