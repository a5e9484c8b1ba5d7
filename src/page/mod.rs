//! In-memory document model at the execution boundary
//!
//! Stands in for the live page a command ultimately mutates: interactive
//! elements, editable fields, paragraph blocks, selection, scroll state,
//! session history and a wrap-around find cursor. Every mutation appends
//! to an ordered event log, which is the observable record of what a
//! command actually did.

use serde::Serialize;

/// Interactive element roles considered click candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    Link,
    Button,
    Input,
}

/// A visible (or hidden) interactive element in document order
#[derive(Debug, Clone)]
pub struct Element {
    pub label: String,
    pub role: ElementRole,
    /// Links carry a destination; activating them navigates
    pub href: Option<String>,
    pub visible: bool,
}

/// An editable field in document order
#[derive(Debug, Clone)]
pub struct EditableField {
    /// Identifying attributes (name, label, placeholder) folded into one hint
    pub name: String,
    pub value: String,
    pub focused: bool,
}

/// A paragraph-like text block
#[derive(Debug, Clone)]
pub struct Paragraph {
    pub text: String,
    pub visible: bool,
}

/// Viewport position within the document
#[derive(Debug, Clone, Copy)]
pub struct ScrollState {
    pub offset: f32,
    pub viewport: f32,
    pub extent: f32,
}

impl ScrollState {
    /// Largest legal offset (document fully scrolled)
    pub fn max_offset(&self) -> f32 {
        (self.extent - self.viewport).max(0.0)
    }
}

/// One observed document mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageEvent {
    Scrolled { from: f32, to: f32 },
    Highlighted { label: String },
    Activated { label: String },
    FieldChanged { name: String, value: String },
    Navigated { url: String },
    HistoryMoved { url: String },
}

/// The document model a CommandExecutor mutates
#[derive(Debug, Clone)]
pub struct PageDom {
    pub url: String,
    pub title: String,

    /// Text of the semantic article container, if the page has one
    pub article_text: Option<String>,
    /// Text of the semantic main container, if the page has one
    pub main_text: Option<String>,
    /// Whole-document text, the extraction of last resort
    pub body_text: String,

    pub paragraphs: Vec<Paragraph>,
    pub elements: Vec<Element>,
    pub fields: Vec<EditableField>,
    pub selection: Option<String>,

    pub scroll: ScrollState,

    history: Vec<String>,
    history_pos: usize,
    find_pos: usize,

    pub events: Vec<PageEvent>,
}

impl PageDom {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: url.clone(),
            title: String::new(),
            article_text: None,
            main_text: None,
            body_text: String::new(),
            paragraphs: Vec::new(),
            elements: Vec::new(),
            fields: Vec::new(),
            selection: None,
            scroll: ScrollState {
                offset: 0.0,
                viewport: 800.0,
                extent: 4000.0,
            },
            history: vec![url],
            history_pos: 0,
            find_pos: 0,
            events: Vec::new(),
        }
    }

    // === CONSTRUCTION ===

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_viewport(mut self, viewport: f32, extent: f32) -> Self {
        self.scroll.viewport = viewport;
        self.scroll.extent = extent;
        self
    }

    pub fn add_link(&mut self, label: impl Into<String>, href: impl Into<String>) {
        self.elements.push(Element {
            label: label.into(),
            role: ElementRole::Link,
            href: Some(href.into()),
            visible: true,
        });
    }

    pub fn add_button(&mut self, label: impl Into<String>) {
        self.elements.push(Element {
            label: label.into(),
            role: ElementRole::Button,
            href: None,
            visible: true,
        });
    }

    pub fn add_hidden_link(&mut self, label: impl Into<String>, href: impl Into<String>) {
        self.elements.push(Element {
            label: label.into(),
            role: ElementRole::Link,
            href: Some(href.into()),
            visible: false,
        });
    }

    pub fn add_field(&mut self, name: impl Into<String>) {
        self.fields.push(EditableField {
            name: name.into(),
            value: String::new(),
            focused: false,
        });
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.paragraphs.push(Paragraph {
            text: text.into(),
            visible: true,
        });
    }

    pub fn set_selection(&mut self, text: impl Into<String>) {
        self.selection = Some(text.into());
    }

    /// Focus the first field whose name hint contains the given text
    pub fn focus_field(&mut self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        for field in &mut self.fields {
            field.focused = false;
        }
        for field in &mut self.fields {
            if field.name.to_lowercase().contains(&name_lower) {
                field.focused = true;
                return true;
            }
        }
        false
    }

    // === SCROLLING ===

    /// Move the viewport by a signed offset, clamped to the document
    pub fn scroll_by(&mut self, delta: f32) {
        let from = self.scroll.offset;
        let to = (from + delta).clamp(0.0, self.scroll.max_offset());
        self.scroll.offset = to;
        self.events.push(PageEvent::Scrolled { from, to });
    }

    pub fn scroll_to_top(&mut self) {
        let from = self.scroll.offset;
        self.scroll.offset = 0.0;
        self.events.push(PageEvent::Scrolled { from, to: 0.0 });
    }

    pub fn scroll_to_bottom(&mut self) {
        let from = self.scroll.offset;
        let to = self.scroll.max_offset();
        self.scroll.offset = to;
        self.events.push(PageEvent::Scrolled { from, to });
    }

    // === ELEMENTS ===

    /// Indexes of visible interactive elements, in document order
    pub fn visible_interactive(&self) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Flash the about-to-be-activated element
    pub fn highlight(&mut self, index: usize) {
        if let Some(element) = self.elements.get(index) {
            self.events.push(PageEvent::Highlighted {
                label: element.label.clone(),
            });
        }
    }

    /// Activate an element; links navigate to their destination
    pub fn activate(&mut self, index: usize) {
        let Some(element) = self.elements.get(index) else {
            return;
        };
        let label = element.label.clone();
        let href = element.href.clone();
        self.events.push(PageEvent::Activated { label });
        if let Some(url) = href {
            self.navigate(&url);
        }
    }

    // === FIELDS ===

    /// Write a value and emit the standard change notification
    pub fn set_field_value(&mut self, index: usize, text: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = text.to_string();
            self.events.push(PageEvent::FieldChanged {
                name: field.name.clone(),
                value: text.to_string(),
            });
        }
    }

    // === NAVIGATION ===

    /// Change document location, truncating any forward history
    pub fn navigate(&mut self, url: &str) {
        self.history.truncate(self.history_pos + 1);
        self.history.push(url.to_string());
        self.history_pos = self.history.len() - 1;
        self.url = url.to_string();
        self.scroll.offset = 0.0;
        self.find_pos = 0;
        self.events.push(PageEvent::Navigated {
            url: url.to_string(),
        });
    }

    /// Step back in session history; false at the boundary
    pub fn history_back(&mut self) -> bool {
        if self.history_pos == 0 {
            return false;
        }
        self.history_pos -= 1;
        self.url = self.history[self.history_pos].clone();
        self.scroll.offset = 0.0;
        self.find_pos = 0;
        self.events.push(PageEvent::HistoryMoved {
            url: self.url.clone(),
        });
        true
    }

    /// Step forward in session history; false at the boundary
    pub fn history_forward(&mut self) -> bool {
        if self.history_pos + 1 >= self.history.len() {
            return false;
        }
        self.history_pos += 1;
        self.url = self.history[self.history_pos].clone();
        self.scroll.offset = 0.0;
        self.find_pos = 0;
        self.events.push(PageEvent::HistoryMoved {
            url: self.url.clone(),
        });
        true
    }

    // === TEXT EXTRACTION ===

    /// Visible paragraphs long enough to be real content
    pub fn qualifying_paragraphs(&self, min_chars: usize) -> Vec<&Paragraph> {
        self.paragraphs
            .iter()
            .filter(|p| p.visible && p.text.trim().chars().count() >= min_chars)
            .collect()
    }

    /// Primary content text by container priority
    ///
    /// Semantic article, else semantic main, else the joined paragraphs.
    /// If all of that comes up shorter than `min_chars`, the page is
    /// hiding its content behind markup we don't recognize and the whole
    /// document text is used instead.
    pub fn primary_text(&self, min_chars: usize) -> String {
        let candidate = if let Some(article) = &self.article_text {
            article.clone()
        } else if let Some(main) = &self.main_text {
            main.clone()
        } else {
            self.paragraphs
                .iter()
                .filter(|p| p.visible)
                .map(|p| p.text.trim())
                .collect::<Vec<_>>()
                .join(". ")
        };

        if candidate.trim().chars().count() < min_chars {
            self.body_text.clone()
        } else {
            candidate
        }
    }

    // === FIND ===

    /// Case-insensitive in-document search with wrap-around
    ///
    /// Each successful find moves the cursor past the match, so repeating
    /// the same query steps through occurrences and wraps at the end.
    pub fn find_text(&mut self, query: &str) -> bool {
        let haystack = self.searchable_text().to_lowercase();
        let needle = query.to_lowercase();
        if needle.is_empty() || haystack.is_empty() {
            return false;
        }

        let start = self.find_pos.min(haystack.len());
        if let Some(found) = haystack.get(start..).and_then(|tail| tail.find(&needle)) {
            self.find_pos = start + found + needle.len();
            return true;
        }

        // Wrap around to the start
        if let Some(found) = haystack.find(&needle) {
            self.find_pos = found + needle.len();
            return true;
        }

        self.find_pos = 0;
        false
    }

    fn searchable_text(&self) -> String {
        if !self.body_text.is_empty() {
            return self.body_text.clone();
        }
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // === HISTORY INSPECTION ===

    pub fn can_go_forward(&self) -> bool {
        self.history_pos + 1 < self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_clamps_to_document() {
        let mut page = PageDom::new("https://example.com").with_viewport(800.0, 2000.0);
        page.scroll_by(10_000.0);
        assert_eq!(page.scroll.offset, 1200.0);
        page.scroll_by(-99_999.0);
        assert_eq!(page.scroll.offset, 0.0);
    }

    #[test]
    fn test_scroll_events_record_movement() {
        let mut page = PageDom::new("https://example.com");
        page.scroll_by(640.0);
        assert_eq!(
            page.events,
            vec![PageEvent::Scrolled {
                from: 0.0,
                to: 640.0
            }]
        );
    }

    #[test]
    fn test_visible_filter_excludes_hidden() {
        let mut page = PageDom::new("https://example.com");
        page.add_link("Home", "/home");
        page.add_hidden_link("Tracker", "/t");
        page.add_button("Search");
        assert_eq!(page.visible_interactive(), vec![0, 2]);
    }

    #[test]
    fn test_activate_link_navigates() {
        let mut page = PageDom::new("https://example.com");
        page.add_link("About", "https://example.com/about");
        page.activate(0);
        assert_eq!(page.url, "https://example.com/about");
        assert!(page
            .events
            .iter()
            .any(|e| matches!(e, PageEvent::Navigated { url } if url.ends_with("/about"))));
    }

    #[test]
    fn test_navigate_truncates_forward_history() {
        let mut page = PageDom::new("https://a.example");
        page.navigate("https://b.example");
        page.navigate("https://c.example");
        assert!(page.history_back());
        assert_eq!(page.url, "https://b.example");

        // A fresh navigation from here drops c.example
        page.navigate("https://d.example");
        assert!(!page.can_go_forward());
        assert!(page.history_back());
        assert_eq!(page.url, "https://b.example");
    }

    #[test]
    fn test_history_boundaries() {
        let mut page = PageDom::new("https://a.example");
        assert!(!page.history_back());
        assert!(!page.history_forward());
    }

    #[test]
    fn test_field_change_emits_notification() {
        let mut page = PageDom::new("https://example.com");
        page.add_field("search");
        page.set_field_value(0, "teapots");
        assert_eq!(
            page.events,
            vec![PageEvent::FieldChanged {
                name: "search".into(),
                value: "teapots".into()
            }]
        );
    }

    #[test]
    fn test_primary_text_priority() {
        let mut page = PageDom::new("https://example.com");
        page.add_paragraph("A paragraph with enough words to count as content here.");
        page.article_text = Some("The article body wins over everything else on this page.".into());
        assert!(page.primary_text(10).starts_with("The article body"));

        page.article_text = None;
        assert!(page.primary_text(10).starts_with("A paragraph"));
    }

    #[test]
    fn test_primary_text_falls_back_to_body() {
        let mut page = PageDom::new("https://example.com");
        page.add_paragraph("tiny");
        page.body_text = "Full document text dump used when extraction is too thin.".into();
        assert!(page.primary_text(100).starts_with("Full document"));
    }

    #[test]
    fn test_find_wraps_around() {
        let mut page = PageDom::new("https://example.com");
        page.body_text = "alpha beta alpha gamma".into();

        assert!(page.find_text("alpha"));
        assert!(page.find_text("alpha")); // second occurrence
        assert!(page.find_text("alpha")); // wraps to first again
        assert!(!page.find_text("delta"));
    }

    #[test]
    fn test_qualifying_paragraphs_filter() {
        let mut page = PageDom::new("https://example.com");
        page.add_paragraph("short");
        page.add_paragraph("This paragraph is comfortably long enough to qualify as content.");
        page.paragraphs.push(Paragraph {
            text: "Hidden but long enough paragraph that must still be filtered out.".into(),
            visible: false,
        });
        assert_eq!(page.qualifying_paragraphs(20).len(), 1);
    }
}
