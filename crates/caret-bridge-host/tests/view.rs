//! The host view driving a bridge over the in-memory document.

use std::cell::RefCell;
use std::rc::Rc;

use caret_bridge_core::CaretBridge;
use caret_bridge_core::memory::MemoryDocument;
use caret_bridge_host::{
    EditableView, HostCall, HostConfig, Point, ScriptTransport, ScrollContainer, SharedView,
    ViewRect,
};

/// Queues calls the way a web view queues `loadUrl`, to be run later.
#[derive(Clone, Default)]
struct QueuedTransport {
    pages: Rc<RefCell<Vec<String>>>,
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl ScriptTransport for QueuedTransport {
    fn load_page(&self, _base_url: &str, html: &str) {
        self.pages.borrow_mut().push(html.to_owned());
    }

    fn load_url(&self, url: &str) {
        panic!("unexpected raw url {url}");
    }

    fn call(&self, call: &HostCall) {
        self.calls.borrow_mut().push(call.clone());
    }
}

#[derive(Clone)]
struct FakeScroll {
    visible: ViewRect,
    chain: Vec<Point>,
    scrolled: Rc<RefCell<Vec<Point>>>,
}

impl FakeScroll {
    fn new(visible: ViewRect, offset: Point) -> Self {
        Self::nested(visible, vec![offset])
    }

    fn nested(visible: ViewRect, chain: Vec<Point>) -> Self {
        Self {
            visible,
            chain,
            scrolled: Rc::default(),
        }
    }
}

impl ScrollContainer for FakeScroll {
    fn visible_rect(&self) -> ViewRect {
        self.visible
    }

    fn offset_chain(&self) -> Vec<Point> {
        self.chain.clone()
    }

    fn smooth_scroll_to(&self, target: Point) {
        self.scrolled.borrow_mut().push(target);
    }
}

struct Harness {
    view: SharedView<QueuedTransport>,
    transport: QueuedTransport,
    bridge: CaretBridge<MemoryDocument, SharedView<QueuedTransport>>,
}

impl Harness {
    fn new(content: &str, config: HostConfig) -> Self {
        let transport = QueuedTransport::default();
        let view = SharedView::new(EditableView::new(transport.clone(), config));
        view.borrow_mut().set_content(content);
        let bridge = CaretBridge::new(MemoryDocument::new(content), view.clone());
        Self {
            view,
            transport,
            bridge,
        }
    }

    /// Run every queued call against the page.
    fn pump(&self) {
        let calls = std::mem::take(&mut *self.transport.calls.borrow_mut());
        for call in calls {
            match call {
                HostCall::GetContent => self.bridge.fetch_content(),
                HostCall::InsertContent(html) => self.bridge.insert_content(&html),
                HostCall::SetCaretToElement(id) => self.bridge.move_caret_to_element(&id),
            }
        }
    }
}

#[test]
fn test_page_is_loaded_once() {
    let h = Harness::new("<p>hi</p>", HostConfig::default());
    let pages = h.transport.pages.borrow();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains("<div id=\"contentBody\""));
}

#[test]
fn test_get_content_round_trip() {
    let h = Harness::new("<p id=\"a\">x</p>", HostConfig::default());
    let received = Rc::new(RefCell::new(Vec::new()));

    let sink = received.clone();
    h.view
        .borrow_mut()
        .get_content(move |c| sink.borrow_mut().push(c.to_owned()));
    assert!(received.borrow().is_empty());

    h.pump();
    assert_eq!(*received.borrow(), vec!["<p id=\"a\">x</p>".to_string()]);
}

#[test]
fn test_caret_then_insert_then_fetch() {
    let h = Harness::new("head<p id=\"a\">x</p>tail", HostConfig::default());
    let received = Rc::new(RefCell::new(String::new()));

    {
        let mut view = h.view.borrow_mut();
        view.set_caret_to_element("a");
        view.insert_content_at_selection("<b>new</b> ");
        let sink = received.clone();
        view.get_content(move |c| *sink.borrow_mut() = c.to_owned());
    }
    h.pump();

    insta::assert_snapshot!(received.borrow().as_str(), @r#"head<p id="a"><b>new</b> x</p>tail"#);
}

#[test]
fn test_caret_report_reaches_listener_scaled() {
    let config = HostConfig {
        density_dpi: 320.0,
        ..HostConfig::default()
    };
    let h = Harness::new("hello", config);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    h.view
        .borrow_mut()
        .set_caret_listener(move |p| sink.borrow_mut().push(p));

    // Memory layout: origin (8, 8), 8px per character.
    h.bridge.environment().place_caret(3);
    h.bridge.report_caret_position();

    assert_eq!(*seen.borrow(), vec![Point::new(64, 16)]);
}

#[test]
fn test_caret_out_of_view_scrolls_parent() {
    let h = Harness::new("hello", HostConfig::default());
    let scroll = FakeScroll::new(ViewRect::new(0, 0, 1080, 1920), Point::new(0, 2000));
    h.view.borrow_mut().set_scroll_parent(scroll.clone());

    h.bridge.environment().place_caret(3);
    h.bridge.report_caret_position();

    assert_eq!(*scroll.scrolled.borrow(), vec![Point::new(32, 2008)]);
}

#[test]
fn test_caret_in_view_does_not_scroll() {
    let h = Harness::new("hello", HostConfig::default());
    let scroll = FakeScroll::new(ViewRect::new(0, 0, 1080, 1920), Point::new(0, 300));
    h.view.borrow_mut().set_scroll_parent(scroll.clone());

    h.bridge.environment().place_caret(1);
    h.bridge.report_caret_position();

    assert!(scroll.scrolled.borrow().is_empty());
}

#[test]
fn test_nested_view_offset_is_accumulated() {
    let h = Harness::new("hello", HostConfig::default());
    // View sits 1500px into a panel that sits 500px into the scroll content.
    let scroll = FakeScroll::nested(
        ViewRect::new(0, 0, 1080, 1920),
        vec![Point::new(0, 1500), Point::new(16, 500)],
    );
    h.view.borrow_mut().set_scroll_parent(scroll.clone());

    h.bridge.environment().place_caret(3);
    h.bridge.report_caret_position();

    assert_eq!(*scroll.scrolled.borrow(), vec![Point::new(48, 2008)]);
}

#[test]
fn test_content_listener_can_insert_through_the_view() {
    let h = Harness::new("ab", HostConfig::default());
    h.bridge.environment().place_caret(1);

    let handle = h.view.clone();
    h.view
        .borrow_mut()
        .get_content(move |c| handle.borrow_mut().insert_content_at_selection(&c.to_uppercase()));
    h.pump();
    // The listener queued an insert of the fetched content.
    h.pump();

    assert_eq!(h.bridge.environment().content(), "aABb");
}
