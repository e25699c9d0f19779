//! The host-side editable view.
//!
//! `EditableView` owns nothing platform specific: it renders the page, turns
//! requests into script calls on a [`ScriptTransport`], and handles the two
//! notifications the page sends back. [`SharedView`] is the shared handle the
//! page's notifications are delivered to.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use caret_bridge_core::HostPort;

use crate::config::HostConfig;
use crate::page::PageTemplate;
use crate::script::HostCall;
use crate::units::scale_to_device;
use crate::viewport::{Point, ViewRect, caret_scroll_target, offset_in_ancestor};

/// Delivers pages and script calls to the embedded web view.
pub trait ScriptTransport {
    /// Load a full HTML page, resolving relative asset paths against `base_url`.
    fn load_page(&self, base_url: &str, html: &str);

    /// Load a `javascript:` URL in the current page.
    fn load_url(&self, url: &str);

    fn call(&self, call: &HostCall) {
        self.load_url(&call.to_url());
    }
}

/// A vertical scroll container the view is nested in.
pub trait ScrollContainer {
    /// Currently visible region, in the container's content coordinates.
    fn visible_rect(&self) -> ViewRect;

    /// Offset of the view in its parent, then of that parent in its own
    /// parent, and so on up to (excluding) this container.
    fn offset_chain(&self) -> Vec<Point>;

    /// Position of the editable view inside the container's content.
    fn view_offset(&self) -> Point {
        offset_in_ancestor(self.offset_chain())
    }

    fn smooth_scroll_to(&self, target: Point);
}

type ContentListener = Box<dyn FnMut(&str)>;
type CaretListener = Box<dyn FnMut(Point)>;

pub struct EditableView<T> {
    transport: T,
    config: HostConfig,
    page: PageTemplate,
    content_listener: Option<ContentListener>,
    caret_listener: Option<CaretListener>,
    scroll_parent: Option<Rc<dyn ScrollContainer>>,
}

impl<T: ScriptTransport> EditableView<T> {
    pub fn new(transport: T, config: HostConfig) -> Self {
        let page = PageTemplate::new(&config);
        Self {
            transport,
            config,
            page,
            content_listener: None,
            caret_listener: None,
            scroll_parent: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Set the container's minimum height in device pixels.
    ///
    /// Applies to pages loaded afterwards.
    pub fn set_content_min_height(&mut self, px: u32) {
        self.page = self.page.clone().with_min_height_px(px);
    }

    /// Load a fresh page holding `content`.
    pub fn set_content(&mut self, content: &str) {
        let html = self.page.render(content);
        tracing::debug!(
            target: "caret_bridge::host",
            len = content.len(),
            "loading editable page"
        );
        self.transport.load_page(&self.config.asset_base_url, &html);
    }

    /// Request the current content. `listener` receives it once the page
    /// answers, and replaces any previously registered listener.
    pub fn get_content(&mut self, listener: impl FnMut(&str) + 'static) {
        self.content_listener = Some(Box::new(listener));
        self.transport.call(&HostCall::GetContent);
    }

    pub fn insert_content_at_selection(&mut self, content: &str) {
        self.transport
            .call(&HostCall::InsertContent(content.to_owned()));
    }

    pub fn set_caret_to_element(&mut self, element_id: &str) {
        self.transport
            .call(&HostCall::SetCaretToElement(element_id.to_owned()));
    }

    /// Receive caret positions in device pixels after every key-up.
    pub fn set_caret_listener(&mut self, listener: impl FnMut(Point) + 'static) {
        self.caret_listener = Some(Box::new(listener));
    }

    /// Nest the view in a scroll container that should follow the caret.
    pub fn set_scroll_parent(&mut self, parent: impl ScrollContainer + 'static) {
        self.scroll_parent = Some(Rc::new(parent));
    }

    /// Content arrived from the page. `None` is treated as empty.
    pub fn on_content_received(&mut self, content: Option<&str>) {
        let content = content.unwrap_or("");
        match self.content_listener.as_mut() {
            Some(listener) => listener(content),
            None => no_content_listener(),
        }
    }

    /// Caret moved. `x` and `y` are CSS pixels; returns the position in
    /// device pixels.
    pub fn on_caret_position(&mut self, x: f64, y: f64) -> Point {
        let caret = self.device_point(x, y);
        if let Some(listener) = self.caret_listener.as_mut() {
            listener(caret);
        }
        if let Some((parent, target)) = self.scroll_target(caret) {
            scroll_parent_to(parent.as_ref(), target);
        }
        caret
    }

    fn device_point(&self, x: f64, y: f64) -> Point {
        let density = self.config.density();
        Point::new(scale_to_device(x, density), scale_to_device(y, density))
    }

    fn scroll_target(&self, caret: Point) -> Option<(Rc<dyn ScrollContainer>, Point)> {
        let parent = self.scroll_parent.clone()?;
        let threshold = self.config.line_height_threshold_px();
        let target =
            caret_scroll_target(caret, parent.view_offset(), parent.visible_rect(), threshold)?;
        Some((parent, target))
    }
}

fn no_content_listener() {
    tracing::debug!(target: "caret_bridge::host", "content received with no listener");
}

fn scroll_parent_to(parent: &dyn ScrollContainer, target: Point) {
    tracing::debug!(
        target: "caret_bridge::host",
        x = target.x,
        y = target.y,
        "scrolling caret into view"
    );
    parent.smooth_scroll_to(target);
}

/// Shared handle to an [`EditableView`], and the host port the page reports to.
///
/// Listeners and the scroll container run with the view released, so they may
/// call back into the same handle.
pub struct SharedView<T>(Rc<RefCell<EditableView<T>>>);

impl<T> Clone for SharedView<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ScriptTransport> SharedView<T> {
    pub fn new(view: EditableView<T>) -> Self {
        Self(Rc::new(RefCell::new(view)))
    }

    pub fn borrow(&self) -> Ref<'_, EditableView<T>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, EditableView<T>> {
        self.0.borrow_mut()
    }
}

impl<T: ScriptTransport> HostPort for SharedView<T> {
    fn on_caret_position(&self, x: f64, y: f64) {
        let (caret, listener) = {
            let mut view = self.0.borrow_mut();
            (view.device_point(x, y), view.caret_listener.take())
        };

        if let Some(mut listener) = listener {
            listener(caret);
            // Keep it unless the listener registered a replacement.
            let mut view = self.0.borrow_mut();
            if view.caret_listener.is_none() {
                view.caret_listener = Some(listener);
            }
        }

        let scroll = self.0.borrow().scroll_target(caret);
        if let Some((parent, target)) = scroll {
            scroll_parent_to(parent.as_ref(), target);
        }
    }

    fn on_content_fetched(&self, content: &str) {
        let listener = self.0.borrow_mut().content_listener.take();
        let Some(mut listener) = listener else {
            no_content_listener();
            return;
        };

        listener(content);
        let mut view = self.0.borrow_mut();
        if view.content_listener.is_none() {
            view.content_listener = Some(listener);
        }
    }
}
