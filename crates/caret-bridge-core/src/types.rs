//! Geometry types shared between the bridge and its environments.
//!
//! All values are CSS pixels as reported by the document environment. Scaling
//! to device pixels happens on the host side.

/// Viewport-relative box of a node, as returned by `getBoundingClientRect()`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Current scroll position of the document.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Page-absolute point (viewport position plus scroll).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Top-left corner of `rect` translated into page coordinates.
    pub fn from_client(rect: ClientRect, scroll: ScrollOffset) -> Self {
        Self {
            x: rect.left + scroll.x,
            y: rect.top + scroll.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_point_adds_scroll() {
        let rect = ClientRect::new(12.0, 40.0, 0.0, 16.0);
        let point = PagePoint::from_client(rect, ScrollOffset::new(0.0, 300.0));
        assert_eq!(point, PagePoint::new(12.0, 340.0));
    }

    #[test]
    fn test_page_point_without_scroll() {
        let rect = ClientRect::new(3.5, 7.25, 0.0, 0.0);
        let point = PagePoint::from_client(rect, ScrollOffset::default());
        assert_eq!(point, PagePoint::new(3.5, 7.25));
    }
}
