//! Keeping the caret visible when the editable view sits inside a scroll
//! container.
//!
//! All coordinates are device pixels.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The visible part of a scroll container, in its own content coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ViewRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Offset of a view inside an ancestor.
///
/// `chain` holds the (left, top) offset of the view within its parent, then
/// of that parent within its own parent, and so on up to (but excluding) the
/// ancestor.
pub fn offset_in_ancestor<I>(chain: I) -> Point
where
    I: IntoIterator<Item = Point>,
{
    chain.into_iter().fold(Point::default(), |acc, p| Point {
        x: acc.x + p.x,
        y: acc.y + p.y,
    })
}

/// Where to scroll so the caret becomes visible, or `None` if it already is.
///
/// `caret` is relative to the view, `view_offset` places the view inside the
/// scroll container. A caret counts as visible when the line below it
/// (`threshold` px) starts inside the visible rect.
pub fn caret_scroll_target(
    caret: Point,
    view_offset: Point,
    visible: ViewRect,
    threshold: i32,
) -> Option<Point> {
    let target = Point::new(caret.x + view_offset.x, caret.y + view_offset.y);
    let line = target.y + threshold;
    if visible.top < line && visible.bottom > line {
        None
    } else {
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_accumulates_chain() {
        let offset = offset_in_ancestor([Point::new(4, 120), Point::new(16, 300), Point::new(0, 8)]);
        assert_eq!(offset, Point::new(20, 428));
        assert_eq!(offset_in_ancestor(std::iter::empty::<Point>()), Point::default());
    }

    #[test]
    fn test_visible_caret_needs_no_scroll() {
        let visible = ViewRect::new(0, 0, 1080, 1920);
        assert_eq!(
            caret_scroll_target(Point::new(50, 100), Point::new(0, 200), visible, 20),
            None
        );
    }

    #[test]
    fn test_caret_below_viewport() {
        let visible = ViewRect::new(0, 0, 1080, 1920);
        assert_eq!(
            caret_scroll_target(Point::new(50, 1800), Point::new(0, 200), visible, 20),
            Some(Point::new(50, 2000))
        );
    }

    #[test]
    fn test_caret_above_viewport() {
        let visible = ViewRect::new(0, 1000, 1080, 2920);
        assert_eq!(
            caret_scroll_target(Point::new(10, 100), Point::new(0, 200), visible, 20),
            Some(Point::new(10, 300))
        );
    }

    #[test]
    fn test_visibility_boundaries_are_exclusive() {
        let visible = ViewRect::new(0, 100, 500, 500);
        // line == top
        assert!(caret_scroll_target(Point::new(0, 80), Point::default(), visible, 20).is_some());
        // line == bottom
        assert!(caret_scroll_target(Point::new(0, 480), Point::default(), visible, 20).is_some());
        assert!(caret_scroll_target(Point::new(0, 81), Point::default(), visible, 20).is_none());
    }
}
