//! Layout helpers shared by the UI components.

use ratatui::layout::{Constraint, Layout, Rect};

/// A rectangle `percent_x` wide and `percent_y` tall, centered in `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

/// One-row popup of `width` columns placed to the right of `anchor`,
/// shifted and clipped so it stays inside `bounds`.
pub fn tooltip_rect(anchor: Rect, width: u16, bounds: Rect) -> Option<Rect> {
    let x = anchor.right();
    if x >= bounds.right() || anchor.y >= bounds.bottom() {
        return None;
    }
    let width = width.min(bounds.right() - x);
    let y = anchor.y + anchor.height / 2;
    Some(Rect::new(x, y.min(bounds.bottom() - 1), width, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(80, 70, parent);
        assert_eq!(centered.width, 80);
        assert_eq!(centered.x, 10);
        assert!(parent.contains(centered.as_position()));
    }

    #[test]
    fn tooltip_is_clipped_to_bounds() {
        let bounds = Rect::new(0, 0, 20, 10);
        let anchor = Rect::new(0, 2, 9, 3);
        assert_eq!(tooltip_rect(anchor, 30, bounds), Some(Rect::new(9, 3, 11, 1)));
        assert_eq!(tooltip_rect(Rect::new(15, 2, 5, 3), 4, bounds), None);
    }
}
