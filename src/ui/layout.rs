use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: side-by-side panels
    Narrow, // <100 cols: stacked panels
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    /// Direction for a pair of panels that sit next to each other when
    /// there is room.
    pub fn split_direction(&self) -> Direction {
        match self {
            LayoutTier::Wide => Direction::Horizontal,
            LayoutTier::Narrow => Direction::Vertical,
        }
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    /// Header is dropped (zero height) when `with_header` is false.
    pub fn new(area: Rect, with_header: bool) -> Self {
        let tier = LayoutTier::from_area(area);
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if with_header { 3 } else { 0 }),
                Constraint::Min(6),
                Constraint::Length(2),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            footer: vertical[2],
            tier,
        }
    }

    /// Two halves of `area`, side by side on wide terminals.
    pub fn halves(&self, area: Rect) -> (Rect, Rect) {
        let parts = Layout::default()
            .direction(self.tier.split_direction())
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        (parts[0], parts[1])
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

/// Popup rectangle centered in `area`, no larger than `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 7;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[Enter] Start", "[Tab] Next tab", "[Esc] Quit"], 32);
        assert_eq!(lines, vec!["  [Enter] Start  [Tab] Next tab", "  [Esc] Quit"]);
    }

    #[test]
    fn test_pack_hint_lines_skips_empty() {
        assert!(pack_hint_lines(&[], 40).is_empty());
        assert_eq!(pack_hint_lines(&["", "[q] Quit"], 40), vec!["  [q] Quit"]);
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 30, 5);
        let r = centered_rect(50, 50, area);
        assert_eq!(r, area);
    }

    #[test]
    fn test_layout_drops_header_on_auth() {
        let area = Rect::new(0, 0, 120, 40);
        let with = AppLayout::new(area, true);
        let without = AppLayout::new(area, false);
        assert_eq!(with.header.height, 3);
        assert_eq!(without.header.height, 0);
        assert_eq!(with.tier, LayoutTier::Wide);
    }
}
