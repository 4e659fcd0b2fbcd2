/// Rectangle for layout calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_terminal_size() -> anyhow::Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        Ok(Self::new(0, 0, width, height))
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u16 {
        self.width.saturating_mul(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn inner(&self, margin: u16) -> Self {
        let doubled_margin = margin.saturating_mul(2);
        Self {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width: self.width.saturating_sub(doubled_margin),
            height: self.height.saturating_sub(doubled_margin),
        }
    }

    /// Centered rectangle of at most `width` x `height`, keeping `margin` free
    pub fn centered(&self, width: u16, height: u16, margin: u16) -> Self {
        let width = width.min(self.width.saturating_sub(margin * 2));
        let height = height.min(self.height.saturating_sub(margin * 2));
        Self::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }
}

/// Preferred width of each Current/Min/Max column
const VALUE_COLUMN_WIDTH: u16 = 16;
const MIN_LABEL_WIDTH: u16 = 12;

/// Layout manager for the TUI
pub struct Layout {
    terminal_rect: Rect,
}

impl Layout {
    pub fn new() -> anyhow::Result<Self> {
        let terminal_rect = Rect::from_terminal_size()?;
        Ok(Self { terminal_rect })
    }

    pub fn with_rect(terminal_rect: Rect) -> Self {
        Self { terminal_rect }
    }

    pub fn update_terminal_size(&mut self) -> anyhow::Result<()> {
        self.terminal_rect = Rect::from_terminal_size()?;
        Ok(())
    }

    pub fn terminal_rect(&self) -> Rect {
        self.terminal_rect
    }

    /// Title bar, sensor table, footer
    pub fn main_layout(&self) -> MainLayout {
        let rect = self.terminal_rect;

        let top_bar = Rect::new(rect.x, rect.y, rect.width, rect.height.min(1));
        let footer = Rect::new(
            rect.x,
            rect.bottom().saturating_sub(1).max(top_bar.bottom()),
            rect.width,
            rect.height.saturating_sub(1).min(1),
        );
        let table = Rect::new(
            rect.x,
            top_bar.bottom(),
            rect.width,
            footer.y.saturating_sub(top_bar.bottom()),
        );

        MainLayout { top_bar, table, footer }
    }

    /// Label column takes what the three value columns leave
    pub fn table_columns(&self, area: Rect) -> [Rect; 4] {
        let values_width = VALUE_COLUMN_WIDTH * 3;
        let value_width = if area.width >= values_width + MIN_LABEL_WIDTH {
            VALUE_COLUMN_WIDTH
        } else {
            area.width / 4
        };
        let label_width = area.width.saturating_sub(value_width * 3);

        let mut x = area.x;
        let mut columns = [Rect::new(0, 0, 0, 0); 4];
        for (i, width) in [label_width, value_width, value_width, value_width].into_iter().enumerate() {
            columns[i] = Rect::new(x, area.y, width, area.height);
            x = x.saturating_add(width);
        }
        columns
    }
}

#[derive(Debug, Clone)]
pub struct MainLayout {
    pub top_bar: Rect,
    pub table: Rect,
    pub footer: Rect,
}
