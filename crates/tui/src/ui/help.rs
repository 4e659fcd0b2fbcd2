use crate::ui::{widgets::fit, ColorScheme, Rect};
use crossterm::{
    cursor,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::{self, Write};

const HELP_LINES: [&str; 17] = [
    "                  SENSMON HELP",
    "",
    "Navigation:",
    "  ↑/k, ↓/j         Scroll the sensor list",
    "  Page Up/Down     Scroll by a page",
    "  Home/End         Jump to top/bottom",
    "",
    "Readings:",
    "  r                Reset min/max to current values",
    "",
    "Display:",
    "  u                Toggle °C / °F",
    "  t                Toggle dark / light theme",
    "",
    "Other:",
    "  ?                Show this help",
    "  q, Ctrl+C        Quit application",
];

/// Help overlay widget
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render<W: Write>(
        &self,
        writer: &mut W,
        area: Rect,
        colors: &ColorScheme,
    ) -> io::Result<()> {
        let popup_area = area.centered(56, HELP_LINES.len() as u16 + 3, 2);
        if popup_area.width < 3 || popup_area.height < 3 {
            return Ok(());
        }

        for y in popup_area.y..popup_area.bottom() {
            writer.queue(cursor::MoveTo(popup_area.x, y))?;
            writer.queue(SetBackgroundColor(colors.background))?;
            writer.queue(SetForegroundColor(colors.foreground))?;
            writer.queue(Print(" ".repeat(popup_area.width as usize)))?;
        }

        self.render_border(writer, popup_area, colors)?;

        let content_area = popup_area.inner(1);
        for (i, line) in HELP_LINES.iter().enumerate().take(content_area.height as usize) {
            writer.queue(cursor::MoveTo(content_area.x, content_area.y + i as u16))?;

            let color = if i == 0 {
                colors.accent
            } else if line.ends_with(':') {
                colors.table_header
            } else {
                colors.foreground
            };
            writer.queue(SetForegroundColor(color))?;
            writer.queue(Print(fit(line, content_area.width as usize)))?;
        }

        let hint = "Press ? to close";
        if popup_area.width as usize > hint.len() + 2 {
            writer.queue(cursor::MoveTo(
                popup_area.right() - hint.len() as u16 - 2,
                popup_area.bottom() - 1,
            ))?;
            writer.queue(SetForegroundColor(colors.muted))?;
            writer.queue(Print(hint))?;
        }

        Ok(())
    }

    fn render_border<W: Write>(
        &self,
        writer: &mut W,
        area: Rect,
        colors: &ColorScheme,
    ) -> io::Result<()> {
        writer.queue(SetForegroundColor(colors.border))?;
        writer.queue(SetBackgroundColor(colors.background))?;

        let horizontal = "─".repeat(area.width as usize - 2);

        writer.queue(cursor::MoveTo(area.x, area.y))?;
        writer.queue(Print(format!("┌{}┐", horizontal)))?;

        for y in area.y + 1..area.bottom() - 1 {
            writer.queue(cursor::MoveTo(area.x, y))?;
            writer.queue(Print("│"))?;
            writer.queue(cursor::MoveTo(area.right() - 1, y))?;
            writer.queue(Print("│"))?;
        }

        writer.queue(cursor::MoveTo(area.x, area.bottom() - 1))?;
        writer.queue(Print(format!("└{}┘", horizontal)))?;

        Ok(())
    }
}
