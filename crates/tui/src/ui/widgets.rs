use crate::ui::{ColorScheme, Rect};
use crate::view::Row;
use crossterm::{
    cursor,
    style::{Print, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use sensmon_core::{GpuStatus, MonitorSnapshot, TemperatureUnit};
use std::io::{self, Write};
use std::time::UNIX_EPOCH;

const COLUMN_HEADERS: [&str; 4] = ["Sensor", "Current", "Min", "Max"];

/// Pad or truncate `text` to exactly `width` characters
pub fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        format!("{:width$}", text, width = width)
    } else if width <= 3 {
        text.chars().take(width).collect()
    } else {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    }
}

/// Top bar with device and sensor counts
pub struct TopBar;

impl TopBar {
    pub fn render<W: Write>(
        &self,
        writer: &mut W,
        area: Rect,
        snapshot: Option<&MonitorSnapshot>,
        unit: TemperatureUnit,
        colors: &ColorScheme,
    ) -> io::Result<()> {
        if area.height == 0 {
            return Ok(());
        }

        writer.queue(cursor::MoveTo(area.x, area.y))?;
        writer.queue(SetForegroundColor(colors.accent))?;
        writer.queue(SetBackgroundColor(colors.background))?;

        let content = match snapshot {
            Some(snapshot) => {
                let secs = snapshot
                    .timestamp
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                format!(
                    "sensmon | {} devices | {} sensors | {} GPUs | {} | {:02}:{:02}:{:02}",
                    snapshot.devices.len(),
                    snapshot.sensor_count(),
                    snapshot.gpus.len(),
                    unit.symbol(),
                    (secs % 86400) / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
            None => "sensmon | waiting for first sample".to_string(),
        };

        writer.queue(Print(fit(&content, area.width as usize)))?;
        Ok(())
    }
}

/// Scrollable sensor tree with Current / Min / Max columns
pub struct SensorTable;

impl SensorTable {
    /// Rows visible below the header
    pub fn visible_rows(area: Rect) -> usize {
        (area.height as usize).saturating_sub(1)
    }

    pub fn render<W: Write>(
        &self,
        writer: &mut W,
        area: Rect,
        columns: [Rect; 4],
        rows: &[Row],
        start_index: usize,
        colors: &ColorScheme,
    ) -> io::Result<()> {
        if area.height == 0 {
            return Ok(());
        }

        writer.queue(SetBackgroundColor(colors.background))?;
        writer.queue(SetForegroundColor(colors.table_header))?;
        for (header, rect) in COLUMN_HEADERS.iter().zip(columns.iter()) {
            writer.queue(cursor::MoveTo(rect.x, area.y))?;
            writer.queue(Print(fit(header, rect.width as usize)))?;
        }

        let visible = Self::visible_rows(area);
        let start = start_index.min(rows.len());
        let shown = &rows[start..rows.len().min(start + visible)];
        let mut value_count = 0;

        for (row_idx, row) in shown.iter().enumerate() {
            let y = area.y + 1 + row_idx as u16;
            writer.queue(cursor::MoveTo(area.x, y))?;
            writer.queue(SetBackgroundColor(colors.background))?;

            match row {
                Row::Device(name) => {
                    writer.queue(SetForegroundColor(colors.device_heading))?;
                    writer.queue(Print(fit(name, area.width as usize)))?;
                }
                Row::Group(kind) => {
                    writer.queue(SetForegroundColor(colors.group_color(*kind)))?;
                    writer.queue(Print(fit(&format!("  {}", kind), area.width as usize)))?;
                }
                Row::Value { label, columns: values, celsius } => {
                    if value_count % 2 == 1 {
                        writer.queue(SetBackgroundColor(colors.table_row_alt))?;
                    }
                    value_count += 1;

                    writer.queue(SetForegroundColor(colors.foreground))?;
                    writer.queue(Print(fit(&format!("    {}", label), columns[0].width as usize)))?;

                    for (i, (value, rect)) in values.iter().zip(columns[1..].iter()).enumerate() {
                        let color = match celsius {
                            Some(c) if i == 0 => colors.temperature_color(*c),
                            _ => colors.foreground,
                        };
                        writer.queue(cursor::MoveTo(rect.x, y))?;
                        writer.queue(SetForegroundColor(color))?;
                        writer.queue(Print(fit(value, rect.width as usize)))?;
                    }
                }
            }
        }

        writer.queue(SetBackgroundColor(colors.background))?;
        writer.queue(SetForegroundColor(colors.foreground))?;
        let blank = " ".repeat(area.width as usize);
        for row_idx in shown.len()..visible {
            writer.queue(cursor::MoveTo(area.x, area.y + 1 + row_idx as u16))?;
            writer.queue(Print(&blank))?;
        }

        Ok(())
    }
}

/// Footer widget for keybind hints and GPU status
pub struct Footer;

impl Footer {
    pub fn render<W: Write>(
        &self,
        writer: &mut W,
        area: Rect,
        gpu_status: Option<&GpuStatus>,
        colors: &ColorScheme,
    ) -> io::Result<()> {
        if area.height == 0 {
            return Ok(());
        }

        let keybinds = "q:quit ↑↓:scroll r:reset u:°C/°F t:theme ?:help";
        let status = gpu_status.map(ToString::to_string).unwrap_or_default();
        let width = area.width as usize;
        let status_width = status.chars().count().min(width / 2);
        let keys_width = width - status_width;

        writer.queue(cursor::MoveTo(area.x, area.y))?;
        writer.queue(SetBackgroundColor(colors.background))?;
        writer.queue(SetForegroundColor(colors.muted))?;
        writer.queue(Print(fit(keybinds, keys_width)))?;

        if let Some(status_kind) = gpu_status {
            writer.queue(SetForegroundColor(colors.gpu_status_color(status_kind)))?;
            writer.queue(Print(fit(&status, status_width)))?;
        }

        Ok(())
    }
}
