use crossterm::style::{Color, Stylize};
use serde::{Serialize, Serializer};
use std::fmt::Write;

use crate::color::Rgb;
use crate::device::Device;
use crate::error::Result;

pub const HEADERS: [&str; 9] = [
    "Name",
    "MAC",
    "Firmware",
    "Online",
    "Power",
    "Brightness",
    "Temperature",
    "Color",
    "Capabilities",
];

const TEMPERATURE_COL: usize = 6;
const COLOR_COL: usize = 7;

/// A device as shown in the table. Optional attributes the device does not
/// report stay empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub mac: String,
    pub firmware: String,
    pub online: bool,
    pub power: Option<bool>,
    pub brightness: Option<i32>,
    pub temperature: Option<u32>,
    #[serde(serialize_with = "as_css")]
    pub swatch: Option<Rgb>,
    #[serde(serialize_with = "as_css")]
    pub color: Option<Rgb>,
    pub capabilities: Vec<String>,
}

fn as_css<S: Serializer>(c: &Option<Rgb>, s: S) -> std::result::Result<S::Ok, S::Error> {
    match c {
        Some(c) => s.serialize_str(&c.css()),
        None => s.serialize_none(),
    }
}

impl Row {
    pub fn new(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            mac: device.mac.clone(),
            firmware: device.firmware.clone(),
            online: device.online,
            power: device.power,
            brightness: device.brightness,
            temperature: device.temperature,
            swatch: device.swatch(),
            color: device.color.map(Rgb::from),
            capabilities: device.capabilities.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn cells(&self) -> [String; 9] {
        let opt = |v: Option<String>| v.unwrap_or_default();
        [
            self.name.clone(),
            self.mac.clone(),
            self.firmware.clone(),
            self.online.to_string(),
            opt(self.power.map(|p| p.to_string())),
            opt(self.brightness.map(|b| b.to_string())),
            opt(self.temperature.map(|t| t.to_string())),
            opt(self.color.map(|c| c.css())),
            self.capabilities.join(","),
        ]
    }

    fn background(&self, col: usize) -> Option<Rgb> {
        match col {
            TEMPERATURE_COL => self.swatch,
            COLOR_COL => self.color,
            _ => None,
        }
    }
}

pub fn rows(devices: &[Device]) -> Vec<Row> {
    devices.iter().map(Row::new).collect()
}

/// Lay the rows out as a fixed-width text table. With `swatches` the
/// temperature and color cells get a 24-bit background of their color.
pub fn render_table(rows: &[Row], swatches: bool) -> String {
    let cells: Vec<[String; 9]> = rows.iter().map(Row::cells).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());

    for (row, texts) in rows.iter().zip(&cells) {
        let mut line = String::new();
        for (col, (text, w)) in texts.iter().zip(widths).enumerate() {
            if col > 0 {
                line.push_str("  ");
            }
            let padded = format!("{text:<w$}");
            match row.background(col).filter(|_| swatches) {
                Some(bg) => {
                    let _ = write!(line, "{}", paint(padded, bg));
                }
                None => line.push_str(&padded),
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

pub fn render_json(devices: &[Device]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&rows(devices))?)
}

fn paint(text: String, bg: Rgb) -> crossterm::style::StyledContent<String> {
    // keep the label readable on both pale and saturated backgrounds
    let luma = 0.299 * bg.r as f64 + 0.587 * bg.g as f64 + 0.114 * bg.b as f64;
    let fg = if luma > 140.0 { Color::Black } else { Color::White };
    text.on(Color::Rgb {
        r: bg.r,
        g: bg.g,
        b: bg.b,
    })
    .with(fg)
}
