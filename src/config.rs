//! Compiled-in settings for placeholder generation
//!
//! Everything the generator needs (output locations, theme color and the
//! size table) lives in [`Config`] so it can be passed explicitly to the
//! driver instead of being read from globals.

use anyhow::{Context, Result};
use image::Rgba;
use serde::Deserialize;
use std::{path::PathBuf, str::FromStr};

/// Theme color of the placeholder icons (sky blue)
pub const THEME_COLOR: &str = "#0ea5e9";

/// Output root, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "build";

pub const ICONS_DIR: &str = "icons";
pub const MAIN_ICON_NAME: &str = "icon.png";
pub const MAIN_ICON_SIZE: u32 = 512;

const ICON_SIZES_JSON: &str = r#"
[
  { "size": 16, "label": "16x16" },
  { "size": 32, "label": "32x32" },
  { "size": 48, "label": "48x48" },
  { "size": 64, "label": "64x64" },
  { "size": 128, "label": "128x128" },
  { "size": 256, "label": "256x256" },
  { "size": 512, "label": "512x512" },
  { "size": 1024, "label": "1024x1024" }
]
"#;

/// One square icon to generate inside the icons directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconSize {
    /// Width and height in pixels
    pub size: u32,
    /// File stem, written as `<label>.png`
    pub label: String,
}

impl IconSize {
    pub fn new(size: u32, label: impl Into<String>) -> Self {
        Self {
            size,
            label: label.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.png", self.label)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base output directory; the main icon is written directly into it
    pub output: PathBuf,
    /// Name of the subdirectory holding the sized icons
    pub icons_dir: String,
    /// Fill color of every generated image
    pub color: Rgba<u8>,
    pub main_icon_size: u32,
    pub main_icon_name: String,
    /// Sized icons, generated in this order
    pub sizes: Vec<IconSize>,
}

impl Config {
    /// The compiled-in placeholder settings: `build/icon.png` at 512x512 and
    /// eight sized icons from 16x16 to 1024x1024 under `build/icons`, all
    /// filled with [`THEME_COLOR`].
    pub fn placeholder() -> Result<Self> {
        let sizes: Vec<IconSize> =
            serde_json::from_str(ICON_SIZES_JSON).context("Failed to parse icon size table")?;

        Ok(Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            icons_dir: ICONS_DIR.to_string(),
            color: parse_color(THEME_COLOR)?,
            main_icon_size: MAIN_ICON_SIZE,
            main_icon_name: MAIN_ICON_NAME.to_string(),
            sizes,
        })
    }

    /// Redirect all output under a different root directory
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn with_sizes(mut self, sizes: Vec<IconSize>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn icons_path(&self) -> PathBuf {
        self.output.join(&self.icons_dir)
    }

    pub fn main_icon_path(&self) -> PathBuf {
        self.output.join(&self.main_icon_name)
    }

    pub fn icon_path(&self, icon: &IconSize) -> PathBuf {
        self.icons_path().join(icon.file_name())
    }

    /// Every file the generator writes, with its square size, in write order
    pub fn expected_outputs(&self) -> Vec<(PathBuf, u32)> {
        std::iter::once((self.main_icon_path(), self.main_icon_size))
            .chain(
                self.sizes
                    .iter()
                    .map(|icon| (self.icon_path(icon), icon.size)),
            )
            .collect()
    }
}

/// Parse a CSS color string such as `#0ea5e9` into RGBA
pub fn parse_color(color: &str) -> Result<Rgba<u8>> {
    let srgb = css_color::Srgb::from_str(color)
        .map_err(|_| anyhow::anyhow!("Invalid CSS color: {}", color))?;

    Ok(Rgba([
        to_channel(srgb.red),
        to_channel(srgb.green),
        to_channel(srgb.blue),
        to_channel(srgb.alpha),
    ]))
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.).round() as u8
}
