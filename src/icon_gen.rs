use crate::{config::Config, png};
use anyhow::{Context, Result};
use image::Rgba;
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Write the main icon and every sized icon described by `config`.
///
/// Returns the written paths in the order they were created. Any failure
/// aborts the run; files written before the failure are left in place.
pub fn generate_placeholders(config: &Config) -> Result<Vec<PathBuf>> {
    // Ensure the output directories exist
    create_dir_all(&config.output)
        .with_context(|| format!("Can't create output directory {}", config.output.display()))?;
    let icons_dir = config.icons_path();
    create_dir_all(&icons_dir)
        .with_context(|| format!("Can't create icons directory {}", icons_dir.display()))?;

    let mut written = Vec::with_capacity(config.sizes.len() + 1);

    let size = config.main_icon_size;
    let main_icon = config.main_icon_path();
    save_png(&main_icon, size, config.color)?;
    println!("Created {} ({size}x{size})", config.main_icon_name);
    written.push(main_icon);

    for icon in &config.sizes {
        let output_path = config.icon_path(icon);
        save_png(&output_path, icon.size, config.color)?;
        println!("Created {}", icon.file_name());
        written.push(output_path);
    }

    println!("\n✓ All placeholder icons created successfully!");
    println!("Note: These are solid color placeholders. Replace with real icons for production.");

    Ok(written)
}

/// Encode a square solid-color PNG and write it to `path`
fn save_png(path: &Path, size: u32, color: Rgba<u8>) -> Result<()> {
    let data = png::encode(size, size, color)
        .with_context(|| format!("Failed to encode {}x{} PNG", size, size))?;

    let mut out_file = BufWriter::new(
        File::create(path)
            .with_context(|| format!("Failed to create PNG file {}", path.display()))?,
    );
    out_file
        .write_all(&data)
        .with_context(|| format!("Failed to write PNG {}", path.display()))?;
    out_file.flush()?;
    Ok(())
}

/// Outcome of checking one generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub path: PathBuf,
    pub expected_size: u32,
    /// Decoded dimensions, `None` when the file is missing or not a PNG
    pub dimensions: Option<(u32, u32)>,
    /// Every decoded pixel equals the configured color
    pub color_matches: bool,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.dimensions == Some((self.expected_size, self.expected_size)) && self.color_matches
    }
}

/// Decode every file `config` describes and compare it to what the generator
/// should have written. Unreadable files are reported, not treated as errors.
pub fn verify_placeholders(config: &Config) -> Vec<VerifyReport> {
    config
        .expected_outputs()
        .into_iter()
        .map(|(path, expected_size)| match image::open(&path) {
            Ok(img) => {
                let rgba_img = img.to_rgba8();
                VerifyReport {
                    dimensions: Some(rgba_img.dimensions()),
                    color_matches: rgba_img.pixels().all(|pixel| *pixel == config.color),
                    path,
                    expected_size,
                }
            }
            Err(_) => VerifyReport {
                path,
                expected_size,
                dimensions: None,
                color_matches: false,
            },
        })
        .collect()
}
