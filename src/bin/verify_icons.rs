use anyhow::Result;
use placeholder_icons::{config::DEFAULT_OUTPUT, icon_gen::verify_placeholders, Config};

fn main() -> Result<()> {
    let root = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let config = Config::placeholder()?.with_output(&root);

    println!("Checking placeholder icons in: {}", root);

    let reports = verify_placeholders(&config);
    let mut failed = 0;

    for report in &reports {
        match report.dimensions {
            _ if report.is_ok() => println!(
                "✓ {} ({}x{})",
                report.path.display(),
                report.expected_size,
                report.expected_size
            ),
            Some((width, height)) => {
                failed += 1;
                eprintln!(
                    "✗ {}: expected {}x{} filled with {:?}, found {}x{}{}",
                    report.path.display(),
                    report.expected_size,
                    report.expected_size,
                    config.color.0,
                    width,
                    height,
                    if report.color_matches {
                        ""
                    } else {
                        " with other colors"
                    }
                );
            }
            None => {
                failed += 1;
                eprintln!("✗ {}: missing or not a valid PNG", report.path.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} of {} placeholder icons failed verification",
            failed,
            reports.len()
        );
    }

    println!("\n✓ All {} placeholder icons verified", reports.len());
    Ok(())
}
