use anyhow::Result;
use placeholder_icons::{icon_gen, Config};

fn main() -> Result<()> {
    let config = Config::placeholder()?;

    icon_gen::generate_placeholders(&config)?;
    Ok(())
}
