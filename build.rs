//! Build script for the genre playlist curator.
//!
//! Copies the configuration templates from the crate root into the user's
//! local data directory, next to where the application looks for `.env` and
//! `playlists.toml`:
//! - Linux: `~/.local/share/genrefy/`
//! - macOS: `~/Library/Application Support/genrefy/`
//! - Windows: `%LOCALAPPDATA%/genrefy/`

use std::{env, fs, path::PathBuf};

const TEMPLATES: [&str; 2] = [".env.example", "playlists.example.toml"];

/// Copies every template that exists. A missing template only produces a
/// cargo warning; failing to create the directory or write a file is fatal.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    for template in TEMPLATES {
        println!("cargo:rerun-if-changed={}", template);
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("genrefy");
    fs::create_dir_all(&out_dir)?;

    for template in TEMPLATES {
        let source = manifest_dir.join(template);
        if source.is_file() {
            let contents = fs::read_to_string(&source)?;
            fs::write(out_dir.join(template), contents)?;
        } else {
            println!(
                "cargo:warning={} not found at {}",
                template,
                source.display()
            );
        }
    }

    Ok(())
}
