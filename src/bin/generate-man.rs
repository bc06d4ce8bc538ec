// Render the dubsim man page: generate-man [OUT_DIR] (default: ./man)

use clap::CommandFactory;
use dubsim::cli::Cli;
use std::fs;
use std::path::PathBuf;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&out_dir)?;

    let man = clap_mangen::Man::new(Cli::command());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    let path = out_dir.join("dubsim.1");
    fs::write(&path, buffer)?;
    println!("Wrote {}", path.display());
    Ok(())
}
