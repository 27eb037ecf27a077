use clap::CommandFactory;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Render powertop2tuned.1 into the directory given as the first argument
/// (default `man/`).
fn main() -> io::Result<()> {
    let man_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&man_dir)?;

    let mut page = Vec::new();
    clap_mangen::Man::new(powertop2tuned::cli::Cli::command()).render(&mut page)?;

    let path = man_dir.join("powertop2tuned.1");
    fs::write(&path, page)?;
    println!("Generated {}", path.display());

    Ok(())
}
