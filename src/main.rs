use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = patchplan::app::run_cli() {
        eprintln!("{} {e}", "[ERR]".red().bold());
        exit(1);
    }
}
