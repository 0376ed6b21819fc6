use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    run()
}

#[cfg(feature = "tui")]
fn run() -> Result<()> {
    use anyhow::Context;
    use expense_ledger::{db, ui};
    use std::path::Path;

    // One database file in the working directory, kept across runs
    let db_path = Path::new("expenses.db");
    let conn = db::open_database(db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    let mut app = ui::App::new(conn)?;
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run() -> Result<()> {
    eprintln!("UI mode not available!");
    eprintln!("  Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
