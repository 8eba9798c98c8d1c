use std::path::Path;

use brant_config::AppConfig;
use brant_db::REGISTRY;

/// Print the startup banner with Ferris and config summary.
pub fn print_banner(host: &str, port: u16, config: &AppConfig, config_dir: &Path) {
    let version = env!("CARGO_PKG_VERSION");

    // Gather info
    let url = format!("http://{host}:{port}");
    let registered = format!("{} registered", REGISTRY.len());

    let shorten = |path: &Path| match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => path.to_string_lossy().replace(&home, "~"),
        _ => path.to_string_lossy().to_string(),
    };
    let db_display = shorten(&config.database_path());
    let dir_display = shorten(config_dir);

    // Layout
    let width = 70;
    let left_w = 33;
    let right_w = width - left_w - 3; // 3 for "│ " + "│"

    let title = format!("Brant v{version}");
    let title_dashes = width - 2 - title.len() - 5; // 2 for ╭╮, 5 for "─── " + " "
    let top = format!("╭─── {title} {}╮", "─".repeat(title_dashes));
    let bottom = format!("╰{}╯", "─".repeat(width - 2));

    let row = |l: &str, r: &str| format!("│ {:<left_w$}│  {:<right_w$}│", l, r);

    println!("{top}");
    println!("{}", row("", ""));
    println!("{}", row("  Welcome to Brant!", "Gateway"));
    println!("{}", row("", &url));
    println!("{}", row("      _~^~^~_", &"─".repeat(right_w - 2)));
    println!(
        "{}",
        row("  \\) /  o o  \\ (/", &format!("Database    {db_display}"))
    );
    println!(
        "{}",
        row("    '_   -   _'", &format!("Migrations  {registered}"))
    );
    println!(
        "{}",
        row("    / '-----' \\", "Endpoint    POST /api/migrate")
    );
    println!("{}", row("", ""));
    println!("{}", row("  Rust · Schema migrations", ""));
    println!(
        "{}",
        row(&format!("  {dir_display}"), "Press Ctrl+C to stop")
    );
    println!("{}", row("", ""));
    println!("{bottom}");
}
