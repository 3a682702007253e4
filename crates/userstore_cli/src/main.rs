//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `userstore_core` linkage.
//! - Own the connection lifecycle the way an embedding process would:
//!   opened once here, released on every exit path when `main` returns.

use userstore_core::db::open_db_in_memory;
use userstore_core::{default_log_level, init_logging, SqliteUserRepository, UserService};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = std::env::temp_dir().join("userstore-logs");
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        // The probe still runs without file logging.
        eprintln!("logging disabled: {err}");
    }

    let conn = open_db_in_memory()?;
    let repo = SqliteUserRepository::try_new(&conn)?;
    let service = UserService::new(repo);

    let inserted = service.create_user(1, "John", "Doe")?;
    println!("inserted user id={}", inserted.id);

    let loaded = service.get_user(inserted.id)?;
    println!("loaded user {} {}", loaded.first_name, loaded.last_name);

    Ok(())
}
