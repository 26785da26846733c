//! CLI smoke entry point.
//!
//! Prints the core version and resolved database path. With a numeric user
//! id argument, also prints how many dashboards that user owns.

use dashboard_api::{core_version, DashboardResolver, User};
use std::process::ExitCode;

fn main() -> ExitCode {
    let resolver = DashboardResolver::from_env();
    println!("dashboard_core version={}", core_version());
    println!("dashboard_db path={}", resolver.db_path().display());

    let Some(raw) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    let user_id = match raw.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            eprintln!("user id must be an integer, got `{raw}`");
            return ExitCode::FAILURE;
        }
    };

    match resolver.dashboards(&User::new(user_id)) {
        Ok(dashboards) => {
            println!("user_id={user_id} dashboards={}", dashboards.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("listing dashboards failed: {err}");
            ExitCode::FAILURE
        }
    }
}
