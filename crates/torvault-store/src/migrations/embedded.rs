//! Migrations embedded at compile time using include_str!

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_backup_runs",
            sql: include_str!("../../migrations/001_backup_runs.sql"),
        },
        Migration {
            id: "002_run_payloads",
            sql: include_str!("../../migrations/002_run_payloads.sql"),
        },
    ]
}
