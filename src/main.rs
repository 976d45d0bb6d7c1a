//! Ledger transfer engine CLI
//!
//! Command-line front end for accounts, deposits and transfers stored in a
//! SQLite database.
//!
//! # Usage
//!
//! ```bash
//! ledger create-account alice --currency USD --balance 100 > account.csv
//! ledger transfer 1 2 30 --currency USD --timeout-ms 500 > transfer.csv
//! ledger list-entries 1 --page 1 --page-size 20 > entries.csv
//! ledger --reject-overdraft apply transfers.csv --max-concurrent 8 > results.csv
//! ```
//!
//! Results are written to stdout as CSV; logs go to stderr (`RUST_LOG` or
//! `--log-level`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid request, missing record, storage failure, unreadable file)

use ledger_transfer_engine::cli;
use ledger_transfer_engine::core::Bank;
use ledger_transfer_engine::db::Database;
use ledger_transfer_engine::logging::init_logging;
use std::process;

fn main() {
    let args = cli::parse_args();
    init_logging(&args.log_level);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    let db_config = args.to_database_config();
    let engine_config = args.to_engine_config();

    let result = runtime.block_on(async {
        let db = Database::connect(&db_config)
            .await
            .map_err(|e| e.to_string())?;
        let bank = Bank::new(db.clone(), engine_config);

        let mut output = std::io::stdout();
        let outcome = cli::execute(&bank, args.command, &mut output).await;
        db.close().await;
        outcome
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
