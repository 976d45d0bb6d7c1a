//! Transfer throughput benchmarks
//!
//! Compares single transfers against concurrent batches on a throwaway SQLite
//! database using the divan benchmarking framework.
//!
//! ```bash
//! cargo bench
//! ```

use divan::Bencher;
use ledger_transfer_engine::core::{apply_transfers, Bank, BatchConfig, EngineConfig};
use ledger_transfer_engine::db::{Database, DatabaseConfig};
use ledger_transfer_engine::io::CsvTransferRecord;
use ledger_transfer_engine::types::Currency;
use tempfile::TempDir;
use tokio::runtime::Runtime;

const ACCOUNTS: i64 = 10;

fn main() {
    divan::main();
}

fn setup() -> (Runtime, TempDir, Bank) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let bank = runtime.block_on(async {
        let db = Database::connect(&DatabaseConfig::for_path(&dir.path().join("bench.db")))
            .await
            .expect("Failed to open database");
        let bank = Bank::new(db, EngineConfig::default());
        for i in 0..ACCOUNTS {
            bank.create_account(&format!("account-{i}"), Currency::Usd, 1_000_000)
                .await
                .expect("Failed to create account");
        }
        bank
    });
    (runtime, dir, bank)
}

fn ring(len: usize) -> Vec<CsvTransferRecord> {
    (0..len as i64)
        .map(|i| CsvTransferRecord {
            from: i % ACCOUNTS + 1,
            to: (i + 1) % ACCOUNTS + 1,
            amount: 1,
        })
        .collect()
}

/// One transfer per iteration
#[divan::bench]
fn single_transfer(bencher: Bencher) {
    let (runtime, _dir, bank) = setup();

    bencher.bench_local(|| {
        runtime
            .block_on(bank.transfer(1, 2, 1))
            .expect("Transfer failed")
    });
}

/// 100 transfers per iteration with the given concurrency
#[divan::bench(args = [1, 4, 16])]
fn batch_of_100(bencher: Bencher, max_concurrent: usize) {
    let (runtime, _dir, bank) = setup();
    let config = BatchConfig::new(max_concurrent);

    bencher.bench_local(|| {
        let report = runtime.block_on(apply_transfers(&bank, ring(100), &config));
        assert!(report.failed.is_empty());
    });
}
