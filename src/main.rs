use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use flagged_bst::{import_rows, init_tracing, load_csv, Coordinator, SearchReport};

fn main() -> Result<()> {
    init_tracing(&env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()));

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let Some(csv_path) = args.get(2) else {
                bail!("usage: flagged-bst import <file.csv> [transaction-id ...]");
            };
            run_import(Path::new(csv_path), &args[3..])?;
        }
        Some("demo") | None => run_demo(),
        Some(other) => bail!("unknown command: {} (expected `import` or `demo`)", other),
    }

    Ok(())
}

fn run_import(csv_path: &Path, search_ids: &[String]) -> Result<()> {
    println!("🚩 Flagged Transactions - CSV → BST + Linear Store");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load CSV
    println!("\n📂 Loading CSV...");
    let rows = load_csv(csv_path)?;
    println!("✓ Read {} rows from {:?}", rows.len(), csv_path);

    // 2. Insert into both containers
    let mut coordinator = Coordinator::new();
    let summary = import_rows(&mut coordinator, rows);
    println!("✓ Inserted {} rows ({} rejected for blank ids)", summary.inserted, summary.rejected);
    println!(
        "✓ Index holds {} transactions, tree height {}",
        coordinator.size(),
        coordinator.index().height()
    );

    // 3. Sorted listing
    println!("\n📋 In-order listing:");
    for record in coordinator.list_all() {
        println!(
            "   {:<16} {:>12.2}  {}",
            record.transaction_id,
            record.amount,
            record.reason.as_deref().unwrap_or("-")
        );
    }

    // 4. Requested lookups
    if !search_ids.is_empty() {
        println!("\n🔍 Lookups:");
        for id in search_ids {
            print_report(id, &coordinator.search(id));
        }
    }

    Ok(())
}

fn run_demo() {
    println!("🌳 Flagged Transactions - BST walkthrough");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut coordinator = Coordinator::new();
    for (id, amount) in [
        ("TXN100", 250.0),
        ("TXN050", 19.99),
        ("TXN150", 1200.5),
        ("TXN120", 75.0),
        ("TXN180", 940.0),
        ("TXN030", 5.0),
    ] {
        coordinator.insert(id, amount, Some("demo".to_string()));
    }

    println!("\n📋 In-order: {}", ids(&coordinator).join(", "));

    println!("\n🔍 Lookups:");
    for id in ["TXN100", "TXN180", "TXN999"] {
        print_report(id, &coordinator.search(id));
    }

    println!("\n🗑️  Deletes:");
    for id in ["TXN030", "TXN050", "TXN100", "TXN999"] {
        let outcome = coordinator.delete(id);
        let case = outcome.case.map(|c| c.as_str()).unwrap_or("none");
        println!("   {:<8} deleted={:<5} case={}", id, outcome.deleted, case);
    }
    println!("   In-order now: {}", ids(&coordinator).join(", "));

    // Ascending ids degrade the tree into a chain
    println!("\n📉 Ascending inserts (no rebalancing):");
    let mut chain = Coordinator::new();
    for id in ["A", "B", "C", "D"] {
        chain.insert(id, 1.0, None);
    }
    println!("   Height {} for {} nodes", chain.index().height(), chain.size());
    print_report("D", &chain.search("D"));
}

fn ids(coordinator: &Coordinator) -> Vec<String> {
    coordinator
        .list_all()
        .into_iter()
        .map(|r| r.transaction_id)
        .collect()
}

fn print_report(id: &str, report: &SearchReport) {
    println!(
        "   {:<8} found={:<5} bst={:>3}  list={:>3}  (list size {})",
        id,
        report.found,
        report.ordered_comparisons,
        report.linear_comparisons,
        report.linear_store_size
    );
}
