use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use expense_tracker::{CategoryName, Expense, ExpenseTitle, create_expense, initialize_db};

/// A utility for creating a test database for the REST API server of expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample expenses...");

    let sample_expenses = [
        ("Groceries", "Food", 84.20, date!(2025 - 09 - 27)),
        ("Lunch", "Food", 12.50, date!(2025 - 10 - 01)),
        ("Bus pass", "Transport", 45.00, date!(2025 - 10 - 01)),
        ("Rent", "Housing", 520.00, date!(2025 - 10 - 02)),
        ("Cinema", "Entertainment", 18.00, date!(2025 - 10 - 04)),
        ("Returned shoes", "Clothing", -60.00, date!(2025 - 10 - 06)),
        ("Taxi", "Transport", 23.75, date!(2025 - 10 - 09)),
    ];

    for (title, category, amount, date) in sample_expenses {
        create_expense(
            Expense::build(
                ExpenseTitle::new(title)?,
                CategoryName::new(category)?,
                amount,
                date,
            ),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
