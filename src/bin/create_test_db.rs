use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;

use paymock::{GenerateRequest, generate_transactions, initialize_db};

/// A utility for creating a test database for the paymock server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of transactions to generate, at most 1000.
    #[arg(long, short, default_value_t = 100)]
    count: u32,
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
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Generating {} transactions...", args.count);

    let request = GenerateRequest {
        count: args.count,
        days_back: 90,
        ..Default::default()
    };
    let transactions = generate_transactions(
        &request,
        OffsetDateTime::now_utc(),
        &mut rand::thread_rng(),
        &mut conn,
    )?;

    println!("Created {} transactions.", transactions.len());
    println!("Success!");

    Ok(())
}
