//! Prints an `ADMIN_CREDENTIALS` entry for one operator.

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let mut args = env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("Usage: cargo run --bin hash-password <EMAIL> <PASSWORD>");
        std::process::exit(1);
    };

    if !email.contains('@') || email.contains(':') || email.contains(';') {
        eprintln!("Email must contain '@' and no ':' or ';'");
        std::process::exit(1);
    }

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("\nEmail    : {}", email);
            println!("Cost     : {}", DEFAULT_COST);
            println!("Hash     : {}\n", hashed);
            println!("# Add this to ADMIN_CREDENTIALS in your .env (separate entries with ';'):");
            println!("ADMIN_CREDENTIALS={}:{}", email, hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
