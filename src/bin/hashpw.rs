use biportal::auth::hash_password;
use std::env;
use std::process;

/// Hash a password for the user table
///
/// Prints the Argon2 PHC string to paste into the `password` column of
/// `database/users.csv`.
fn main() {
    let mut args = env::args().skip(1);
    let password = match args.next() {
        Some(password) => password,
        None => {
            eprintln!("usage: hashpw <password>");
            process::exit(2);
        }
    };

    match hash_password(&password) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("failed to hash password: {}", e);
            process::exit(1);
        }
    }
}
