use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Access level of a portal account
///
/// Admins can additionally download the accumulated activity logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full access including log export
    Admin,

    /// Regular employee: login and assigned dashboards only
    Standard,
}

impl Role {
    /// Parse a role cell from the user table
    ///
    /// Anything that is not literally `admin` (case-insensitive) is treated
    /// as a standard account, so a typo in the table can never grant access.
    pub fn parse(s: &str) -> Role {
        if s.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Standard
        }
    }
}

/// A registered portal account
///
/// Constructed once at startup from the user table and immutable afterwards;
/// there is no in-app account management.
#[derive(Debug, Clone)]
pub struct Account {
    /// Email address (unique identifier for the account)
    pub email: String,

    /// Argon2 hash of the account's password (PHC string format)
    pub password_hash: String,

    /// Access level
    pub role: Role,

    /// Display name shown on the dashboard page
    pub name: String,

    /// Assigned dashboard identifiers, in table order
    ///
    /// Derived by splitting the `dashboards` column on commas. Entries are
    /// matched against catalog URLs by substring containment, so they are
    /// kept verbatim here and trimmed at match time.
    pub dashboard_ids: Vec<String>,
}

/// Raw row shape of the user table CSV
#[derive(Debug, Deserialize)]
struct UserRow {
    email: String,
    password: String,
    role: String,
    dashboards: String,
    name: String,
}

/// Read-only snapshot of all registered accounts, keyed by email
///
/// Loaded once at process start; changes to the backing file require a
/// restart to take effect.
#[derive(Debug, Default)]
pub struct UserStore {
    accounts: HashMap<String, Account>,
}

impl UserStore {
    /// Load the user table from a CSV file
    ///
    /// Expected columns: `email,password,role,dashboards,name`. The password
    /// column holds Argon2 hashes produced by the `hashpw` helper binary.
    ///
    /// A missing or unreadable file yields an empty store (every login will
    /// then fail with invalid credentials); a malformed row is skipped. Both
    /// conditions are logged so the failure mode is visible server-side.
    pub fn load(path: &Path) -> UserStore {
        let reader = match csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!(
                    "user table {} could not be opened ({}); starting with an empty store",
                    path.display(),
                    e
                );
                return UserStore::default();
            }
        };
        Self::from_csv_reader(reader)
    }

    /// Load the user table from any CSV reader
    pub fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> UserStore {
        let mut accounts = HashMap::new();

        for (line, result) in reader.deserialize::<UserRow>().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    warn!("skipping malformed user row {}: {}", line + 2, e);
                    continue;
                }
            };

            let account = Account {
                email: row.email.trim().to_string(),
                password_hash: row.password.trim().to_string(),
                role: Role::parse(&row.role),
                name: row.name.trim().to_string(),
                dashboard_ids: row
                    .dashboards
                    .split(',')
                    .map(|id| id.to_string())
                    .collect(),
            };

            accounts.insert(account.email.clone(), account);
        }

        UserStore { accounts }
    }

    /// Look up an account by email
    pub fn get(&self, email: &str) -> Option<&Account> {
        self.accounts.get(email)
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no accounts are registered
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
