//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `phonebook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use phonebook_core::{filter_contacts, ContactStore};

fn main() {
    println!("phonebook_core ping={}", phonebook_core::ping());
    println!("phonebook_core version={}", phonebook_core::core_version());

    // Exercise migrations and the live snapshot without touching disk.
    match smoke_store() {
        Ok(count) => println!("phonebook_core store=ok contacts={count}"),
        Err(err) => {
            eprintln!("phonebook_core store=error error={err}");
            std::process::exit(1);
        }
    }
}

fn smoke_store() -> Result<usize, phonebook_core::StoreError> {
    let store = ContactStore::open_in_memory()?;
    store.insert("Smoke", "0123456789")?;
    Ok(filter_contacts(&store.snapshot(), "smoke").len())
}
