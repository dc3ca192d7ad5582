//! `clipdl derive <locator>` – show what a locator maps to, without downloading.

use clipdl_core::naming;

pub fn run_derive(locator: &str) {
    let derived = naming::derive(locator);
    println!("transfer locator: {}", derived.transfer_locator);
    println!("canonical id:     {}", derived.canonical_id);
}
