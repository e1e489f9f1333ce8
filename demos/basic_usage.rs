//! Basic example of using the authenticated index
//!
//! This example demonstrates:
//! - Creating a new index
//! - Setting, updating and deleting entries
//! - Getting the root identifier
//! - Creating and verifying membership and non-membership proofs

use hdindex::{FixedHash, HDIndex, IndexError, MemoryBlockstore, Vector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    owner: String,
    balance: u64,
}

fn main() -> Result<(), IndexError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Create a new index over an in-memory block store
    let mut index = HDIndex::from_store(MemoryBlockstore::new());

    // Keys are 256-bit values, parsed here from hex
    let alice: FixedHash = "a11ce".parse()?;
    let bob: FixedHash = "b0b".parse()?;
    let carol: FixedHash = "ca501".parse()?;

    for (key, owner, balance) in [
        (alice, "alice", 100),
        (bob, "bob", 200),
        (carol, "carol", 300),
    ] {
        index.set(
            &key,
            &Account {
                owner: owner.to_string(),
                balance,
            },
        )?;
    }
    println!("Root: {}", index.root());
    println!("Root CID: {}", index.cid()?);

    // Update an entry
    index.set(
        &bob,
        &Account {
            owner: "bob".to_string(),
            balance: 250,
        },
    )?;
    let account: Option<Account> = index.get(&bob)?;
    println!("Bob: {:?}", account);

    // Proofs are plain bytes that verify against a root alone
    let bytes = index.proof(&alice)?.to_bytes();
    let proof = Vector::from_bytes(&bytes)?;
    println!("Proof length: {} bytes", bytes.len());
    println!(
        "Membership proof verification: {}",
        proof.verify(&index.root(), Some(&alice), None)
    );

    let dave: FixedHash = "da4e".parse()?;
    let proof = index.proof(&dave)?;
    println!(
        "Non-membership proof verification: {}",
        proof.excludes(&index.root(), &dave)
    );

    // Delete an entry
    let before = index.root();
    index.delete(&carol)?;
    let removed = index.get::<Account>(&carol)?.is_none();
    println!("Carol removed: {removed}");
    let readable = index.get_at::<Account>(&carol, &before)?.is_some();
    println!("Old root still readable: {readable}");

    println!("{}", index.draw(&index.root())?);
    Ok(())
}
