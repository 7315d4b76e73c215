//! Offline digest command

use anyhow::Result;

/// Print the digest the server would store for `plaintext`
pub fn cmd_digest(plaintext: &str) -> Result<()> {
  println!("{}", hashvault::digest::encode(plaintext));
  Ok(())
}
