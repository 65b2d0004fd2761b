//! Generates the base64-encoded 256-bit key the credential vault expects in
//! `ODK__VAULT__KEY` (or `vault.key` in `orderdesk.toml`).

use clap::Parser;
use odk_vault::MasterKey;

#[derive(Debug, Parser)]
#[command(name = "odk-keygen", version, about = "Generate an AES-256 vault key")]
struct Args {
    /// Print the bare key only, without the surrounding hint.
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    let key = MasterKey::generate();

    if args.quiet {
        println!("{}", key.to_base64());
    } else {
        println!("Generated AES-256 vault key:");
        println!("{}", key.to_base64());
        println!();
        println!("Export it as ODK__VAULT__KEY or set vault.key in orderdesk.toml.");
    }
}
