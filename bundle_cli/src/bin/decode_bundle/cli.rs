use std::path::PathBuf;

use bundle_decoder::{AddressPolicy, DecodeOptions, Layout};
use clap::{Parser, ValueHint};

/// Decode `execute(bytes)` calldata and print the bundle as JSON.
///
/// With neither HEX nor --file, reads one hex string per line of stdin.
#[derive(Parser)]
#[command(version)]
pub(crate) struct Cli {
    /// Calldata as hex, with or without a `0x` prefix.
    pub(crate) hex: Option<String>,
    /// Read hex strings from this file, one per line.
    #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "hex")]
    pub(crate) file: Option<PathBuf>,
    /// How the bundle inside the call is encoded: `auto`, `words` or `packed`.
    #[arg(short, long, env = "BUNDLE_LAYOUT", default_value_t = Layout::Auto)]
    pub(crate) layout: Layout,
    /// Whether address words with dirty upper bytes are rejected (`strict`) or
    /// truncated (`lenient`).
    #[arg(long, env = "BUNDLE_ADDRESS_POLICY", default_value_t = AddressPolicy::Strict)]
    pub(crate) address_policy: AddressPolicy,
    /// Indent the output.
    #[arg(short, long)]
    pub(crate) pretty: bool,
}

impl Cli {
    pub(crate) fn options(&self) -> DecodeOptions {
        DecodeOptions {
            layout: self.layout,
            address_policy: self.address_policy,
        }
    }
}
