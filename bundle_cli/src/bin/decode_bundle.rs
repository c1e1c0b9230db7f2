use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};

use anyhow::{Context as _, Result};
use clap::Parser as _;
use dotenvy::dotenv;

use self::decode_bundle::*;
mod decode_bundle {
    pub mod cli;
}

fn main() -> Result<()> {
    dotenv().ok();
    bundle_cli::tracing::init();

    let args = cli::Cli::parse();

    let input: Box<dyn BufRead> = match (&args.hex, &args.file) {
        (Some(hex), _) => Box::new(Cursor::new(hex.clone())),
        (None, Some(path)) => Box::new(BufReader::new(
            File::open(path).context(format!("couldn't open {}", path.display()))?,
        )),
        (None, None) => Box::new(io::stdin().lock()),
    };

    bundle_cli::batch::decode_lines(input, io::stdout().lock(), &args.options(), args.pretty)?
        .into_result()
}
