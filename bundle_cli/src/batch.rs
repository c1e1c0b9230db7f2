//! Decoding many hex strings, one per line.

use std::io::{BufRead, Write};

use anyhow::{bail, Context as _};
use bundle_decoder::DecodeOptions;
use tracing::{error, info};

/// How many inputs of a batch decoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub decoded: usize,
    pub failed: usize,
}

impl Summary {
    /// Fail if any input did.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.failed {
            0 => {
                info!("decoded {} bundles", self.decoded);
                Ok(())
            }
            n => bail!("{n} of {} inputs failed to decode", self.decoded + n),
        }
    }
}

/// Decode every non-blank line of `input`, writing each bundle to `output`
/// as JSON.
///
/// A line that fails to decode is logged and skipped, only I/O errors stop
/// the batch.
pub fn decode_lines(
    input: impl BufRead,
    mut output: impl Write,
    options: &DecodeOptions,
    pretty: bool,
) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    for (ix, line) in input.lines().enumerate() {
        let line = line.context("couldn't read input")?;
        let hex = line.trim();
        if hex.is_empty() {
            continue;
        }
        match render(hex, options, pretty) {
            Ok(json) => {
                writeln!(output, "{json}")?;
                summary.decoded += 1;
            }
            Err(e) => {
                error!("line {}: {e:#}", ix + 1);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn render(hex: &str, options: &DecodeOptions, pretty: bool) -> anyhow::Result<String> {
    let bundle = bundle_decoder::decode_with(hex, options)?;
    let json = match pretty {
        true => bundle_decoder::to_json_pretty(&bundle),
        false => bundle_decoder::to_json(&bundle),
    }
    .context("couldn't render bundle")?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use bundle_decoder::Layout;

    use super::*;

    /// `execute` with a packed bundle of five empty lists.
    fn empty_bundle() -> String {
        format!(
            "0x09c5eabe{:064x}{:064x}{}",
            0x20,
            15,
            "00".repeat(32)
        )
    }

    const EMPTY_JSON: &str =
        r#"{"assets":[],"pairs":[],"pool_updates":[],"top_of_block_orders":[],"user_orders":[]}"#;

    fn run(input: &str, options: &DecodeOptions, pretty: bool) -> (Summary, String) {
        let mut output = vec![];
        let summary = decode_lines(input.as_bytes(), &mut output, options, pretty).unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn skips_blank_lines_and_bad_input() {
        let input = format!("{0}\n\n   \nnot hex\n  {0}  \n", empty_bundle());
        let (summary, output) = run(&input, &DecodeOptions::default(), false);
        assert_eq!(
            summary,
            Summary {
                decoded: 2,
                failed: 1
            }
        );
        assert_eq!(output, format!("{EMPTY_JSON}\n{EMPTY_JSON}\n"));
    }

    #[test]
    fn layout_is_respected() {
        let words = DecodeOptions {
            layout: Layout::Words,
            ..Default::default()
        };
        let (summary, output) = run(&empty_bundle(), &words, false);
        assert_eq!(summary.failed, 1);
        assert!(output.is_empty());
    }

    #[test]
    fn pretty() {
        let (summary, output) = run(&empty_bundle(), &DecodeOptions::default(), true);
        assert_eq!(summary.decoded, 1);
        assert!(output.starts_with("{\n  \"assets\": [],\n"));
    }

    #[test]
    fn any_failure_fails_the_batch() {
        assert!(Summary::default().into_result().is_ok());
        assert!(Summary {
            decoded: 3,
            failed: 0
        }
        .into_result()
        .is_ok());
        let e = Summary {
            decoded: 2,
            failed: 1,
        }
        .into_result()
        .unwrap_err();
        assert_eq!(e.to_string(), "1 of 3 inputs failed to decode");
    }
}
