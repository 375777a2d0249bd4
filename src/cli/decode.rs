use anyhow::Result;
use log::Level;

use super::command::{Cli, DecodeArgs, InputFormat};
use crate::input::InputReader;
use cc608::process::{decode::ByteDecoder, extract::Extractor};

/// ATSC registration marker; payloads are split on it so every envelope
/// in the input gets extracted, not just the first.
const GA94_MARKER: [u8; 4] = [0x47, 0x41, 0x39, 0x34];

/// Turns the raw input into a flat byte-pair stream according to the
/// input format.
pub(super) fn gather_pairs(
    data: &[u8],
    format: InputFormat,
    extractor: &Extractor,
) -> Result<Vec<u8>> {
    match format {
        InputFormat::Pairs => Ok(data.to_vec()),
        InputFormat::UserData => {
            let markers: Vec<usize> = data
                .windows(GA94_MARKER.len())
                .enumerate()
                .filter(|(_, window)| *window == GA94_MARKER)
                .map(|(position, _)| position)
                .collect();

            if markers.is_empty() {
                // let the extractor report the missing marker
                return extractor.extract(data);
            }

            let mut pairs = Vec::new();
            for (i, &start) in markers.iter().enumerate() {
                let end = markers.get(i + 1).copied().unwrap_or(data.len());
                pairs.extend(extractor.extract(&data[start..end])?);
            }

            Ok(pairs)
        }
    }
}

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli) -> Result<()> {
    log::info!(
        "Decoding caption stream: {} (strict mode: {}, track: {})",
        args.input.display(),
        cli.strict,
        args.track
    );

    let mut decoder = ByteDecoder::default();
    decoder.set_caption_track(args.track)?;

    let mut extractor = Extractor::new(decoder.desired_field());
    let fail_level = if cli.strict {
        Level::Warn
    } else {
        Level::Error
    };
    extractor.set_fail_level(fail_level);

    let mut input_reader = InputReader::new(&args.input)?;
    let data = input_reader.read_all()?;

    let pairs = gather_pairs(&data, args.format, &extractor)?;
    decoder.parse_bytes(&pairs);

    let stats = decoder.stats();
    log::info!(
        "Processed {} pairs ({} control codes, {} characters, {} parity failures)",
        stats.pairs,
        stats.pac_codes + stats.mid_row_codes + stats.misc_codes,
        stats.characters,
        stats.parity_failures
    );

    let memory = decoder.model().displayed_memory();
    let mut displayed_any = false;
    for (i, row) in memory.rows().iter().enumerate() {
        if row.contains_text() {
            println!("{:2}: {}", i + 1, row.text());
            displayed_any = true;
        }
    }

    if !displayed_any {
        println!("No caption text on screen at end of stream.");
    }

    Ok(())
}
