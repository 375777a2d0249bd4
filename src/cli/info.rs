use anyhow::Result;
use log::Level;
use serde::Serialize;

use super::command::{Cli, InfoArgs};
use super::decode::gather_pairs;
use crate::input::InputReader;
use cc608::process::{decode::ByteDecoder, extract::Extractor};

/// Serializable summary of one decoded caption stream.
#[derive(Debug, Serialize)]
struct StreamSummary {
    track: u8,
    field: u8,
    mode: String,
    display_version: u32,
    rows_with_text: usize,
    pairs: u64,
    null_pairs: u64,
    parity_failures: u64,
    pac_codes: u64,
    mid_row_codes: u64,
    misc_codes: u64,
    repeats_suppressed: u64,
    channel_filtered: u64,
    characters: u64,
}

pub fn cmd_info(args: &InfoArgs, cli: &Cli) -> Result<()> {
    log::info!("Analyzing caption stream: {}", args.input.display());

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
    if stats.pairs == 0 {
        println!("No caption data found in the input.");
        return Ok(());
    }

    let summary = StreamSummary {
        track: args.track,
        field: decoder.desired_field(),
        mode: decoder.model().mode().to_string(),
        display_version: decoder.model().display_version(),
        rows_with_text: decoder
            .model()
            .displayed_memory()
            .rows()
            .iter()
            .filter(|row| row.contains_text())
            .count(),
        pairs: stats.pairs,
        null_pairs: stats.null_pairs,
        parity_failures: stats.parity_failures,
        pac_codes: stats.pac_codes,
        mid_row_codes: stats.mid_row_codes,
        misc_codes: stats.misc_codes,
        repeats_suppressed: stats.repeats_suppressed,
        channel_filtered: stats.channel_filtered,
        characters: stats.characters,
    };

    print!("{}", serde_yaml_ng::to_string(&summary)?);

    Ok(())
}
