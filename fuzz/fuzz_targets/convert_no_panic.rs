#![no_main]

use libfuzzer_sys::fuzz_target;
use plaintext_converter::{ConversionOptions, LinkMode, PlaintextConverter};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };

    let links = match selector % 5 {
        0 => LinkMode::Off,
        1 => LinkMode::Inline,
        2 => LinkMode::Table,
        3 => LinkMode::NextLine,
        _ => LinkMode::BbCode,
    };
    let converter = PlaintextConverter::with_options(ConversionOptions {
        links,
        width: usize::from(selector / 5),
        ..Default::default()
    });

    // Errors are fine, panics are not
    let _ = converter.convert_bytes(body, None, None);
    if let Ok(html) = std::str::from_utf8(body) {
        let _ = converter.convert(html);
    }
});
