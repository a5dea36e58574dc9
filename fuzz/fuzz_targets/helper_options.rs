#![no_main]

use libfuzzer_sys::fuzz_target;
use plaintext_converter::PlaintextHelper;

fuzz_target!(|data: (&str, &str)| {
    let (options, html) = data;
    let helper = PlaintextHelper::new();

    let value = serde_json::from_str::<serde_json::Value>(options).ok();
    let _ = helper.convert(html, value.as_ref(), Some("fuzz"));
});
