// ABOUTME: Regions command implementation.
// ABOUTME: Lists known region codes with their display names.

use revdeploy::output::{Output, OutputMode};
use revdeploy::types::region::all_regions;

pub fn regions(output: Output) {
    for (code, name) in all_regions() {
        match output.mode() {
            OutputMode::Json => output.event("region", &format!("{code}: {name}"), None),
            _ => println!("{code:<16} {name}"),
        }
    }
}
