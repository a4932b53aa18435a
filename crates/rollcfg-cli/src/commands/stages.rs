//! `rollcfg stages`

use rollcfg_core::StageKind;

use crate::error::Result;
use crate::ui;

/// Print every stage in execution order with its plugin name.
pub fn execute() -> Result<()> {
    for line in render() {
        println!("{line}");
    }
    Ok(())
}

pub fn render() -> Vec<String> {
    StageKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| ui::stage_row(i + 1, kind.key(), kind.plugin_name()))
        .collect()
}
