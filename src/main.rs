use std::io::Write as _;

use anyhow::Result;
use kinfo_offsets::{platform, records};

#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
compile_error!("no kinfo_proc binding for this target");

/// Walk the live process table with the measured layout, as a sanity check on it.
fn count_processes(layout: &records::RecordLayout) -> Result<usize> {
    let table = platform::process_table()?;
    Ok(records::parse_native(&table, layout)?.len())
}

fn main() -> Result<()> {
    env_logger::init();
    let platform = platform::CURRENT;
    let report = platform.report;
    log::debug!(
        "Measuring {} ({} fields)",
        report.type_name,
        report.fields.len()
    );

    if let Some(reference) = records::RecordLayout::reference() {
        let diffs = platform.records.differences(&reference);
        if diffs.is_empty() {
            log::info!("{} matches the reference record layout", report.type_name);
        }
        for (name, measured, expected) in diffs {
            log::warn!("{name} is at {measured}, reference layout has {expected}");
        }
    }

    if log::log_enabled!(log::Level::Debug) {
        match count_processes(&platform.records) {
            Ok(count) => log::debug!("Decoded {count} processes from KERN_PROC_ALL"),
            Err(e) => log::warn!("Couldn't walk the process table: {e}"),
        }
    }

    let mut out = std::io::stdout().lock();
    write!(out, "{report}")?;
    out.flush()?;
    Ok(())
}
