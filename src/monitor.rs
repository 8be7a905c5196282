//! Read-only host diagnostics.
//!
//! Printed before mediation when the monitor flag is set. Pure reporting:
//! nothing here feeds back into classification, confirmation or execution.

use anyhow::Result;
use chrono::Local;
use std::io::{self, Write};
use sysinfo::{Disks, Networks, System};

/// Prints the host report to stdout.
pub fn print_report() -> Result<()> {
    let mut stdout = io::stdout();
    write_report(&mut stdout)
}

/// Writes the host report to the given writer.
pub fn write_report<W: Write>(out: &mut W) -> Result<()> {
    let mut sys = System::new_all();
    sys.refresh_all();

    writeln!(out, "== Host System Information ==")?;
    writeln!(out, "Timestamp: {}", Local::now().to_rfc2822())?;
    writeln!(out)?;

    writeln!(out, "== Host Info ==")?;
    writeln!(out, "Hostname: {}", label(System::host_name()))?;
    writeln!(out, "OS: {}", label(System::long_os_version()))?;
    writeln!(out, "Kernel Version: {}", label(System::kernel_version()))?;
    writeln!(out, "Architecture: {}", label(System::cpu_arch()))?;
    writeln!(out)?;

    writeln!(out, "== Uptime & Load ==")?;
    writeln!(out, "Uptime: {:.2} hours", System::uptime() as f64 / 3600.0)?;
    let load = System::load_average();
    writeln!(
        out,
        "Load Average (1/5/15 min): {:.2} {:.2} {:.2}",
        load.one, load.five, load.fifteen
    )?;
    writeln!(out)?;

    writeln!(out, "== CPU Info ==")?;
    if let Some(cpu) = sys.cpus().first() {
        writeln!(out, "Model: {}", cpu.brand())?;
    }
    writeln!(out, "CPU Cores: {}", sys.cpus().len())?;
    writeln!(
        out,
        "CPU Usage (approx): {:.2}%",
        sys.global_cpu_info().cpu_usage()
    )?;
    writeln!(out)?;

    writeln!(out, "== Memory Info ==")?;
    writeln!(out, "Total: {:.2} MB", to_mb(sys.total_memory()))?;
    writeln!(out, "Used : {:.2} MB", to_mb(sys.used_memory()))?;
    writeln!(
        out,
        "Free : {:.2} MB",
        to_mb(sys.total_memory().saturating_sub(sys.used_memory()))
    )?;
    writeln!(out)?;

    writeln!(out, "== Disk Usage ==")?;
    for disk in Disks::new_with_refreshed_list().list() {
        let total = to_gb(disk.total_space());
        let free = to_gb(disk.available_space());
        writeln!(
            out,
            "{}: Total {:.2} GB, Used {:.2} GB, Free {:.2} GB",
            disk.mount_point().display(),
            total,
            total - free,
            free
        )?;
    }
    writeln!(out)?;

    writeln!(out, "== Network Interfaces ==")?;
    for (name, data) in &Networks::new_with_refreshed_list() {
        writeln!(
            out,
            "Interface {}: RX {:.2} KB, TX {:.2} KB",
            name,
            data.total_received() as f64 / 1024.0,
            data.total_transmitted() as f64 / 1024.0
        )?;
    }
    writeln!(out)?;

    Ok(())
}

fn label(value: Option<String>) -> String {
    value.unwrap_or_else(|| "unknown".to_string())
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn to_gb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_contains_every_section() {
        let mut output = Vec::new();
        write_report(&mut output).unwrap();

        let text = String::from_utf8_lossy(&output);
        for section in [
            "== Host Info ==",
            "== Uptime & Load ==",
            "== CPU Info ==",
            "== Memory Info ==",
            "== Disk Usage ==",
            "== Network Interfaces ==",
        ] {
            assert!(text.contains(section), "missing section {section}");
        }
    }
}
