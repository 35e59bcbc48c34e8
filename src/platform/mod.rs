//! Bindings of the kernel process-information structure per target OS.
//!
//! Each supported OS binds `kinfo_proc` (from `libc` on FreeBSD, generated from the SDK
//! headers on Darwin) and lists the fields a process enumerator needs. On any other
//! target this module is empty, and the `kinfo-offsets` binary refuses to build.

use crate::layout::LayoutReport;
use crate::records::RecordLayout;

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod darwin;
#[cfg(any(target_os = "macos", target_os = "ios"))]
use darwin as os;

#[cfg(target_os = "freebsd")]
mod freebsd;
#[cfg(target_os = "freebsd")]
use freebsd as os;

#[derive(Clone, Copy, Debug)]
pub struct Platform {
    pub report: &'static LayoutReport,
    /// Pid/ppid/comm positions as a `KERN_PROC_ALL` walker reads them.
    pub records: RecordLayout,
}

/// The process-information layout of the build target.
#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
pub const CURRENT: Platform = Platform {
    report: &os::KINFO_PROC,
    records: os::RECORDS,
};

/// Raw `sysctl({CTL_KERN, KERN_PROC, KERN_PROC_ALL})` output: one `kinfo_proc` per process.
#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
pub fn process_table() -> anyhow::Result<Vec<u8>> {
    use std::ptr::null_mut;

    let mut mib = [libc::CTL_KERN, libc::KERN_PROC, libc::KERN_PROC_ALL];
    for _ in 0..3 {
        let mut size: libc::size_t = 0;
        // SAFETY: a null buffer only asks the kernel for the size it needs.
        let ret = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                mib.len() as _,
                null_mut(),
                &mut size,
                null_mut(),
                0,
            )
        };
        if ret != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        // Room for processes started between the two calls.
        size += size / 8;
        let mut buf = vec![0u8; size];
        // SAFETY: `buf` is `size` bytes long and the kernel writes at most `size` bytes.
        let ret = unsafe {
            libc::sysctl(
                mib.as_mut_ptr(),
                mib.len() as _,
                buf.as_mut_ptr().cast(),
                &mut size,
                null_mut(),
                0,
            )
        };
        if ret == 0 {
            buf.truncate(size);
            return Ok(buf);
        }
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ENOMEM) {
            return Err(err.into());
        }
        log::debug!("Process table grew during sysctl, retrying");
    }
    Err(anyhow::anyhow!("process table kept growing during sysctl"))
}

#[cfg(all(
    test,
    any(target_os = "macos", target_os = "ios", target_os = "freebsd")
))]
mod tests {
    use super::*;
    use crate::records::parse_native;

    #[test]
    fn current_report_is_in_bounds() {
        assert_eq!(CURRENT.report.type_name, "kinfo_proc");
        assert!(CURRENT.report.fields_in_bounds());
        assert_eq!(CURRENT.records.size, CURRENT.report.size);
    }

    #[test]
    fn process_table_contains_this_process() {
        let table = process_table().unwrap();
        let entries = parse_native(&table, &CURRENT.records).unwrap();
        let pid = std::process::id() as i32;
        let me = entries.iter().find(|e| e.pid == pid).unwrap();
        assert_eq!(me.ppid, std::os::unix::process::parent_id() as i32);
    }
}
