//! `struct kinfo_proc` from `<sys/sysctl.h>`: an `extern_proc` followed by an `eproc`.
//!
//! `libc` doesn't declare it, so `build.rs` generates the binding from the SDK headers.

use crate::layout::LayoutReport;
use crate::records::{CommField, RecordLayout};
use libc::MAXCOMLEN;
use std::mem::{offset_of, size_of};
use sys::kinfo_proc;

#[allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]
mod sys {
    include!(concat!(env!("OUT_DIR"), "/sysctl.rs"));
}

pub const KINFO_PROC: LayoutReport = crate::layout_report!(kinfo_proc {
    kp_proc.p_pid,
    kp_proc.p_comm,
    kp_eproc.e_ppid,
    kp_eproc.e_pcred.p_ruid,
    kp_eproc.e_pcred.p_rgid,
    kp_eproc.e_ucred.cr_uid,
} MAXCOMLEN);

const _: () = assert!(KINFO_PROC.fields_in_bounds());

pub const RECORDS: RecordLayout = RecordLayout {
    size: size_of::<kinfo_proc>(),
    pid: offset_of!(kinfo_proc, kp_proc.p_pid),
    ppid: offset_of!(kinfo_proc, kp_eproc.e_ppid),
    comm: Some(CommField {
        offset: offset_of!(kinfo_proc, kp_proc.p_comm),
        len: MAXCOMLEN + 1,
    }),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::byte_distance;
    use std::mem::MaybeUninit;
    use std::ptr::addr_of;

    #[test]
    fn matches_address_arithmetic() {
        let info = MaybeUninit::<kinfo_proc>::uninit();
        let base = info.as_ptr();
        // SAFETY: addr_of! only computes addresses inside `info`.
        let measured = unsafe {
            [
                byte_distance(base, addr_of!((*base).kp_proc.p_pid)),
                byte_distance(base, addr_of!((*base).kp_proc.p_comm)),
                byte_distance(base, addr_of!((*base).kp_eproc.e_ppid)),
                byte_distance(base, addr_of!((*base).kp_eproc.e_pcred.p_ruid)),
                byte_distance(base, addr_of!((*base).kp_eproc.e_pcred.p_rgid)),
                byte_distance(base, addr_of!((*base).kp_eproc.e_ucred.cr_uid)),
            ]
        };
        let reported: Vec<_> = KINFO_PROC.fields.iter().map(|f| f.offset).collect();
        assert_eq!(reported, measured);
        assert_eq!(KINFO_PROC.size, std::mem::size_of_val(&info));
    }

    #[test]
    fn comm_holds_maxcomlen() {
        fn capacity<T, const N: usize>(_: *const [T; N]) -> usize {
            N
        }
        let info = MaybeUninit::<kinfo_proc>::uninit();
        // SAFETY: only the field's address is taken.
        let comm = unsafe { addr_of!((*info.as_ptr()).kp_proc.p_comm) };
        assert_eq!(capacity(comm), MAXCOMLEN + 1);
        assert_eq!(KINFO_PROC.constant.value, 16);
    }

    #[test]
    fn records_agree_with_report() {
        assert_eq!(RECORDS.size, KINFO_PROC.size);
        assert_eq!(Some(RECORDS.pid), KINFO_PROC.offset("kp_proc.p_pid"));
        assert_eq!(Some(RECORDS.ppid), KINFO_PROC.offset("kp_eproc.e_ppid"));
        assert_eq!(
            RECORDS.comm.map(|c| c.offset),
            KINFO_PROC.offset("kp_proc.p_comm")
        );
    }

    #[cfg(all(target_os = "macos", any(target_arch = "x86_64", target_arch = "aarch64")))]
    #[test]
    fn matches_64_bit_reference() {
        assert!(RECORDS.differences(&crate::records::DARWIN_64).is_empty());
    }

    #[cfg(all(target_os = "macos", target_arch = "x86"))]
    #[test]
    fn historical_32_bit_output() {
        assert_eq!(
            KINFO_PROC.to_string(),
            "kinfo_proc=492\n\
             kp_proc.p_pid=24\n\
             kp_proc.p_comm=163\n\
             kp_eproc.e_ppid=416\n\
             kp_eproc.e_pcred.p_ruid=280\n\
             kp_eproc.e_pcred.p_rgid=288\n\
             kp_eproc.e_ucred.cr_uid=304\n\
             MAXCOMLEN=16\n"
        );
    }
}
