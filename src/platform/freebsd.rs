//! `struct kinfo_proc` from `<sys/user.h>`, a flat record with `ki_` fields.

use crate::layout::LayoutReport;
use crate::records::{CommField, RecordLayout};
use libc::{kinfo_proc, MAXCOMLEN};
use std::mem::{offset_of, size_of};

pub const KINFO_PROC: LayoutReport = crate::layout_report!(kinfo_proc {
    ki_pid,
    ki_comm,
    ki_ppid,
    ki_ruid,
    ki_rgid,
    ki_uid,
} MAXCOMLEN);

const _: () = assert!(KINFO_PROC.fields_in_bounds());

pub const RECORDS: RecordLayout = RecordLayout {
    size: size_of::<kinfo_proc>(),
    pid: offset_of!(kinfo_proc, ki_pid),
    ppid: offset_of!(kinfo_proc, ki_ppid),
    comm: Some(CommField {
        offset: offset_of!(kinfo_proc, ki_comm),
        len: MAXCOMLEN + 1,
    }),
};
