//! Decoding of `sysctl({CTL_KERN, KERN_PROC, KERN_PROC_ALL})` output.
//!
//! The kernel hands back a packed array of `kinfo_proc` records. Process-tree walkers
//! historically hard-coded the record size and the pid/ppid offsets per OS and pointer
//! width; those assumptions are kept here as reference layouts so they can be compared
//! against what the build target actually has.

use crate::bits::EndiannessExt as _;
use anyhow::Result;
use std::mem::size_of;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommField {
    pub offset: usize,
    /// Capacity in bytes, including the trailing NUL.
    pub len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    pub size: usize,
    pub pid: usize,
    pub ppid: usize,
    pub comm: Option<CommField>,
}

pub const DARWIN_32: RecordLayout = RecordLayout {
    size: 492,
    pid: 24,
    ppid: 416,
    comm: Some(CommField {
        offset: 163,
        len: 17,
    }),
};

pub const DARWIN_64: RecordLayout = RecordLayout {
    size: 648,
    pid: 40,
    ppid: 560,
    comm: Some(CommField {
        offset: 243,
        len: 17,
    }),
};

pub const FREEBSD_32: RecordLayout = RecordLayout {
    size: 768,
    pid: 40,
    ppid: 44,
    comm: None,
};

pub const FREEBSD_64: RecordLayout = RecordLayout {
    size: 1088,
    pid: 72,
    ppid: 76,
    comm: None,
};

impl RecordLayout {
    /// The layout process-tree walkers assumed for the build target, if any.
    pub const fn reference() -> Option<RecordLayout> {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            if cfg!(target_pointer_width = "64") {
                Some(DARWIN_64)
            } else {
                Some(DARWIN_32)
            }
        } else if cfg!(target_os = "freebsd") {
            if cfg!(target_pointer_width = "64") {
                Some(FREEBSD_64)
            } else {
                Some(FREEBSD_32)
            }
        } else {
            None
        }
    }

    /// `(name, self, other)` for every position the two layouts disagree on.
    ///
    /// The command-name field is only compared when both layouts carry one.
    pub fn differences(&self, other: &RecordLayout) -> Vec<(&'static str, usize, usize)> {
        let mut diffs = Vec::new();
        let mut check = |name: &'static str, a: usize, b: usize| {
            if a != b {
                diffs.push((name, a, b));
            }
        };
        check("size", self.size, other.size);
        check("pid", self.pid, other.pid);
        check("ppid", self.ppid, other.ppid);
        if let (Some(a), Some(b)) = (self.comm, other.comm) {
            check("comm", a.offset, b.offset);
            check("comm.len", a.len, b.len);
        }
        diffs
    }

    fn check_fits(&self) -> Result<()> {
        if self.size == 0 {
            return Err(anyhow::anyhow!("record size is zero"));
        }
        let int = size_of::<i32>();
        let mut ends = vec![
            ("pid", self.pid.checked_add(int)),
            ("ppid", self.ppid.checked_add(int)),
        ];
        if let Some(comm) = self.comm {
            ends.push(("comm", comm.offset.checked_add(comm.len)));
        }
        for (name, end) in ends {
            let end = end.ok_or_else(|| anyhow::anyhow!("{name} offset overflows"))?;
            if end > self.size {
                return Err(anyhow::anyhow!(
                    "{name} ends at byte {end}, past the {}-byte record",
                    self.size
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcEntry<'a> {
    pub pid: i32,
    pub ppid: i32,
    /// Command name up to the first NUL.
    pub comm: Option<&'a [u8]>,
}

/// Split a `KERN_PROC_ALL` buffer into process entries.
pub fn parse_records<'a>(
    buf: &'a [u8],
    layout: &RecordLayout,
    endian: impl object::Endian,
) -> Result<Vec<ProcEntry<'a>>> {
    layout.check_fits()?;
    if buf.len() % layout.size != 0 {
        return Err(anyhow::anyhow!(
            "buffer of {} bytes is not a whole number of {}-byte records",
            buf.len(),
            layout.size
        ));
    }
    let mut entries = Vec::with_capacity(buf.len() / layout.size);
    for record in buf.chunks_exact(layout.size) {
        let pid = endian
            .read_at::<i32>(record, layout.pid)
            .ok_or_else(|| anyhow::anyhow!("not enough data"))?;
        let ppid = endian
            .read_at::<i32>(record, layout.ppid)
            .ok_or_else(|| anyhow::anyhow!("not enough data"))?;
        let comm = layout.comm.map(|comm| {
            let raw = &record[comm.offset..comm.offset + comm.len];
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            &raw[..end]
        });
        entries.push(ProcEntry { pid, ppid, comm });
    }
    log::debug!("Decoded {} process records", entries.len());
    Ok(entries)
}

/// [`parse_records`] for a buffer the running kernel produced.
pub fn parse_native<'a>(buf: &'a [u8], layout: &RecordLayout) -> Result<Vec<ProcEntry<'a>>> {
    let endian = if cfg!(target_endian = "little") {
        object::Endianness::Little
    } else {
        object::Endianness::Big
    };
    parse_records(buf, layout, endian)
}
