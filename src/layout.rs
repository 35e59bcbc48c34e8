//! Compile-time layout tables for kernel-defined structures.
//!
//! A [`LayoutReport`] is built by [`layout_report!`] from a list of field paths. Every
//! value in it comes from `size_of`/`offset_of!`, so a path the structure doesn't have
//! is a build error, not a missing line.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldOffset {
    /// Dotted field path, e.g. `kp_eproc.e_pcred.p_ruid`.
    pub path: &'static str,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformConstant {
    pub name: &'static str,
    pub value: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutReport {
    pub type_name: &'static str,
    pub size: usize,
    pub fields: &'static [FieldOffset],
    pub constant: PlatformConstant,
}

impl LayoutReport {
    /// Whether every field starts inside the structure.
    pub const fn fields_in_bounds(&self) -> bool {
        let mut i = 0;
        while i < self.fields.len() {
            if self.fields[i].offset >= self.size {
                return false;
            }
            i += 1;
        }
        true
    }

    pub fn offset(&self, path: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|field| field.path == path)
            .map(|field| field.offset)
    }
}

/// One `name=value` line per item: the structure size, each field, then the constant.
impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}={}", self.type_name, self.size)?;
        for field in self.fields {
            writeln!(f, "{}={}", field.path, field.offset)?;
        }
        writeln!(f, "{}={}", self.constant.name, self.constant.value)
    }
}

/// Build a [`LayoutReport`] for `$ty`.
///
/// ```
/// use kinfo_offsets::layout::LayoutReport;
///
/// #[repr(C)]
/// struct pinfo {
///     p_flag: u32,
///     p_cred: cred,
/// }
/// #[repr(C)]
/// struct cred {
///     cr_ref: u32,
///     cr_uid: u32,
/// }
/// const COMLEN: usize = 16;
///
/// const REPORT: LayoutReport = kinfo_offsets::layout_report!(pinfo {
///     p_flag,
///     p_cred.cr_uid,
/// } COMLEN);
/// assert_eq!(REPORT.to_string(), "pinfo=12\np_flag=0\np_cred.cr_uid=8\nCOMLEN=16\n");
/// ```
///
/// A path the structure doesn't have fails to build:
///
/// ```compile_fail
/// use kinfo_offsets::layout::LayoutReport;
///
/// #[repr(C)]
/// struct pinfo {
///     p_flag: u32,
/// }
/// const COMLEN: usize = 16;
///
/// const REPORT: LayoutReport = kinfo_offsets::layout_report!(pinfo { p_flags } COMLEN);
/// ```
///
/// `$ty` and `$constant` must be in scope as plain identifiers; their names are printed
/// as written.
#[macro_export]
macro_rules! layout_report {
    ($ty:ident { $($first:ident $(. $rest:ident)*),+ $(,)? } $constant:ident) => {
        $crate::layout::LayoutReport {
            type_name: ::core::stringify!($ty),
            size: ::core::mem::size_of::<$ty>(),
            fields: &[$(
                $crate::layout::FieldOffset {
                    path: ::core::concat!(
                        ::core::stringify!($first) $(, ".", ::core::stringify!($rest))*
                    ),
                    offset: ::core::mem::offset_of!($ty, $first $(. $rest)*),
                },
            )+],
            constant: $crate::layout::PlatformConstant {
                name: ::core::stringify!($constant),
                value: $constant as u64,
            },
        }
    };
}

/// Byte distance from `base` to `field`, for checking `offset_of!` against plain
/// address arithmetic.
#[cfg(test)]
pub(crate) fn byte_distance<T, F>(base: *const T, field: *const F) -> usize {
    // SAFETY: both pointers are derived from the same allocation and no memory is read.
    let distance = unsafe { field.cast::<u8>().offset_from(base.cast::<u8>()) };
    usize::try_from(distance).expect("field lies before its structure")
}
