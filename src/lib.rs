//! Layout of the kernel's process-information structure (`kinfo_proc`) for the build
//! target, measured at compile time.

mod bits;
pub mod layout;
pub mod platform;
pub mod records;
