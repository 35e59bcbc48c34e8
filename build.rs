use std::{env, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SDKROOT");
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "macos" && target_os != "ios" {
        return;
    }

    // bindgen passes the matching clang --target from cargo's TARGET itself.
    let mut builder = bindgen::Builder::default()
        .header_contents("kinfo.h", "#include <sys/types.h>\n#include <sys/sysctl.h>\n")
        .allowlist_type("kinfo_proc")
        .layout_tests(false)
        .derive_debug(false);
    if let Ok(sdk) = env::var("SDKROOT") {
        builder = builder.clang_arg(format!("-isysroot{sdk}"));
    }
    let bindings = builder
        .generate()
        .expect("failed to generate kinfo_proc bindings from <sys/sysctl.h>");

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    bindings
        .write_to_file(out.join("sysctl.rs"))
        .expect("failed to write kinfo_proc bindings");
}
