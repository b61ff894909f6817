//! Refuses to build with a compiler that is too old.

use rustc_version::{Version, version};

/// The oldest compiler the crate builds with.
const MINIMUM_RUSTC: &str = "1.74.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let minimum = Version::parse(MINIMUM_RUSTC).expect("bad minimum version");
    match version() {
        Ok(current) if current >= minimum => { }
        Ok(current) => {
            eprintln!(
                "rollcall needs rustc {} or newer but is built with {}.",
                minimum, current
            );
            std::process::exit(1);
        }
        Err(err) => {
            println!("cargo:warning=cannot determine rustc version: {}", err);
        }
    }
}
