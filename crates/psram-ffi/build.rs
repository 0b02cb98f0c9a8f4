//! Regenerates `include/psram.h` from the exported `psram_*` functions.

use std::env;
use std::fs;
use std::path::Path;

const HEADER: &str = "psram.h";

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let root = Path::new(&manifest_dir);
    let include = root.join("include");
    fs::create_dir_all(&include).expect("cannot create include/");

    let config =
        cbindgen::Config::from_file(root.join("cbindgen.toml")).expect("invalid cbindgen.toml");

    match cbindgen::generate_with_config(root, config) {
        Ok(bindings) => {
            bindings.write_to_file(include.join(HEADER));
        }
        // The previous header, if any, stays in place.
        Err(err) => println!("cargo:warning=could not regenerate {HEADER}: {err}"),
    }
}
