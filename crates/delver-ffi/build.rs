use std::env;
use std::path::PathBuf;

fn main() {
    let Ok(crate_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping delver.h");
        return;
    };
    let out_path = PathBuf::from(&crate_dir).join("delver.h");

    match cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("DELVER_H")
        .with_cpp_compat(true)
        .with_documentation(true)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(out_path);
        }
        Err(e) => println!("cargo:warning=unable to generate delver.h: {}", e),
    }
}
