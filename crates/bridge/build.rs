fn main() {
    println!("cargo:rerun-if-env-changed=ELY_ENGINE_LIB_DIR");
    if std::env::var_os("CARGO_FEATURE_NATIVE_ENGINE").is_none() {
        return;
    }
    if let Some(dir) = std::env::var_os("ELY_ENGINE_LIB_DIR") {
        println!(
            "cargo:rustc-link-search=native={}",
            std::path::Path::new(&dir).display()
        );
    }
}
