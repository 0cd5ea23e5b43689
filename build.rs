fn main() {
    // CI sets GHRR_BUILD; local builds fall back to the BUILD_NUMBER file.
    let build_number = std::env::var("GHRR_BUILD")
        .ok()
        .or_else(|| std::fs::read_to_string("BUILD_NUMBER").ok())
        .map_or_else(|| "0".to_string(), |s| s.trim().to_string());

    println!("cargo:rustc-env=BUILD_NUMBER={build_number}");
    println!("cargo:rerun-if-changed=BUILD_NUMBER");
    println!("cargo:rerun-if-env-changed=GHRR_BUILD");
}
