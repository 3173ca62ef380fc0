fn main() {
    // PDFium is dynamically linked; no build-time setup needed.
    // The library is resolved at runtime from:
    // 1. Current directory
    // 2. vendor/pdfium/lib/
    // 3. System library paths
    println!("cargo:rerun-if-changed=build.rs");
}
