//! Generates the Swift/Kotlin bindings for `WelcomeService`
//!
//! Usage:
//!   cargo run -p mail-ffi --features bindgen --bin uniffi-bindgen generate \
//!       --library target/aarch64-apple-darwin/release/libmail_ffi.dylib \
//!       --language swift \
//!       --out-dir generated/swift

fn main() {
    uniffi::uniffi_bindgen_main()
}
