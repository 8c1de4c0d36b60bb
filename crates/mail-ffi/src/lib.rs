//! UniFFI bindings crate for the welcome launch router
//!
//! Builds the `WelcomeService` object, the launch request helpers and the
//! logging hook of the mail crate into a static/dynamic library that the
//! iOS/macOS shell links against.
//!
//! ## Building for Swift
//!
//! 1. Build the library for Apple platforms:
//!    ```bash
//!    cargo build --release -p mail-ffi --target aarch64-apple-darwin
//!    cargo build --release -p mail-ffi --target aarch64-apple-ios
//!    ```
//!
//! 2. Generate Swift bindings:
//!    ```bash
//!    cargo run -p mail-ffi --features bindgen --bin uniffi-bindgen generate \
//!        --library target/aarch64-apple-darwin/release/libmail_ffi.dylib \
//!        --language swift \
//!        --out-dir generated/swift
//!    ```
//!
//! 3. Create XCFramework (see script/build-xcframework)

pub use mail::ffi::*;

// Library mode finds the scaffolding through this crate
mail::uniffi_reexport_scaffolding!();
