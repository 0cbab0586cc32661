//! # Voxel Mesher Entry Point
//!
//! Runs the library's `run()` and exits with a non-zero status if it fails.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(error) = voxel_mesher::run() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}
