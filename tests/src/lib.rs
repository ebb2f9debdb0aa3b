//! # Mobile-Verify Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-subsystem flows through the real router
//!     ├── provider.rs   # In-process provider stand-in (OAuth, checks, JWKS)
//!     └── flows.rs      # Check lifecycle and callback scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mv-tests
//! cargo test -p mv-tests integration::flows::
//! ```

pub mod integration;
