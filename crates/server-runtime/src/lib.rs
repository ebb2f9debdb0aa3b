//! # Mobile-Verify Server Runtime
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults → `MV_CONFIG` TOML → environment)
//! 2. Validate it
//! 3. Initialise telemetry
//! 4. Build subsystems: key resolver → callback verifier, provider client →
//!    check lifecycle
//! 5. Serve until Ctrl-C, then drain in-flight requests
//!
//! Every subsystem instance is created here exactly once and handed to the
//! gateway inside its `AppState`.

pub mod config;
pub mod container;

pub use config::{load_config, load_config_from, RuntimeConfigError};
pub use container::build_state;
