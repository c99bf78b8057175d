//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn base_path() -> String {
        "/".into()
    }

    pub fn output() -> PathBuf {
        "build".into()
    }

    pub mod manifest {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            ".prerender/client-manifest.json".into()
        }

        pub fn timeout_ms() -> u64 {
            60_000
        }

        pub fn poll_interval_ms() -> u64 {
            100
        }
    }
}

// ============================================================================
// [render] Section Defaults
// ============================================================================

pub mod render {
    pub fn command() -> Vec<String> {
        vec!["node".into(), "render.js".into()]
    }
}
