//! Runtime configuration.
//!
//! Thread-local settings read by the mount pipeline.

use std::cell::RefCell;

// =============================================================================
// Config
// =============================================================================

/// Settings for mounting and re-rendering components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Re-render a mounted component when state its render read changes.
    /// When off, only explicit `update` calls re-render.
    pub auto_update: bool,
    /// Log patch statistics for every render at `debug` level.
    pub debug: bool,
    /// Inline style of the placeholder shown for unknown components.
    pub not_found_style: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_update: true,
            debug: false,
            not_found_style: "color:red;".to_string(),
        }
    }
}

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::default());
}

/// Current configuration.
pub fn config() -> Config {
    CONFIG.with(|c| c.borrow().clone())
}

pub fn set_config(config: Config) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}

/// Modify the configuration in place.
pub fn update_config(f: impl FnOnce(&mut Config)) {
    CONFIG.with(|c| f(&mut c.borrow_mut()));
}

/// Restore defaults (for testing).
pub fn reset_config() {
    set_config(Config::default());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        reset_config();
        let cfg = config();
        assert!(cfg.auto_update);
        assert!(!cfg.debug);
        assert_eq!(cfg.not_found_style, "color:red;");
    }

    #[test]
    fn test_update_and_reset() {
        update_config(|c| {
            c.auto_update = false;
            c.not_found_style = "color:orange;".into();
        });
        assert!(!config().auto_update);
        assert_eq!(config().not_found_style, "color:orange;");

        reset_config();
        assert_eq!(config(), Config::default());
    }
}
