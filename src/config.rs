//! Pipeline configuration
//!
//! This module provides the options controlling which optional passes run between
//! SSA construction and code generation.

use crate::ssa::DEFAULT_MAX_RESOLUTION_DEPTH;

/// Configuration for one compilation of a function
///
/// SSA construction and codegen always run. The passes in between, and the bound on
/// phi resolution, are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Remove phis that forward a single identifier (recommended: always true)
    /// Keeps the SSA form small; codegen output is the same either way
    pub enable_redundant_phi_elimination: bool,

    /// Check SSA uniqueness and phi completeness before codegen
    /// Catches malformed input early with a precise message
    pub enable_ssa_verification: bool,

    /// Maximum recursion depth when resolving a variable through predecessors (default: 4096)
    pub max_resolution_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enable_redundant_phi_elimination: true,
            enable_ssa_verification: true,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl PipelineConfig {
    /// Creates a minimal configuration for maximum throughput
    ///
    /// Skips every optional pass.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            enable_redundant_phi_elimination: false,
            enable_ssa_verification: false,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }

    /// Creates a comprehensive configuration running every pass
    #[must_use]
    pub fn comprehensive() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for production use
    ///
    /// Keeps phi elimination but trusts builders to produce well-formed SSA input.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enable_redundant_phi_elimination: true,
            enable_ssa_verification: false,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_presets() {
        let minimal = PipelineConfig::minimal();
        assert!(!minimal.enable_redundant_phi_elimination);
        assert!(!minimal.enable_ssa_verification);
        assert_eq!(minimal.max_resolution_depth, 4096);

        let comprehensive = PipelineConfig::comprehensive();
        assert!(comprehensive.enable_redundant_phi_elimination);
        assert!(comprehensive.enable_ssa_verification);

        let production = PipelineConfig::production();
        assert!(production.enable_redundant_phi_elimination);
        assert!(!production.enable_ssa_verification);
    }

    #[test]
    fn test_default_config() {
        assert_eq!(PipelineConfig::default(), PipelineConfig::comprehensive());
    }
}
