use once_cell::sync::Lazy;
use serde::{
    Deserialize,
    Serialize
};

static DEFAULT_SETTINGS: Lazy<ComputationSettings> = Lazy::new(ComputationSettings::default);

/// Switches for the parallel paths and the result-preserving shortcuts of the
/// engine.
///
/// Settings are never mutated after construction; derive a variant with
/// struct update syntax or [`ComputationSettings::with_use_parallelism`].
/// Deserialization fills missing fields with their defaults, so a
/// configuration file may override any subset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputationSettings {
    pub use_parallel_lower_envelope: bool,
    pub use_parallel_upper_envelope: bool,
    pub parallel_envelope_threshold: usize,
    pub use_parallel_list_addition: bool,
    pub use_parallel_list_minimum: bool,
    pub use_parallel_list_maximum: bool,
    pub use_parallel_list_convolution: bool,
    pub parallel_list_threshold: usize,
    pub use_parallel_convolution: bool,
    pub convolution_parallelization_threshold: usize,
    pub use_convolution_partitioning: bool,
    pub convolution_partitioning_threshold: usize,
    pub use_parallel_compute_intervals: bool,
    pub use_parallel_insertion_compute_intervals: bool,
    pub parallel_compute_intervals_threshold: usize,
    pub use_parallel_extend: bool,
    pub use_parallel_sort_elements: bool,
    pub single_pass_convolution: bool,
    pub auto_optimize: bool,
    pub use_sub_additive_convolution_optimizations: bool,
    pub use_minimum_self_convolution_for_curves_with_infinities: bool,
    pub use_composition_optimizations: bool,
    pub use_convolution_isospeed_optimization: bool,
    pub use_by_sequence_convolution_isospeed_optimization: bool,
    pub use_convolution_super_isospeed_optimization: bool
}

impl Default for ComputationSettings {
    fn default() -> Self {
        ComputationSettings {
            use_parallel_lower_envelope: true,
            use_parallel_upper_envelope: true,
            parallel_envelope_threshold: 1_000,
            use_parallel_list_addition: true,
            use_parallel_list_minimum: true,
            use_parallel_list_maximum: true,
            use_parallel_list_convolution: true,
            parallel_list_threshold: 8,
            use_parallel_convolution: true,
            convolution_parallelization_threshold: 2_000,
            use_convolution_partitioning: true,
            convolution_partitioning_threshold: 50_000,
            use_parallel_compute_intervals: true,
            use_parallel_insertion_compute_intervals: true,
            parallel_compute_intervals_threshold: 5_000,
            use_parallel_extend: true,
            use_parallel_sort_elements: true,
            single_pass_convolution: true,
            auto_optimize: true,
            use_sub_additive_convolution_optimizations: true,
            use_minimum_self_convolution_for_curves_with_infinities: true,
            use_composition_optimizations: true,
            use_convolution_isospeed_optimization: true,
            use_by_sequence_convolution_isospeed_optimization: true,
            use_convolution_super_isospeed_optimization: true
        }
    }
}

impl ComputationSettings {
    /// Process-wide default, built on first use.
    pub fn default_settings() -> &'static ComputationSettings {
        &DEFAULT_SETTINGS
    }

    /// Copy with every parallel path switched on or off.
    pub fn with_use_parallelism(&self, use_parallelism: bool) -> ComputationSettings {
        ComputationSettings {
            use_parallel_lower_envelope: use_parallelism,
            use_parallel_upper_envelope: use_parallelism,
            use_parallel_list_addition: use_parallelism,
            use_parallel_list_minimum: use_parallelism,
            use_parallel_list_maximum: use_parallelism,
            use_parallel_list_convolution: use_parallelism,
            use_parallel_convolution: use_parallelism,
            use_parallel_compute_intervals: use_parallelism,
            use_parallel_insertion_compute_intervals: use_parallelism,
            use_parallel_extend: use_parallelism,
            use_parallel_sort_elements: use_parallelism,
            ..self.clone()
        }
    }

    /// Copy with every result-preserving shortcut switched off.
    pub fn without_optimizations(&self) -> ComputationSettings {
        ComputationSettings {
            single_pass_convolution: false,
            auto_optimize: false,
            use_sub_additive_convolution_optimizations: false,
            use_minimum_self_convolution_for_curves_with_infinities: false,
            use_composition_optimizations: false,
            use_convolution_isospeed_optimization: false,
            use_by_sequence_convolution_isospeed_optimization: false,
            use_convolution_super_isospeed_optimization: false,
            ..self.clone()
        }
    }
}
