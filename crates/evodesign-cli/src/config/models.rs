use evodesign::core::models::mask::MutabilityMask;
use evodesign::engine::config as core_config;
use std::path::PathBuf;

pub struct AppConfig {
    pub sequence: String,
    pub mask: MutabilityMask,
    pub reference_structure: Option<PathBuf>,
    pub reference_length: usize,
    pub cycles: usize,
    pub report_path: Option<PathBuf>,
    pub detector_program: Option<PathBuf>,
    pub core_config: core_config::DesignConfig,
}
