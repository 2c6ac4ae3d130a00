pub struct DefaultsConfig {
    pub output_dir: &'static str,
    pub cycles: usize,
    pub symmetry: &'static str,
    pub generator_program: &'static str,
    pub diffusion_steps: usize,
    pub num_designs: usize,
    pub staging_root: &'static str,
    pub poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
    pub terminator: &'static str,
    pub redesign_program: &'static str,
    pub redesign_chains: &'static str,
    pub num_sequences: usize,
    pub sampling_temperature: f64,
    pub seed: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: "outputs",
            cycles: 1,
            symmetry: "none",
            generator_program: "RFdiffusion/scripts/run_inference.py",
            diffusion_steps: 50,
            num_designs: 1,
            staging_root: "/dev/shm",
            poll_interval_ms: 100,
            max_poll_interval_ms: 2_000,
            terminator: "TER",
            redesign_program: "ProteinMPNN/protein_mpnn_run.py",
            redesign_chains: "B",
            num_sequences: 8,
            sampling_temperature: 0.1,
            seed: 37,
        }
    }
}
