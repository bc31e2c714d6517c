use std::time::Duration;

use serde::{Deserialize, Serialize};
use vsearch_core::{MessageScreen, Orientation, Rgb};

use crate::block::BlockAssembler;
use crate::error::ConfigError;
use crate::runner::TrialRunner;
use crate::sampler::LocationSampler;
use crate::trial::TrialBuilder;

/// Raw experiment parameters, as read from a config file. Nothing here is
/// trusted until it has been turned into a [`SearchDesign`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default = "ExperimentConfig::default_experiment_name")]
    pub experiment_name: String,
    #[serde(default = "ExperimentConfig::default_trials_per_block")]
    pub trials_per_block: usize,
    #[serde(default = "ExperimentConfig::default_number_of_blocks")]
    pub number_of_blocks: usize,
    #[serde(default = "ExperimentConfig::default_set_sizes")]
    pub set_sizes: Vec<usize>,
    /// Edge length of each stimulus, used for X and Y
    #[serde(default = "ExperimentConfig::default_stim_size_deg")]
    pub stim_size_deg: f64,
    #[serde(default = "ExperimentConfig::default_orientations")]
    pub orientations: Vec<Orientation>,
    /// Positionally paired with `orientations`
    #[serde(default = "ExperimentConfig::default_keys")]
    pub keys: Vec<String>,
    #[serde(default = "ExperimentConfig::default_quit_key")]
    pub quit_key: String,
    #[serde(default = "ExperimentConfig::default_continue_key")]
    pub continue_key: String,
    #[serde(default = "ExperimentConfig::default_max_radius_deg")]
    pub max_radius_deg: f64,
    /// Minimum distance between stimulus centers, and from fixation.
    /// Should be greater than `stim_size_deg`.
    #[serde(default = "ExperimentConfig::default_min_distance_deg")]
    pub min_distance_deg: f64,
    /// `None` for fully random displays
    #[serde(default)]
    pub max_per_quadrant: Option<usize>,
    #[serde(default = "ExperimentConfig::default_iti_ms")]
    pub iti_ms: u64,
    #[serde(default = "ExperimentConfig::default_instructions")]
    pub instructions: Vec<String>,
    #[serde(default = "ExperimentConfig::default_break_text")]
    pub break_text: String,
    #[serde(default = "ExperimentConfig::default_end_text")]
    pub end_text: String,
    #[serde(default)]
    pub colors: ScreenColors,
}

impl ExperimentConfig {
    fn default_experiment_name() -> String {
        "VisualSearch".to_string()
    }
    fn default_trials_per_block() -> usize {
        10
    }
    fn default_number_of_blocks() -> usize {
        5
    }
    fn default_set_sizes() -> Vec<usize> {
        vec![2, 6, 10, 14, 18]
    }
    fn default_stim_size_deg() -> f64 {
        1.0
    }
    fn default_orientations() -> Vec<Orientation> {
        Orientation::ALL.to_vec()
    }
    fn default_keys() -> Vec<String> {
        Orientation::ALL.iter().map(|o| o.name().to_string()).collect()
    }
    fn default_quit_key() -> String {
        "q".to_string()
    }
    fn default_continue_key() -> String {
        "space".to_string()
    }
    fn default_max_radius_deg() -> f64 {
        6.0
    }
    fn default_min_distance_deg() -> f64 {
        2.0
    }
    fn default_iti_ms() -> u64 {
        1000
    }
    fn default_instructions() -> Vec<String> {
        vec![
            "Welcome to the experiment. Press space to begin.".to_string(),
            concat!(
                "In this experiment you will be searching for \"T\"s.\n\n",
                "Each trial will start with a blank screen. Then, several items will appear.\n\n",
                "One will be a \"T\" and the others will be offset \"L\"s.\n\n",
                "The \"T\" can appear in any orientation.\n\n",
                "Once you find the \"T\", press the arrow key associated with the top of the \"T\".\n\n",
                "For example, if the \"T\" looks normal, you would press the up arrow key.\n\n",
                "If the top of the T is pointed to the left, you would press the left arrow key.\n\n",
                "You will get breaks in between blocks.\n\n",
                "Press space to continue."
            )
            .to_string(),
        ]
    }
    fn default_break_text() -> String {
        "Please take a short break. Press space to continue.".to_string()
    }
    fn default_end_text() -> String {
        "The experiment is now over, please get your experimenter.".to_string()
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_name: Self::default_experiment_name(),
            trials_per_block: Self::default_trials_per_block(),
            number_of_blocks: Self::default_number_of_blocks(),
            set_sizes: Self::default_set_sizes(),
            stim_size_deg: Self::default_stim_size_deg(),
            orientations: Self::default_orientations(),
            keys: Self::default_keys(),
            quit_key: Self::default_quit_key(),
            continue_key: Self::default_continue_key(),
            max_radius_deg: Self::default_max_radius_deg(),
            min_distance_deg: Self::default_min_distance_deg(),
            max_per_quadrant: None,
            iti_ms: Self::default_iti_ms(),
            instructions: Self::default_instructions(),
            break_text: Self::default_break_text(),
            end_text: Self::default_end_text(),
            colors: ScreenColors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenColors {
    #[serde(default = "ScreenColors::default_background")]
    pub background: Rgb,
    #[serde(default = "ScreenColors::default_text")]
    pub text: Rgb,
    #[serde(default = "ScreenColors::default_break_background")]
    pub break_background: Rgb,
    #[serde(default = "ScreenColors::default_end_background")]
    pub end_background: Rgb,
    #[serde(default = "ScreenColors::default_end_text")]
    pub end_text: Rgb,
}

impl ScreenColors {
    fn default_background() -> Rgb {
        [128, 128, 128]
    }
    fn default_text() -> Rgb {
        [0, 0, 0]
    }
    fn default_break_background() -> Rgb {
        [204, 255, 204]
    }
    fn default_end_background() -> Rgb {
        [0, 0, 255]
    }
    fn default_end_text() -> Rgb {
        [255, 255, 255]
    }
}

impl Default for ScreenColors {
    fn default() -> Self {
        Self {
            background: Self::default_background(),
            text: Self::default_text(),
            break_background: Self::default_break_background(),
            end_background: Self::default_end_background(),
            end_text: Self::default_end_text(),
        }
    }
}

/// A validated, immutable experiment design.
///
/// Every configuration check runs here, once, so that nothing downstream can
/// discover a bad parameter mid-session. The only way to change a design is to
/// build a new one.
#[derive(Debug, Clone)]
pub struct SearchDesign {
    config: ExperimentConfig,
    assembler: BlockAssembler,
}

impl SearchDesign {
    pub fn new(config: ExperimentConfig) -> Result<Self, ConfigError> {
        if config.number_of_blocks == 0 {
            return Err(ConfigError::NoBlocks);
        }
        for (role, key) in [
            ("quit", &config.quit_key),
            ("continue", &config.continue_key),
        ] {
            if config.keys.contains(key) {
                return Err(ConfigError::ReservedKey {
                    role,
                    key: key.clone(),
                });
            }
        }
        if config.quit_key == config.continue_key {
            return Err(ConfigError::QuitIsContinue {
                key: config.quit_key.clone(),
            });
        }

        let sampler = LocationSampler::new(
            config.max_radius_deg,
            config.min_distance_deg,
            config.max_per_quadrant,
        )?;
        if let (Some(cap), Some(&largest)) =
            (config.max_per_quadrant, config.set_sizes.iter().max())
        {
            if largest > cap.saturating_mul(4) {
                return Err(ConfigError::QuadrantCapTooSmall {
                    cap,
                    set_size: largest,
                });
            }
        }

        let builder = TrialBuilder::new(sampler, config.orientations.clone(), config.keys.clone())?;
        let assembler =
            BlockAssembler::new(config.trials_per_block, config.set_sizes.clone(), builder)?;

        Ok(Self { config, assembler })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn assembler(&self) -> &BlockAssembler {
        &self.assembler
    }

    pub fn builder(&self) -> &TrialBuilder {
        self.assembler.builder()
    }

    pub fn trials_per_set_size(&self) -> usize {
        self.assembler.trials_per_set_size()
    }

    pub fn number_of_blocks(&self) -> usize {
        self.config.number_of_blocks
    }

    pub fn iti(&self) -> Duration {
        Duration::from_millis(self.config.iti_ms)
    }

    pub fn runner(&self, subject: impl Into<String>) -> TrialRunner {
        TrialRunner::new(
            subject,
            self.iti(),
            self.config.keys.clone(),
            self.config.quit_key.clone(),
        )
    }

    pub fn loading_screen(&self) -> MessageScreen {
        MessageScreen::new(
            "Loading...",
            self.config.colors.background,
            self.config.colors.text,
        )
        .without_input()
    }

    pub fn instruction_screens(&self) -> Vec<MessageScreen> {
        self.config
            .instructions
            .iter()
            .map(|text| {
                MessageScreen::new(
                    text.as_str(),
                    self.config.colors.background,
                    self.config.colors.text,
                )
            })
            .collect()
    }

    pub fn break_screen(&self) -> MessageScreen {
        MessageScreen::new(
            self.config.break_text.as_str(),
            self.config.colors.break_background,
            self.config.colors.text,
        )
    }

    pub fn end_screen(&self) -> MessageScreen {
        MessageScreen::new(
            self.config.end_text.as_str(),
            self.config.colors.end_background,
            self.config.colors.end_text,
        )
    }
}
