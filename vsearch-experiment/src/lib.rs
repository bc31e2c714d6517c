pub mod block;
pub mod config;
pub mod error;
pub mod io;
pub mod runner;
pub mod sampler;
pub mod session;
pub mod test_support;
pub mod trial;
pub use block::BlockAssembler;
pub use config::{ExperimentConfig, ScreenColors, SearchDesign};
pub use error::{ConfigError, Error, Result, SamplingError};
pub use io::{DataSink, Renderer, ResponseSource};
pub use runner::{TrialOutcome, TrialRunner};
pub use sampler::{sample_locations, LocationSampler, MAX_ATTEMPTS};
pub use session::{Session, SessionOutcome};
pub use trial::TrialBuilder;
