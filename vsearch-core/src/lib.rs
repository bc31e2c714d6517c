pub mod geometry;
pub mod screen;
pub mod stimulus;
pub mod trial;

pub use geometry::{Point, Quadrant};
pub use screen::{MessageScreen, Rgb};
pub use stimulus::{Orientation, SearchItem, Stimulus, StimulusKind};
pub use trial::{KeyPress, Trial, TrialRecord};
