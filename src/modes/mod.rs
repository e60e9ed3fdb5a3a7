pub mod menu;
pub mod play;
pub mod train;

pub use menu::prompt_resume;
pub use play::{PlayConfig, PlayMode};
pub use train::{TrainConfig, TrainMode};
