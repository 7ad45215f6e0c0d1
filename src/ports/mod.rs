pub mod audio;
pub mod config;
pub mod gateway;
pub mod output;
pub mod playback;

pub use audio::Recorder;
pub use config::ConfigStore;
pub use gateway::TranslationGateway;
pub use output::Presenter;
pub use playback::AudioPlayer;
