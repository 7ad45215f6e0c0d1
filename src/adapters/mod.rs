pub mod audio_cpal;
pub mod config_store;
pub mod gateway;
pub mod playback;
pub mod terminal;

pub use audio_cpal::CpalRecorder;
pub use config_store::TomlConfigStore;
pub use gateway::ApiGatewayClient;
pub use playback::RodioPlayer;
pub use terminal::TerminalPresenter;
