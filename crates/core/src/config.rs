use std::path::PathBuf;
use std::time::Duration;

/// Remote service configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local development setup where
/// the synthesis services run on their stock ports. Override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Video-synthesis API base URL.
    pub video_api_url: String,
    /// File server fronting the video-synthesis service.
    pub video_file_server_url: String,
    /// Speech-synthesis API base URL.
    pub speech_api_url: String,
    /// File server fronting the speech-synthesis service.
    pub speech_file_server_url: String,
    /// Local working directory for generated audio and downloaded results.
    pub work_dir: PathBuf,
    /// When set, fixed test assets replace live audio/video paths so the
    /// pipeline can be exercised without a GPU box.
    pub dev_mode: bool,
    /// Scheduler cadence between polling cycles.
    pub poll_interval: Duration,
}

impl ServiceConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `VIDEO_API_URL`           | `http://127.0.0.1:8383`  |
    /// | `VIDEO_FILE_SERVER_URL`   | `http://127.0.0.1:8385`  |
    /// | `SPEECH_API_URL`          | `http://127.0.0.1:18180` |
    /// | `SPEECH_FILE_SERVER_URL`  | `http://127.0.0.1:18181` |
    /// | `WORK_DIR`                | `./data`                 |
    /// | `DEV_MODE`                | `false`                  |
    /// | `POLL_INTERVAL_SECS`      | `2`                      |
    pub fn from_env() -> Self {
        let video_api_url = env_or("VIDEO_API_URL", "http://127.0.0.1:8383");
        let video_file_server_url = env_or("VIDEO_FILE_SERVER_URL", "http://127.0.0.1:8385");
        let speech_api_url = env_or("SPEECH_API_URL", "http://127.0.0.1:18180");
        let speech_file_server_url = env_or("SPEECH_FILE_SERVER_URL", "http://127.0.0.1:18181");

        let work_dir = PathBuf::from(env_or("WORK_DIR", "./data"));

        let dev_mode = matches!(
            env_or("DEV_MODE", "false").to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        let poll_interval_secs: u64 = env_or("POLL_INTERVAL_SECS", "2")
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        Self {
            video_api_url,
            video_file_server_url,
            speech_api_url,
            speech_file_server_url,
            work_dir,
            dev_mode,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }
}

/// Read an environment variable, falling back to a default.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
