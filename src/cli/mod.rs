use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wingman", version, about = "AI texting wingman: reply help and screenshot-grounded suggestions")]
pub struct Args {
    /// Directory for profiles.json and turn artifacts.
    #[arg(long, default_value = ".")]
    pub data_dir: String,

    #[arg(long)]
    pub model: Option<String>,

    /// Profile to chat as. A fresh id starts the onboarding flow.
    #[arg(long, default_value = "local")]
    pub user: String,

    /// Response style: normal, bold, super-bold, spicy.
    #[arg(long, default_value = "normal")]
    pub style: String,

    /// Message length slider (1-3).
    #[arg(long)]
    pub length: Option<u8>,

    /// Emoji usage slider (1-3).
    #[arg(long)]
    pub emoji: Option<u8>,

    /// Flirtiness slider (1-3).
    #[arg(long)]
    pub flirt: Option<u8>,

    /// Serve degraded trial-tier responses.
    #[arg(long, default_value_t = false)]
    pub trial: bool,

    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,
}
