mod llm;
mod phrases;
mod quiz;
mod session;
mod speech;

use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::llm::LlmClient;
use crate::phrases::Delimiter;
use crate::session::Session;
use crate::speech::Speech;

#[derive(Deserialize, Debug)]
struct Environment {
    phrase_file: PathBuf,
    anthropic_api_key: String,
    /// Optional; when absent the speech command is disabled.
    elevenlabs_api_key: Option<String>,
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "phrase-drill",
    about = "Interactive English-phrase study drills"
)]
struct Args {
    /// Delimiter of the phrase file (comma or tab)
    #[structopt(short, long, default_value = "comma")]
    delimiter: Delimiter,

    /// Directory for cached phrase audio (defaults to the platform cache dir)
    #[structopt(short, long)]
    audio_dir: Option<PathBuf>,

    /// Path to model/voice configuration TOML file
    #[structopt(short = "c", long)]
    config: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct Config {
    generation_model: String,
    judge_model: String,
    tts_voice_id: String,
    tts_model_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation_model: "claude-sonnet-4-20250514".to_owned(),
            judge_model: "claude-sonnet-4-20250514".to_owned(),
            tts_voice_id: "JBFqnCBsd6RMkjVDRZzb".to_owned(),
            tts_model_id: "eleven_flash_v2_5".to_owned(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let environment = envy::from_env::<Environment>()
        .context("Missing required environment configuration")?;
    let args = Args::from_args();

    let config: Config = match &args.config {
        Some(path) => toml::from_str(
            &tokio::fs::read_to_string(path)
                .await
                .context("Failed to read config file")?,
        )
        .context("Failed to parse config TOML")?,
        None => Config::default(),
    };

    let phrases = phrases::load_phrases(&environment.phrase_file, args.delimiter)?;

    let audio_dir = match args.audio_dir {
        Some(dir) => dir,
        None => default_audio_dir()?,
    };
    let speech = environment.elevenlabs_api_key.map(|api_key| {
        Speech::new(
            api_key,
            config.tts_voice_id.clone(),
            config.tts_model_id.clone(),
            audio_dir,
        )
    });

    let session = Session::new(
        LlmClient::new(environment.anthropic_api_key),
        speech,
        phrases,
        config.generation_model.clone(),
        config.judge_model.clone(),
    );
    session.run().await
}

fn default_audio_dir() -> anyhow::Result<PathBuf> {
    let cache_base = dirs::cache_dir().context("Failed to determine cache directory")?;
    Ok(cache_base.join(env!("CARGO_CRATE_NAME")))
}
