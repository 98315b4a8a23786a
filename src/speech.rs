use anyhow::{Context, Result};
use futures_util::StreamExt;
use serde::Serialize;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize)]
struct ElevenLabsRequest {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// ElevenLabs text-to-speech with an on-disk mp3 cache. Constructed only
/// when an API key is configured.
pub struct Speech {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    audio_dir: PathBuf,
}

impl Speech {
    pub fn new(api_key: String, voice_id: String, model_id: String, audio_dir: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            voice_id,
            model_id,
            audio_dir,
        }
    }

    /// Plays the cached audio for `text`, synthesizing it first on a cache
    /// miss. Blocks until playback finishes.
    pub async fn speak(&self, text: &str) -> Result<()> {
        let path = self.cache_path(text);
        if !has_cached_audio(&path) {
            tokio::fs::create_dir_all(&self.audio_dir)
                .await
                .context("Failed to create audio cache directory")?;
            self.synthesize(text, &path).await?;
        }
        play_file(&path)
    }

    fn cache_path(&self, text: &str) -> PathBuf {
        self.audio_dir
            .join(format!("{}.mp3", text.replace([' ', '/', '\\'], "_")))
    }

    // The cache path only ever holds fully written audio: bytes are streamed
    // to a part file first and renamed into place once the download is
    // complete, so a failure mid-stream cannot poison the cache.
    async fn synthesize(&self, text: &str, file_path: &Path) -> Result<()> {
        let request_body = ElevenLabsRequest {
            text: text.to_owned(),
            model_id: self.model_id.clone(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        let response = self
            .client
            .post(format!(
                "https://api.elevenlabs.io/v1/text-to-speech/{}",
                self.voice_id
            ))
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to ElevenLabs API")?
            .error_for_status()
            .context("ElevenLabs API error")?;

        let part_path = file_path.with_extension("part");
        if let Err(error) = write_audio(response, &part_path).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(error);
        }

        tokio::fs::rename(&part_path, file_path)
            .await
            .context("Failed to move audio file into place")?;

        Ok(())
    }
}

fn has_cached_audio(path: &Path) -> bool {
    path.metadata().is_ok_and(|metadata| metadata.len() > 0)
}

async fn write_audio(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .await
        .context("Failed to create audio file")?;

    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed to read chunk from response")?;
        file.write_all(&chunk)
            .await
            .context("Failed to write chunk to file")?;
    }

    file.flush().await.context("Failed to flush audio file")?;

    Ok(())
}

fn play_file(path: &Path) -> Result<()> {
    let (_stream, stream_handle) =
        rodio::OutputStream::try_default().context("Failed to open audio output device")?;
    let sink = rodio::Sink::try_new(&stream_handle).context("Failed to create audio sink")?;

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open cached audio file `{}`", path.display()))?;
    let source =
        rodio::Decoder::new(BufReader::new(file)).context("Failed to decode audio file")?;

    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}
