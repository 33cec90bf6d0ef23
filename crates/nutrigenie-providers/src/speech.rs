use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nutrigenie_common::{Error, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Microphone capture is cut off after this long.
pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Speech capture and synthesis, delegated wholesale to external services.
///
/// Handles are constructed explicitly and shut down explicitly; there are
/// no process-global engine singletons.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Capture audio and return the transcript.
    async fn listen(&self) -> Result<String>;

    /// Play `text` as spoken audio.
    async fn speak(&self, text: &str) -> Result<()>;

    /// Release any resources held by the service.
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// `SpeechService` backed by external commands, the way media conversion
/// shells out to ffmpeg. The listen command prints a transcript on stdout;
/// the speak command reads text from stdin.
pub struct CommandSpeech {
    listen_command: Vec<String>,
    speak_command: Vec<String>,
    listen_timeout: Duration,
}

impl CommandSpeech {
    pub fn new(listen_command: Vec<String>, speak_command: Vec<String>) -> Result<Self> {
        if listen_command.is_empty() || speak_command.is_empty() {
            return Err(Error::Speech(
                "speech commands must not be empty (set speech.listen_command and speech.speak_command)"
                    .into(),
            ));
        }

        Ok(Self {
            listen_command,
            speak_command,
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
        })
    }

    pub fn with_listen_timeout(mut self, timeout: Duration) -> Self {
        self.listen_timeout = timeout;
        self
    }
}

#[async_trait]
impl SpeechService for CommandSpeech {
    async fn listen(&self) -> Result<String> {
        debug!("capturing speech via {:?}", self.listen_command[0]);

        let output = tokio::time::timeout(
            self.listen_timeout,
            Command::new(&self.listen_command[0])
                .args(&self.listen_command[1..])
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                // Timing out drops the output future; the capture process
                // must die with it instead of holding the microphone.
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            Error::Speech(format!(
                "speech capture timed out after {}s",
                self.listen_timeout.as_secs()
            ))
        })?
        .map_err(|e| Error::Speech(format!("speech capture command failed: {e}")))?;

        if !output.status.success() {
            return Err(Error::Speech(format!(
                "speech capture command exited with {}",
                output.status
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(Error::Speech("could not understand the audio".into()));
        }

        Ok(transcript)
    }

    async fn speak(&self, text: &str) -> Result<()> {
        debug!("synthesizing speech via {:?}", self.speak_command[0]);

        let mut child = Command::new(&self.speak_command[0])
            .args(&self.speak_command[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Speech(format!("speech synthesis command failed: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| Error::Speech(format!("failed to write synthesis input: {e}")))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Speech(format!("speech synthesis command failed: {e}")))?;

        if !status.success() {
            return Err(Error::Speech(format!(
                "speech synthesis command exited with {status}"
            )));
        }

        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        info!("speech service shut down");
        Ok(())
    }
}
