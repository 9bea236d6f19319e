//! Text-to-speech backend that shells out to an external program.
//!
//! Every request spawns the configured program once, writes the sentence to
//! its stdin and takes whatever it prints on stdout as the audio payload. A
//! request that is dropped mid-flight kills its child process.

use bytes::Bytes;
use lector_pool::{BoxError, Loader, ModelConfig, ProgressReporter, Synthesizer};
use std::process::Stdio;
use tokio::{io::AsyncWriteExt, process::Command};

const VOICE_PLACEHOLDER: &str = "{voice}";

/// A program plus its arguments, with `{voice}` placeholders left unexpanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    /// Splits `line` on whitespace. Returns `None` if it names no program.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_owned);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with every `{voice}` replaced by `voice`.
    pub fn args_for(&self, voice: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(VOICE_PLACEHOLDER, voice))
            .collect()
    }
}

/// [`Loader`] producing one [`CommandSynthesizer`] per worker.
pub struct CommandLoader {
    template: CommandTemplate,
}

impl CommandLoader {
    pub const fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl Loader for CommandLoader {
    type Synthesizer = CommandSynthesizer;

    async fn load(
        &self,
        worker_id: usize,
        config: &ModelConfig,
        progress: ProgressReporter,
    ) -> Result<CommandSynthesizer, BoxError> {
        progress.report(0, 1);
        let env = vec![
            ("LECTOR_MODEL_ID", config.model_id.clone()),
            ("LECTOR_DTYPE", config.dtype.to_string()),
            ("LECTOR_DEVICE", config.device.to_string()),
            ("LECTOR_WORKER_ID", worker_id.to_string()),
        ];
        progress.report(1, 1);
        Ok(CommandSynthesizer {
            template: self.template.clone(),
            env,
        })
    }
}

/// Runs the command template once per sentence.
pub struct CommandSynthesizer {
    template: CommandTemplate,
    env: Vec<(&'static str, String)>,
}

impl Synthesizer for CommandSynthesizer {
    async fn synthesize(&mut self, text: &str, voice: &str) -> Result<Bytes, BoxError> {
        let mut child = Command::new(self.template.program())
            .args(self.template.args_for(voice))
            .envs(self.env.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to run `{}`: {}", self.template.program(), e))?;

        let mut stdin = child.stdin.take().ok_or("child stdin unavailable")?;
        let input = text.as_bytes().to_vec();
        let feed = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };

        let ((), output) = tokio::try_join!(feed, child.wait_with_output())?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "`{}` exited with {}: {}",
                self.template.program(),
                output.status,
                stderr.trim()
            )
            .into());
        }
        if output.stdout.is_empty() {
            return Err(format!("`{}` produced no audio", self.template.program()).into());
        }

        Ok(Bytes::from(output.stdout))
    }
}
