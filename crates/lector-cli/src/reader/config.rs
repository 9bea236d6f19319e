use super::command::CommandTemplate;
use anyhow::{Context, bail};
use clap::Parser;
use lector::{Address, DEFAULT_VOICE, Device, Dtype, Voice, WindowPolicy};
use lector_pool::{DEFAULT_MODEL_ID, DEFAULT_REQUEST_BUFFER_SIZE, ModelConfig};
use std::path::PathBuf;

/// Runtime configuration for the `lector` binary.
///
/// Every option can also be supplied through the environment variable named
/// in its help text, or through a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lector",
    version,
    about = "Reads a plain text document aloud, one batch of sentences at a time"
)]
pub struct CliArgs {
    /// Plain text document to read. Blank lines separate paragraphs.
    #[arg(value_name = "INPUT", required_unless_present = "list_voices")]
    pub input: Option<PathBuf>,

    /// Zero-based paragraph of the sentence to start from.
    ///
    /// Environment variable: `LECTOR_PARAGRAPH`
    #[arg(short, long, env = "LECTOR_PARAGRAPH", default_value_t = 0)]
    pub paragraph: usize,

    /// Zero-based sentence within `--paragraph` to start from.
    ///
    /// Environment variable: `LECTOR_SENTENCE`
    #[arg(short, long, env = "LECTOR_SENTENCE", default_value_t = 0)]
    pub sentence: usize,

    /// Number of sentences generated per batch.
    ///
    /// Environment variable: `LECTOR_BATCH_SIZE`
    #[arg(short, long, env = "LECTOR_BATCH_SIZE", default_value_t = 5)]
    pub batch_size: usize,

    /// Start each batch at the target sentence instead of centering on it.
    ///
    /// Environment variable: `LECTOR_FORWARD_ONLY`
    #[arg(long, env = "LECTOR_FORWARD_ONLY", default_value_t = false)]
    pub forward_only: bool,

    /// Keep generating the following batches until the end of the document.
    ///
    /// Environment variable: `LECTOR_FOLLOW`
    #[arg(short, long, env = "LECTOR_FOLLOW", default_value_t = false)]
    pub follow: bool,

    /// Voice identifier handed to the text-to-speech command.
    ///
    /// Environment variable: `LECTOR_VOICE`
    #[arg(long, env = "LECTOR_VOICE", default_value_t = String::from(DEFAULT_VOICE))]
    pub voice: String,

    /// Accept a `--voice` that is not in the built-in voice table.
    #[arg(long, default_value_t = false)]
    pub allow_unknown_voice: bool,

    /// Number of concurrent generation workers.
    ///
    /// Each worker runs its own copy of the text-to-speech command.
    ///
    /// Environment variable: `LECTOR_NUM_WORKERS`
    #[arg(short = 'w', long, env = "LECTOR_NUM_WORKERS", default_value_t = 1)]
    pub num_workers: usize,

    /// Model checkpoint exported to the command as `LECTOR_MODEL_ID`.
    ///
    /// Environment variable: `LECTOR_MODEL_ID`
    #[arg(long, env = "LECTOR_MODEL_ID", default_value_t = String::from(DEFAULT_MODEL_ID))]
    pub model_id: String,

    /// Model weight precision: fp32, fp16, q8, q4 or q4f16.
    ///
    /// Environment variable: `LECTOR_DTYPE`
    #[arg(long, env = "LECTOR_DTYPE", default_value_t = String::from("q8"))]
    pub dtype: String,

    /// Inference device: cpu or gpu.
    ///
    /// Environment variable: `LECTOR_DEVICE`
    #[arg(long, env = "LECTOR_DEVICE", default_value_t = String::from("cpu"))]
    pub device: String,

    /// Text-to-speech command line.
    ///
    /// The sentence is written to the command's stdin and its stdout is saved
    /// as the sentence's audio. `{voice}` in any argument is replaced by the
    /// selected voice.
    ///
    /// Example: "piper --model en_US-{voice}.onnx --output_file -"
    ///
    /// Environment variable: `LECTOR_COMMAND`
    #[arg(short, long, env = "LECTOR_COMMAND")]
    pub command: Option<String>,

    /// Directory the generated audio files are written to.
    ///
    /// Environment variable: `LECTOR_OUT_DIR`
    #[arg(short, long, env = "LECTOR_OUT_DIR", default_value = "lector-out")]
    pub out_dir: PathBuf,

    /// File extension of the generated audio files.
    ///
    /// Environment variable: `LECTOR_EXTENSION`
    #[arg(long, env = "LECTOR_EXTENSION", default_value_t = String::from("wav"))]
    pub extension: String,

    /// Print the built-in voice table and exit.
    #[arg(long, default_value_t = false)]
    pub list_voices: bool,
}

#[derive(Debug, Clone)]
pub enum AppConfig {
    ListVoices,
    Read(ReadConfig),
}

#[derive(Debug, Clone)]
pub struct ReadConfig {
    pub input: PathBuf,
    pub start: Address,
    pub batch_size: usize,
    pub policy: WindowPolicy,
    pub follow: bool,
    pub voice: String,
    pub num_workers: usize,
    pub model: ModelConfig,
    pub command: CommandTemplate,
    pub out_dir: PathBuf,
    pub extension: String,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.list_voices {
            return Ok(Self::ListVoices);
        }

        let Some(input) = args.input else {
            bail!("INPUT is required unless --list-voices is given");
        };

        if args.batch_size == 0 {
            bail!("LECTOR_BATCH_SIZE must be greater than 0");
        }

        if args.num_workers == 0 {
            bail!("LECTOR_NUM_WORKERS must be greater than 0");
        }

        if !args.allow_unknown_voice && Voice::find(&args.voice).is_none() {
            bail!(
                "Unknown voice `{}` (see --list-voices, or pass --allow-unknown-voice)",
                args.voice
            );
        }

        let command_line = args.command.as_deref().unwrap_or_default();
        let Some(command) = CommandTemplate::parse(command_line) else {
            bail!("LECTOR_COMMAND must name a text-to-speech program");
        };

        let extension = args.extension.trim_start_matches('.').to_owned();
        if extension.is_empty() {
            bail!("LECTOR_EXTENSION must not be empty");
        }

        let dtype: Dtype = args.dtype.parse().context("invalid LECTOR_DTYPE")?;
        let device: Device = args.device.parse().context("invalid LECTOR_DEVICE")?;

        let policy = if args.forward_only {
            WindowPolicy::ForwardOnly
        } else {
            WindowPolicy::Centered
        };

        Ok(Self::Read(ReadConfig {
            input,
            start: Address::new(args.paragraph, args.sentence),
            batch_size: args.batch_size,
            policy,
            follow: args.follow,
            voice: args.voice,
            num_workers: args.num_workers,
            model: ModelConfig {
                model_id: args.model_id,
                dtype,
                device,
                request_buffer_size: DEFAULT_REQUEST_BUFFER_SIZE,
            },
            command,
            out_dir: args.out_dir,
            extension,
        }))
    }
}
