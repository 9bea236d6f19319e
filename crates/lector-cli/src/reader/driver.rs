//! Batch-by-batch reading loop.
//!
//! Starting from a target sentence, the driver selects a batch, generates it
//! on the pool, writes one file per sentence and, when following, moves on to
//! the sentence right after the batch. Follow-up batches always extend
//! forward from their start so the document is covered exactly once.

use super::{config::ReadConfig, telemetry};
use anyhow::{Context, bail};
use bytes::Bytes;
use lector::{Address, AddressableSequence, Batch, Document, next_batch_start, select_batch};
use lector_pool::TaskPool;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Instant,
};

/// Totals for one reading run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadSummary {
    pub batches: usize,
    pub sentences: usize,
}

pub struct Reader<'a> {
    document: &'a Document,
    sequence: AddressableSequence,
    pool: &'a TaskPool,
    config: &'a ReadConfig,
}

impl<'a> Reader<'a> {
    pub fn new(document: &'a Document, pool: &'a TaskPool, config: &'a ReadConfig) -> Self {
        Self {
            document,
            sequence: document.addresses(),
            pool,
            config,
        }
    }

    /// Reads from the configured start until the first batch is done, or
    /// until the end of the document when following.
    pub async fn run(&self) -> anyhow::Result<ReadSummary> {
        if self.sequence.is_empty() {
            bail!("{} contains no sentences", self.config.input.display());
        }
        if !self.sequence.contains(self.config.start) {
            bail!(
                "Sentence {} is not in {} (last sentence is {})",
                self.config.start,
                self.config.input.display(),
                self.sequence.last().unwrap_or_default()
            );
        }

        tokio::fs::create_dir_all(&self.config.out_dir)
            .await
            .with_context(|| format!("cannot create {}", self.config.out_dir.display()))?;

        let mut summary = ReadSummary::default();
        let mut target = Some(self.config.start);
        let mut force_forward = false;

        while let Some(start) = target {
            let batch = select_batch(
                start,
                &self.sequence,
                self.config.batch_size,
                self.config.policy,
                force_forward,
            );

            self.read_batch(&batch).await?;
            summary.batches += 1;
            summary.sentences += batch.len();

            if !self.config.follow {
                break;
            }
            target = next_batch_start(&batch, &self.sequence);
            force_forward = true;
        }

        Ok(summary)
    }

    async fn read_batch(&self, batch: &Batch) -> anyhow::Result<()> {
        let units = self.document.batch_sentences(batch);
        let total = units.len();

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Generating {} sentences from {} to {}",
            total,
            batch.first().unwrap_or_default(),
            batch.last().unwrap_or_default()
        );

        telemetry::record_batch_size(total as f64);
        let started = Instant::now();

        let audio = match self
            .pool
            .generate_batch(&units, &self.config.voice, |_done| {
                #[cfg(feature = "tracing")]
                tracing::debug!("Generated {}/{}", _done, total);
            })
            .await
        {
            Ok(audio) => audio,
            Err(e) => {
                telemetry::increment_generation_errors();
                return Err(e).context("batch generation failed");
            }
        };

        telemetry::increment_units_generated(total as u64);
        telemetry::record_batch_duration(started.elapsed().as_secs_f64() * 1000.0);

        for path in self.write_batch(batch, &units, &audio).await? {
            println!("{}", path.display());
        }
        Ok(())
    }

    async fn write_batch(
        &self,
        batch: &Batch,
        units: &[String],
        audio: &HashMap<String, Bytes>,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(batch.len());
        for (address, text) in batch.iter().zip(units) {
            let payload = audio
                .get(text)
                .with_context(|| format!("no audio generated for sentence {address}"))?;
            let path = output_path(&self.config.out_dir, address, &self.config.extension);
            tokio::fs::write(&path, payload)
                .await
                .with_context(|| format!("cannot write {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

/// `<dir>/p<paragraph>-s<sentence>.<extension>`, zero-padded so files sort in
/// reading order.
pub fn output_path(dir: &Path, address: Address, extension: &str) -> PathBuf {
    dir.join(format!(
        "p{:04}-s{:04}.{}",
        address.paragraph, address.sentence, extension
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::command::CommandTemplate;
    use lector::WindowPolicy;
    use lector_pool::{BoxError, Loader, ModelConfig, ProgressReporter, Synthesizer};

    struct Upper;

    impl Synthesizer for Upper {
        async fn synthesize(&mut self, text: &str, _voice: &str) -> Result<Bytes, BoxError> {
            Ok(Bytes::from(text.to_uppercase()))
        }
    }

    struct UpperLoader;

    impl Loader for UpperLoader {
        type Synthesizer = Upper;

        async fn load(
            &self,
            _worker_id: usize,
            _config: &ModelConfig,
            _progress: ProgressReporter,
        ) -> Result<Upper, BoxError> {
            Ok(Upper)
        }
    }

    const TEXT: &str = "One. Two. Three.\n\nFour. Five.\n\nSix.";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lector-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn read_config(out_dir: PathBuf, start: Address, follow: bool) -> ReadConfig {
        ReadConfig {
            input: PathBuf::from("book.txt"),
            start,
            batch_size: 3,
            policy: WindowPolicy::Centered,
            follow,
            voice: "af_heart".to_string(),
            num_workers: 2,
            model: ModelConfig::default(),
            command: CommandTemplate::parse("unused").unwrap(),
            out_dir,
            extension: "raw".to_string(),
        }
    }

    async fn pool() -> TaskPool {
        let mut pool = TaskPool::new();
        pool.initialize(2, UpperLoader, ModelConfig::default(), |_| {})
            .await
            .unwrap();
        pool
    }

    fn written(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn output_paths_sort_in_reading_order() {
        let dir = Path::new("out");
        let a = output_path(dir, Address::new(0, 12), "wav");
        let b = output_path(dir, Address::new(1, 2), "wav");
        assert_eq!(a, Path::new("out/p0000-s0012.wav"));
        assert!(a < b);
    }

    #[tokio::test]
    async fn single_batch_centers_on_target() {
        let dir = scratch_dir("single");
        let document = Document::from_text(TEXT);
        let pool = pool().await;
        let config = read_config(dir.clone(), Address::new(1, 0), false);

        let summary = Reader::new(&document, &pool, &config).run().await.unwrap();

        assert_eq!(summary, ReadSummary { batches: 1, sentences: 3 });
        assert_eq!(
            written(&dir),
            ["p0000-s0002.raw", "p0001-s0000.raw", "p0001-s0001.raw"]
        );
        assert_eq!(std::fs::read(dir.join("p0001-s0000.raw")).unwrap(), b"FOUR.");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn follow_reads_to_the_end() {
        let dir = scratch_dir("follow");
        let document = Document::from_text(TEXT);
        let pool = pool().await;
        let config = read_config(dir.clone(), Address::new(0, 1), true);

        let summary = Reader::new(&document, &pool, &config).run().await.unwrap();

        // (0,0)..(0,2), then (1,0)..(2,0).
        assert_eq!(summary, ReadSummary { batches: 2, sentences: 6 });
        assert_eq!(written(&dir).len(), 6);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn rejects_targets_outside_the_document() {
        let dir = scratch_dir("missing");
        let document = Document::from_text(TEXT);
        let pool = pool().await;
        let config = read_config(dir, Address::new(2, 1), false);

        assert!(Reader::new(&document, &pool, &config).run().await.is_err());
    }

    #[tokio::test]
    async fn rejects_empty_documents() {
        let dir = scratch_dir("empty");
        let document = Document::from_text("\n\n   \n");
        let pool = pool().await;
        let config = read_config(dir, Address::new(0, 0), false);

        assert!(Reader::new(&document, &pool, &config).run().await.is_err());
    }
}
