use std::{collections::BTreeMap, io::Write};

use base64::{Engine, engine::general_purpose::STANDARD};
use pairsmith::{
    BpeVocab,
    TrainerOptions,
    pretokenize::{DecodePolicy, GPT2_PRETOKENIZE_PATTERN},
};

use crate::{LogArgs, input_output::OutputArgs};

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Input corpus file.
    input: String,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Target vocab size; bytes and special tokens included.
    #[arg(long, default_value = "10000")]
    vocab_size: usize,

    /// Special tokens; ids are assigned in the order given.
    #[arg(long = "special-token", default_values_t = ["<|endoftext|>".to_string()])]
    special_tokens: Vec<String>,

    /// Number of corpus chunks (and threads); defaults to the available parallelism.
    #[arg(long)]
    num_chunks: Option<usize>,

    /// Pre-tokenization regex.
    #[arg(long, default_value_t = GPT2_PRETOKENIZE_PATTERN.as_str().to_string())]
    regex: String,

    /// Replace invalid UTF-8 with U+FFFD, rather than dropping it.
    #[arg(long)]
    replace_invalid: bool,

    #[command(flatten)]
    output: OutputArgs,
}

/// The JSON output of the train command.
///
/// Byte strings are base64 encoded.
#[derive(Debug, serde::Serialize)]
pub struct VocabSummary {
    /// The number of tokens.
    pub vocab_size: usize,

    /// The special tokens, in id order.
    pub special_tokens: Vec<String>,

    /// ``{ id -> bytes }``.
    pub vocab: BTreeMap<u32, String>,

    /// ``(left bytes, right bytes)``, in the order they were learned.
    pub merges: Vec<(String, String)>,
}

impl VocabSummary {
    /// Summarize a trained vocabulary.
    pub fn new(vocab: &BpeVocab<u32>) -> Self {
        Self {
            vocab_size: vocab.len(),
            special_tokens: vocab
                .special_tokens()
                .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
                .collect(),
            vocab: vocab
                .iter()
                .map(|(token, bytes)| (token, STANDARD.encode(bytes)))
                .collect(),
            merges: vocab
                .merges_as_bytes()
                .into_iter()
                .map(|(a, b)| (STANDARD.encode(a), STANDARD.encode(b)))
                .collect(),
        }
    }
}

impl TrainArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;
        self.execute()
    }

    /// Train and write the summary; logging is already set up.
    fn execute(&self) -> Result<(), Box<dyn std::error::Error>> {
        let decode_policy = if self.replace_invalid {
            DecodePolicy::Replace
        } else {
            DecodePolicy::Ignore
        };

        let options = TrainerOptions::new(self.vocab_size)
            .with_special_tokens(&self.special_tokens)
            .with_num_chunks(self.num_chunks)
            .with_pattern(self.regex.clone())
            .with_decode_policy(decode_policy);

        log::info!("Training on {}", self.input);
        let vocab: BpeVocab<u32> = options
            .train_path::<u32, u64>(&self.input)
            .inspect_err(|err| log::error!("training failed ({:?} phase): {err}", err.phase()))?;

        log::info!(
            "Vocabulary Size: {} ({} merges)",
            vocab.len(),
            vocab.merges().len()
        );

        if let Some(path) = &self.output.output {
            log::info!("output: {}", path);
        }
        let mut writer = self.output.open_writer()?;
        serde_json::to_writer_pretty(&mut writer, &VocabSummary::new(&vocab))?;
        writeln!(writer)?;
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempdir::TempDir;

    use super::*;
    use crate::{Args, commands::Commands};

    #[test]
    fn test_vocab_summary() {
        let vocab: BpeVocab<u32> = TrainerOptions::new(258)
            .with_special_tokens(["<|endoftext|>"])
            .train_from_bytes::<u32, u64>(b"ab<|endoftext|>ab")
            .unwrap();

        let summary = VocabSummary::new(&vocab);
        assert_eq!(summary.vocab_size, 258);
        assert_eq!(summary.special_tokens, vec!["<|endoftext|>"]);
        assert_eq!(summary.vocab[&97], "YQ==");
        assert_eq!(summary.vocab[&257], "YWI=");
        assert_eq!(summary.merges, vec![("YQ==".to_string(), "Yg==".to_string())]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["vocab_size"], 258);
        assert_eq!(json["merges"][0][1], "Yg==");
    }

    #[test]
    fn test_train_to_output_file() {
        let dir = TempDir::new("pairsmith_train").unwrap();
        let input = dir.path().join("corpus.txt");
        let output = dir.path().join("vocab.json");
        std::fs::write(
            &input,
            "low low low low low lower lower widest widest widest \
             newest newest newest newest newest newest",
        )
        .unwrap();

        let args = Args::try_parse_from([
            "pairsmith",
            "train",
            input.to_str().unwrap(),
            "--vocab-size",
            "263",
            "--num-chunks",
            "2",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Train(train) = &args.command else {
            panic!("expected the train command: {:?}", args.command);
        };
        train.execute().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["vocab_size"], 263);
        assert_eq!(json["special_tokens"][0], "<|endoftext|>");
        assert_eq!(json["merges"].as_array().unwrap().len(), 6);
        // ("s", "t")
        assert_eq!(json["merges"][0][0], "cw==");
        assert_eq!(json["merges"][0][1], "dA==");
    }

    #[test]
    fn test_train_missing_input() {
        let dir = TempDir::new("pairsmith_train").unwrap();
        let input = dir.path().join("missing.txt");

        let args = Args::try_parse_from(["pairsmith", "train", input.to_str().unwrap()]).unwrap();
        let Commands::Train(train) = &args.command else {
            panic!("expected the train command: {:?}", args.command);
        };
        let err = train.execute().unwrap_err();
        assert!(err.to_string().contains("failed to open corpus"), "{err}");
    }
}
