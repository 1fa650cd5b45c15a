use std::io::Write;

use pairsmith::corpus::CorpusFile;

use crate::{LogArgs, input_output::OutputArgs};

/// Args for the boundaries command.
#[derive(clap::Args, Debug)]
pub struct BoundariesArgs {
    /// Input corpus file.
    input: String,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Desired number of chunks.
    #[arg(long, default_value = "8")]
    num_chunks: usize,

    /// Delimiters which chunks must never cut.
    #[arg(long = "special-token", default_values_t = ["<|endoftext|>".to_string()])]
    special_tokens: Vec<String>,

    #[command(flatten)]
    output: OutputArgs,
}

impl BoundariesArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(2)?;
        self.execute()
    }

    /// Write the chunk table; logging is already set up.
    fn execute(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut corpus = CorpusFile::open(&self.input)?;
        let boundaries = corpus.chunk_boundaries(self.num_chunks, &self.special_tokens)?;

        let mut writer = self.output.open_writer()?;
        for w in boundaries.windows(2) {
            writeln!(writer, "{}\t{}\t{}", w[0], w[1], w[1] - w[0])?;
        }
        writer.flush()?;

        Ok(())
    }
}
