use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use seqtok::{
    BuiltinVocabulary, ConfiguredTokenizer, GraphemeMode, Phonemizer, SharedPhonemizer, TokenIndex,
    Tokenizer, VocabularyConfig, VocabularyTable,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::{exit, Command, Output, Stdio};
use std::thread;
use tracing::*;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    globals: Globals,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Globals {
    /// Read the vocabulary from a JSON configuration file instead of using a built-in one
    #[arg(short, long, value_name = "FILE", global = true, env = "SEQTOK_CONFIG")]
    config: Option<PathBuf>,

    /// The built-in vocabulary to use when no configuration file is given
    #[arg(
        short,
        long,
        value_name = "NAME",
        global = true,
        default_value = "indonesian",
        value_parser = parse_builtin
    )]
    vocab: BuiltinVocabulary,

    /// Phonemize text with this external program, which switches grapheme vocabularies to
    /// phonemized mode.
    ///
    /// The program gets the (lowercased, filtered) text on stdin and must print one phoneme
    /// symbol per line on stdout.
    #[arg(long, value_name = "CMD", global = true)]
    phonemizer: Option<String>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize text into a padded batch, printed as JSON on stdout
    Tokenize {
        /// The text to tokenize, one sequence per argument.
        ///
        /// If no text is given, each line read from stdin is tokenized as one sequence.
        text: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Translate a sequence of indices back into text
    Decode {
        /// The indices to decode.  Padding is skipped.
        #[arg(required = true)]
        indices: Vec<TokenIndex>,

        /// Print one token per line instead of joining them together
        #[arg(long)]
        tokens: bool,
    },

    /// List every token of the vocabulary with its index
    Vocab,
}

fn parse_builtin(name: &str) -> Result<BuiltinVocabulary, String> {
    BuiltinVocabulary::from_name(name).map_err(|e| e.to_string())
}

impl Globals {
    fn load_tokenizer(&self) -> anyhow::Result<ConfiguredTokenizer> {
        let mut config = match &self.config {
            Some(path) => VocabularyConfig::load(path)?,
            None => VocabularyConfig::builtin(self.vocab),
        };

        let phonemizer = self
            .phonemizer
            .as_deref()
            .map(CommandPhonemizer::new)
            .transpose()?
            .map(SharedPhonemizer::new);

        if phonemizer.is_some() {
            match &mut config {
                VocabularyConfig::Grapheme { mode, .. } => *mode = GraphemeMode::Phonemized,
                VocabularyConfig::MultiChar(_) => {
                    warn!("Multi-character vocabularies don't use a phonemizer; ignoring it")
                }
            }
        }

        Ok(config.build(phonemizer)?)
    }
}

impl Commands {
    fn execute(self, globals: &Globals) -> anyhow::Result<()> {
        use Commands::*;

        let tokenizer = globals.load_tokenizer()?;
        let mut stdout = std::io::stdout().lock();

        match self {
            Tokenize { text, pretty } => {
                let text = if text.is_empty() {
                    debug!("No text arguments; reading lines from stdin");
                    std::io::stdin()
                        .lock()
                        .lines()
                        .collect::<Result<Vec<_>, _>>()
                        .context("Failed to read text from stdin")?
                } else {
                    text
                };

                let batch = tokenizer.tokenize(text.as_slice());
                info!(
                    sequences = batch.len(),
                    width = batch.shape().1,
                    "Tokenized text"
                );

                if pretty {
                    serde_json::to_writer_pretty(&mut stdout, &batch)?;
                } else {
                    serde_json::to_writer(&mut stdout, &batch)?;
                }
                writeln!(stdout)?;
            }
            Decode { indices, tokens } => {
                if tokens {
                    for token in tokenizer.decode_tokens(&indices)? {
                        writeln!(stdout, "{token}")?;
                    }
                } else {
                    writeln!(stdout, "{}", tokenizer.decode(&indices)?)?;
                }
            }
            Vocab => write_vocabulary(&mut stdout, tokenizer.vocabulary())?,
        }

        Ok(())
    }
}

/// One `index<TAB>"token"` line per token.  Tokens are quoted so whitespace tokens stay visible.
fn write_vocabulary(out: &mut impl Write, vocab: &VocabularyTable) -> std::io::Result<()> {
    for (index, token) in vocab.tokens() {
        writeln!(out, "{index}\t{token:?}")?;
    }
    Ok(())
}

/// A phonemizer that runs an external G2P program once per string.
struct CommandPhonemizer {
    program: String,
    args: Vec<String>,
}

impl CommandPhonemizer {
    /// `command` is the program followed by its arguments, separated by whitespace
    fn new(command: &str) -> anyhow::Result<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next().context("The phonemizer command is empty")?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn run(&self, text: &str) -> anyhow::Result<Vec<String>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start phonemizer `{}`", self.program))?;

        let mut stdin = child.stdin.take().context("Phonemizer stdin is not available")?;

        // Feed stdin from its own thread while this one drains stdout.  Writing everything first
        // deadlocks as soon as the program's output fills the pipe buffer.
        let output = thread::scope(|scope| -> anyhow::Result<Output> {
            // Dropping stdin at the end of the thread closes it, so the program sees EOF
            let writer = scope.spawn(move || stdin.write_all(text.as_bytes()));

            let output = child.wait_with_output()?;
            writer
                .join()
                .map_err(|_| anyhow::anyhow!("Phonemizer stdin writer panicked"))?
                .context("Failed to write text to the phonemizer")?;

            Ok(output)
        })?;

        if !output.status.success() {
            anyhow::bail!("Phonemizer `{}` exited with {}", self.program, output.status);
        }

        let stdout = String::from_utf8(output.stdout).context("Phonemizer output is not UTF-8")?;

        // Not trimmed: a line holding a single space is the word boundary symbol
        Ok(stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

impl Phonemizer for CommandPhonemizer {
    fn phonemize(&self, text: &str) -> Vec<String> {
        // Tokenization has no way to fail, so the best we can do here is be loud about it
        self.run(text).unwrap_or_else(|e| {
            error!(program = %self.program, text, "Phonemizer failed: {:#}", e);
            Vec::new()
        })
    }
}

fn main() {
    let cli = Cli::parse();
    let default_log_directive = match cli.globals.debug {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Log as JSON on stderr, so stdout is nothing but the command's output
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_log_directive.into())
                .from_env_lossy(),
        )
        .json()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    if let Some(config_path) = cli.globals.config.as_deref() {
        debug!("Value for config: {}", config_path.display());
    }

    if let Err(e) = cli.command.execute(&cli.globals) {
        error!("{:#}", e);
        exit(1);
    } else {
        debug!("command executed successfully");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that there aren't any invalid attributes in the CLI definition that can only be
    /// detected at runtime
    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn global_args_after_subcommand() {
        let cli = Cli::try_parse_from(["stk", "tokenize", "-v", "english-graphemes", "hello"])
            .unwrap();

        assert_eq!(BuiltinVocabulary::EnglishGraphemes, cli.globals.vocab);
        assert!(matches!(cli.command, Commands::Tokenize { ref text, .. } if text == &["hello"]));
    }

    #[test]
    fn unknown_vocab_is_rejected() {
        assert!(Cli::try_parse_from(["stk", "-v", "klingon", "vocab"]).is_err());
    }

    #[test]
    fn decode_needs_indices() {
        assert!(Cli::try_parse_from(["stk", "decode"]).is_err());
        assert!(Cli::try_parse_from(["stk", "decode", "1", "two"]).is_err());
    }

    #[test]
    fn empty_phonemizer_command() {
        assert!(CommandPhonemizer::new("   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_phonemizer_reads_one_symbol_per_line() {
        // `cat` echoes the text back, so each line of input is one "phoneme"
        let phonemizer = CommandPhonemizer::new("cat").unwrap();
        assert_eq!(vec!["HH", "AH0", " "], phonemizer.phonemize("HH\nAH0\n \n"));
    }

    #[cfg(unix)]
    #[test]
    fn command_phonemizer_output_larger_than_a_pipe_buffer() {
        use std::sync::mpsc;
        use std::time::Duration;

        let phonemizer = CommandPhonemizer::new("cat").unwrap();
        let text = "HH\n".repeat(200_000);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || tx.send(phonemizer.phonemize(&text)).unwrap());

        let phonemes = rx
            .recv_timeout(Duration::from_secs(30))
            .expect("phonemizer never returned");
        assert_eq!(200_000, phonemes.len());
        assert!(phonemes.iter().all(|p| p == "HH"));
    }

    #[test]
    fn vocabulary_listing_quotes_tokens() {
        let mut out = Vec::new();
        write_vocabulary(&mut out, &BuiltinVocabulary::Indonesian.table()).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(45, lines.len());
        assert_eq!("0\t\"pad\"", lines[0]);
        assert_eq!("2\t\"ng\"", lines[2]);
        assert_eq!("35\t\" \"", lines[35]);
    }

    #[test]
    fn missing_phonemizer_program_yields_nothing() {
        let phonemizer = CommandPhonemizer::new("this-program-does-not-exist-anywhere").unwrap();
        assert!(phonemizer.phonemize("hello").is_empty());
    }

    #[test]
    fn phonemizer_switches_grapheme_vocab_to_phonemized() {
        let cli = Cli::try_parse_from([
            "stk",
            "-v",
            "english-graphemes",
            "--phonemizer",
            "cat",
            "vocab",
        ])
        .unwrap();

        let tokenizer = cli.globals.load_tokenizer().unwrap();
        assert!(matches!(
            tokenizer,
            ConfiguredTokenizer::Grapheme(ref t) if t.mode() == GraphemeMode::Phonemized
        ));
    }
}
