use crate::app::RunInput;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

pub const DEFAULT_POST_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Write a poem about the theme given on the command line
    Direct,
    /// Pick a theme from a subreddit's top posts, then write a poem about it
    Forum,
}

#[derive(Debug, Parser)]
#[command(
    name = "poembot",
    version,
    about = "Write a short poem and post it to Slack and Bluesky"
)]
pub struct Cli {
    /// Where the theme comes from
    #[arg(long, env = "POEM_MODE", value_enum, default_value_t = RunMode::Direct)]
    pub mode: RunMode,

    /// Poem theme (direct mode) or subreddit name (forum mode)
    pub input: String,

    /// How many top posts to read in forum mode
    #[arg(
        default_value_t = DEFAULT_POST_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub limit: u32,
}

impl Cli {
    /// Parse arguments, exiting with status 1 on usage errors.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
                kind => {
                    let _ = e.print();
                    if kind == ErrorKind::MissingRequiredArgument {
                        eprintln!("ポエムのテーマをコマンドライン引数として指定してください。");
                    }
                    std::process::exit(1);
                }
            },
        }
    }

    pub fn run_input(&self) -> RunInput {
        match self.mode {
            RunMode::Direct => RunInput::Theme(self.input.clone()),
            RunMode::Forum => RunInput::Forum {
                community: self.input.clone(),
                limit: self.limit,
            },
        }
    }
}
