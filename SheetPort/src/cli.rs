use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Export and merge music playlists
#[derive(Debug, Parser)]
#[command(name = "sheetport", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web UI and the export API (default)
    Serve(ServeArgs),
    /// Load the platform plugins and list them
    Platforms(PluginArgs),
    /// Merge playlist JSON files into one array
    Merge(MergeArgs),
}

#[derive(Debug, Default, Args)]
pub struct PluginArgs {
    /// Platform descriptor directory, overrides `platforms.directory`
    #[arg(long)]
    pub plugins: Option<PathBuf>,
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// HTTP port, overrides $PORT and `host.http_port`
    #[arg(long, short)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub plugins: PluginArgs,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Playlist files, all must end in .json
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output file, `-` for stdout
    #[arg(long, short, default_value = sheetmerge::DEFAULT_MERGED_FILE_NAME)]
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_optional() {
        let cli = Cli::try_parse_from(["sheetport"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["sheetport", "serve", "-p", "8080", "--plugins", "/tmp/p"]).unwrap();
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.plugins.plugins, Some(PathBuf::from("/tmp/p")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_merge_arguments() {
        let cli = Cli::try_parse_from(["sheetport", "merge", "a.json", "b.json"]).unwrap();
        match cli.command {
            Some(Command::Merge(args)) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.output, "merged-playlists.json");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["sheetport", "merge"]).is_err());
    }
}
