use anyhow::Result;
use clap::Parser;
use modvault::loader::ModLoader;
use std::path::PathBuf;

/// modvault - mod install pipeline
///
/// Downloads mod packages with their dependencies into a per-game cache and
/// links them into named profiles.
///
/// Examples:
///   modvault --game "Lethal Company" install --community lethal-company Owner-ModA-1.0.0
///   modvault --game "Lethal Company" link Owner-ModA-1.0.0 --profile Default
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Game title the cache and profiles belong to
    #[arg(long = "game", short = 'g', value_name = "TITLE", global = true)]
    pub game: Option<String>,

    /// Data root directory (overrides the config-dir default; also via MODVAULT_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "MODVAULT_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Package index URL (defaults to https://thunderstore.io)
    #[arg(long = "index-url", value_name = "URL", global = true)]
    pub index_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package and its dependencies into the game's mod cache
    Install(InstallArgs),

    /// Link an installed package into a profile
    Link(LinkArgs),

    /// Remove a package's link from a profile
    Unlink(LinkArgs),

    /// Print the loader's launch arguments for a profile
    LaunchArgs(LaunchArgsArgs),
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// The package in the format "Owner-Name-Version"
    #[arg(value_name = "OWNER-NAME-VERSION")]
    package: String,

    /// Community the package index is fetched for
    #[arg(long, value_name = "COMMUNITY")]
    community: String,
}

#[derive(clap::Args, Debug)]
struct LinkArgs {
    /// The package in the format "Owner-Name-Version"
    #[arg(value_name = "OWNER-NAME-VERSION")]
    package: String,

    /// Profile name
    #[arg(long, short = 'p', default_value = "Default")]
    profile: String,

    /// Mod loader the profile is set up for
    #[arg(long, default_value = "bepinex")]
    loader: ModLoader,
}

#[derive(clap::Args, Debug)]
struct LaunchArgsArgs {
    /// Profile name
    #[arg(long, short = 'p', default_value = "Default")]
    profile: String,

    /// Mod loader the profile is set up for
    #[arg(long, default_value = "bepinex")]
    loader: ModLoader,

    /// Emit the vanilla (mods disabled) arguments instead
    #[arg(long)]
    vanilla: bool,
}

fn require_game(game: Option<String>) -> Result<String> {
    game.ok_or_else(|| anyhow::anyhow!("--game is required"))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = modvault::runtime::RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            modvault::commands::install(
                &runtime,
                &args.package,
                &require_game(cli.game)?,
                &args.community,
                cli.root,
                cli.index_url,
            )
            .await?
        }
        Commands::Link(args) => modvault::commands::link(
            &runtime,
            &args.package,
            &require_game(cli.game)?,
            &args.profile,
            args.loader,
            cli.root,
        )?,
        Commands::Unlink(args) => modvault::commands::unlink(
            &runtime,
            &args.package,
            &require_game(cli.game)?,
            &args.profile,
            args.loader,
            cli.root,
        )?,
        Commands::LaunchArgs(args) => modvault::commands::launch_args(
            &runtime,
            &require_game(cli.game)?,
            &args.profile,
            args.loader,
            args.vanilla,
            cli.root,
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from([
            "modvault",
            "--game",
            "Lethal Company",
            "install",
            "Owner-ModA-1.0.0",
            "--community",
            "lethal-company",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.package, "Owner-ModA-1.0.0");
                assert_eq!(args.community, "lethal-company");
            }
            _ => panic!("Expected Install command"),
        }
        assert_eq!(cli.game.as_deref(), Some("Lethal Company"));
        assert_eq!(cli.root, None);
    }

    #[test]
    fn test_cli_link_defaults() {
        let cli = Cli::try_parse_from(["modvault", "-g", "Game", "link", "Owner-ModA-1.0.0"])
            .unwrap();
        match cli.command {
            Commands::Link(args) => {
                assert_eq!(args.profile, "Default");
                assert_eq!(args.loader, ModLoader::BepInEx);
            }
            _ => panic!("Expected Link command"),
        }
    }

    #[test]
    fn test_cli_global_root_parsing() {
        let cli = Cli::try_parse_from([
            "modvault",
            "--root",
            "/tmp/vault",
            "-g",
            "Game",
            "launch-args",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/vault")));
        match cli.command {
            Commands::LaunchArgs(args) => assert!(!args.vanilla),
            _ => panic!("Expected LaunchArgs command"),
        }
    }

    #[test]
    fn test_cli_unknown_loader_fails() {
        let result = Cli::try_parse_from([
            "modvault",
            "-g",
            "Game",
            "link",
            "Owner-ModA-1.0.0",
            "--loader",
            "northstar",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["modvault", "Owner-ModA-1.0.0"]);
        assert!(result.is_err());
    }
}
