use std::path::PathBuf;

use flexi_logger::Logger;
use structopt::StructOpt;

mod inspect;
mod sync;

#[derive(Debug, StructOpt)]
#[structopt(
    about = "Keeps an Xcode project's group tree and sources build phase in step with the source files on disk."
)]
struct Opt {
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "ETPattern.xcodeproj/project.pbxproj",
        help = "project.pbxproj file to read and update"
    )]
    project: PathBuf,

    #[structopt(
        short,
        long,
        default_value = "ETPattern",
        help = "name of the target whose sources build phase is used"
    )]
    target: String,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(about = "add source files missing from the project, creating groups as needed")]
    Sync(sync::Opt),

    #[structopt(about = "print diagnostic information about the project structure")]
    Inspect(inspect::Opt),
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments.
    let opt = Opt::from_args();

    // Set up logging. The handle has to outlive everything that logs.
    let _logger = Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    match &opt.command {
        Command::Sync(sync_opt) => {
            let summary = sync::run(&opt.project, &opt.target, sync_opt)?;
            log::debug!(
                "sync complete: {} groups and {} files added",
                summary.groups_added,
                summary.files_added
            );
        }
        Command::Inspect(inspect_opt) => {
            inspect::run(&opt.project, &opt.target, inspect_opt)?;
        }
    }

    Ok(())
}
