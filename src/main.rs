use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use pidpatrol::commands;
use pidpatrol::init_logging;

fn cli() -> Command {
    Command::new("pidpatrol")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch processes by name and report aggregated CPU and memory usage")
        .subcommand(
            Command::new("watch")
                .about("Monitor processes until Ctrl+C")
                .long_about("Monitor processes until Ctrl+C\n\nNames may be given as separate arguments or as one comma/semicolon separated list.\nWithout names, the watch list from the config file is used.")
                .arg(
                    Arg::new("names")
                        .help("Process names to watch")
                        .num_args(0..)
                        .index(1),
                )
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECS")
                        .help("Seconds between samples (minimum 1)")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print events as JSON lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("sample")
                .about("Take one aggregated sample of a process name")
                .arg(
                    Arg::new("name")
                        .help("Process name, matched exactly ignoring case")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the sample as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect and edit the saved configuration (use 'pidpatrol config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show the current configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(
                    Command::new("set-interval")
                        .about("Set the default polling interval")
                        .arg(
                            Arg::new("seconds")
                                .help("Seconds between samples (minimum 1)")
                                .required(true)
                                .index(1)
                                .value_parser(clap::value_parser!(f64)),
                        ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add names to the startup watch list")
                        .arg(
                            Arg::new("names")
                                .help("Process names to add")
                                .required(true)
                                .num_args(1..)
                                .index(1),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove a name from the startup watch list")
                        .arg(
                            Arg::new("name")
                                .help("Process name to remove")
                                .required(true)
                                .index(1),
                        ),
                ),
        )
}

fn main() -> Result<()> {
    init_logging();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch(sub_matches)?,
        Some(("sample", sub_matches)) => commands::sample(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::handle_config(sub_matches)?,
        _ => {
            println!("Welcome to pidpatrol!");
            println!("Use 'pidpatrol --help' for more information.");
        }
    }

    Ok(())
}
