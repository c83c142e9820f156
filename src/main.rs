//! kubegate: chatops relay for kubectl.
//!
//! Reads one chat message as JSON from stdin and writes the reply as JSON
//! to stdout:
//!
//! ```text
//! in:  {"channel": "general", "message": "@kubegate get pods -n apps"}
//! out: {"message": "NAME  READY  STATUS ..."}
//! ```
//!
//! Messages that do not start with `@<bot_name>` get an empty reply.
//!
//! Flags:
//!   --config <path>   merge this overlay instead of ~/.config/kubegate/config.toml
//!   --dump-config     print the effective configuration as TOML and exit
//!   --verbose         also log debug output to stderr

use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use kubegate::config::Config;
use kubegate::eval::CommandRouter;
use kubegate::parse::BotMention;
use kubegate::{Error, logging};

const UNSUPPORTED_MSG: &str = "Command not supported. Use 'commands list' to see allowed commands.";
const INTERNAL_ERROR_MSG: &str = "Sorry, an internal error occurred while executing your command.";

#[derive(Deserialize)]
struct Request {
    #[serde(default)]
    channel: String,
    #[serde(default)]
    message: String,
}

#[derive(Default)]
struct Options {
    config: Option<PathBuf>,
    dump_config: bool,
    verbose: bool,
}

fn parse_options() -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                opts.config = Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
            }
            "--dump-config" => opts.dump_config = true,
            "--verbose" | "-v" => opts.verbose = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(opts)
}

fn reply(message: &str) {
    println!("{}", serde_json::json!({ "message": message }));
}

fn main() {
    let opts = match parse_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("kubegate: {e}");
            std::process::exit(2);
        }
    };

    let loaded = match &opts.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("kubegate: {e}");
            std::process::exit(1);
        }
    };

    if opts.dump_config {
        match config.to_toml() {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("kubegate: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    logging::init(&config.settings, opts.verbose);

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        log::error!("failed to read stdin: {e}");
        eprintln!("failed to read stdin");
        std::process::exit(1);
    }

    let request: Request = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => {
            log::error!("JSON parse error: {e}");
            eprintln!("JSON parse error: {e}");
            std::process::exit(1);
        }
    };

    let mention = match BotMention::new(&config.settings.bot_name) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("kubegate: invalid bot name {:?}: {e}", config.settings.bot_name);
            std::process::exit(1);
        }
    };

    let Some(command) = mention.find_and_trim(&request.message) else {
        log::debug!("message not addressed to {}", config.settings.bot_name);
        reply("");
        return;
    };

    let router = CommandRouter::from_config(&config);
    let message = match router.execute(&request.channel, command) {
        Ok(execution) => {
            logging::log_decision(&request.channel, &execution.command_label, &execution.message);
            execution.message
        }
        Err(Error::EmptyCommand | Error::UnsupportedCommand | Error::InvalidCommand) => {
            logging::log_decision(&request.channel, "{unsupported}", UNSUPPORTED_MSG);
            UNSUPPORTED_MSG.to_string()
        }
        Err(e) => {
            log::error!("while handling message in {:?}: {e}", request.channel);
            INTERNAL_ERROR_MSG.to_string()
        }
    };

    reply(&message);
}
