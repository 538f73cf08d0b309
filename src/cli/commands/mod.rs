pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};
use once_cell::sync::Lazy;

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";

static LONG_VERSION: Lazy<String> =
    Lazy::new(|| format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH));

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("bolalab")
        .about("Broken object-level authorization training service")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(LONG_VERSION.as_str())
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("BOLALAB_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("BOLALAB_DSN")
                .required(true),
        );

    let command = auth::with_args(command);
    logging::with_args(command)
}
