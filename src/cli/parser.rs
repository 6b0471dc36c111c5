use clap::Parser;

/// Command-line interface definition for rautoclock
#[derive(Parser, Debug)]
#[command(
    name = "rautoclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Automated clock in/out for OneUSG hourly employees",
    long_about = None
)]
pub struct Cli {
    /// Hours to clock (default: default_hours_to_clock from the config file)
    #[arg(value_name = "HOURS", allow_negative_numbers = true)]
    pub hours: Option<f64>,

    /// Set log level to debug
    #[arg(long = "debug")]
    pub debug: bool,

    /// Clock out only
    #[arg(long = "only-out")]
    pub only_out: bool,
}
