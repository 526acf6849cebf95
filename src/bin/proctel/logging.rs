use console::style;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;

/// Install the stderr logger. `RUST_LOG` wins over `--verbose`.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    Builder::new()
        .filter_level(default_level)
        .parse_env(Env::default())
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => style("ERROR").red().bold(),
                Level::Warn => style("WARN ").yellow().bold(),
                Level::Info => style("INFO ").green(),
                Level::Debug => style("DEBUG").cyan(),
                Level::Trace => style("TRACE").dim(),
            };
            writeln!(
                buf,
                "{} {} {}",
                level,
                style(record.target()).dim(),
                record.args()
            )
        })
        .init();
}
