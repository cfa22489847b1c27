use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

use crate::{formatters::color::color_for_level, verbosity::Verbosity};

/// Initialize the logging system with the given verbosity level.
pub(crate) fn init_logging(verbose: &Verbosity) {
    // Overridden by RUST_LOG if it's set
    let env = Env::default().filter_or("RUST_LOG", "warn");

    let mut builder = Builder::from_env(env);
    builder
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if std::env::var("RUST_LOG").is_err() {
        // Dependencies such as reqwest only report warnings, our own crates
        // follow `-v` and `-q`
        let level_filter = verbose.log_level_filter();
        builder
            .filter_level(LevelFilter::Warn.min(level_filter))
            .filter_module("octo", level_filter)
            .filter_module("octo_lib", level_filter);
    }

    builder.format(move |buf, record| {
        let level = record.level();
        writeln!(
            buf,
            "{} {}",
            color_for_level(level).apply_to(format!("[{level}]")),
            record.args()
        )
    });

    builder.init();
}
