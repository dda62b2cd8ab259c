use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Environment variable holding `env_logger` filter directives, e.g. `engine=trace,runtime=debug`.
pub const FILTER_ENV: &str = "RUST_LOG";

pub fn level_for(debug: bool) -> LevelFilter {
    if debug { LevelFilter::Debug } else { LevelFilter::Warn }
}

/// Stderr logger writing `[level target] message`. Directives in `filters` refine the level
/// chosen by the debug flag.
pub fn builder(debug: bool, filters: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level_for(debug))
        .format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        });
    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }
    builder
}

pub fn init(debug: bool) {
    let filters = std::env::var(FILTER_ENV).ok();
    let _ = builder(debug, filters.as_deref()).try_init();
}
