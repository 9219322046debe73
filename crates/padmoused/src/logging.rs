// Colorized, timestamped wrappers around `log`

use fern::Dispatch;

/// Crates whose log lines follow the verbosity flag. Everything else is
/// limited to errors.
const OWN_CRATES: &[&str] = &[
    "padmoused",
    "padmouse_filter",
    "padmouse_profile",
    "padmouse_gamepad",
    "padmouse_control",
];

/// Prefix a message with local time, down to milliseconds.
#[inline(always)]
pub(crate) fn format_log(message: &str) -> String {
    let now = chrono::Local::now().format("%Y.%m.%d %H:%M:%S%.3f");
    format!("[{now}] {message}")
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::error!("{}", message.bright_red());
    }
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::info!("{message}");
    }
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::debug!("{}", message.dimmed());
    }
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::warn!("{}", message.bright_yellow());
    }
}

/// Setup the logger.
pub(crate) fn setup(verbose: bool, no_color: bool) -> Result<(), log::SetLoggerError> {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let mut dispatch = Dispatch::new().level(log::LevelFilter::Error);
    for name in OWN_CRATES {
        dispatch = dispatch.level_for(*name, log_level);
    }
    dispatch.chain(std::io::stdout()).apply()?;

    if no_color {
        colored::control::set_override(false);
    }
    Ok(())
}
