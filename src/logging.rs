//! Tracker log macros
//!
//! `log_info!`, `log_warn!`, `log_error!` and `log_debug!` go to defmt when
//! the `defmt` feature is on. Without it they print in unit tests and
//! compile to nothing otherwise, with the arguments still type-checked.
//!
//! Format strings must stay defmt-compatible: plain `{}` placeholders only.

#[doc(hidden)]
#[macro_export]
macro_rules! __tracker_log {
    ($level:ident, $tag:literal, $($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!(concat!("[", $tag, "] {}"), format_args!($($arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__tracker_log!(info, "INFO", $($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__tracker_log!(warn, "WARN", $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::__tracker_log!(error, "ERROR", $($arg)*) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__tracker_log!(debug, "DEBUG", $($arg)*) };
}
