//! Crate-internal logging macros.
//!
//! Forwards to `defmt` on hardware builds and to `tracing` on host builds.
//! With neither feature the macros type-check their arguments and compile
//! to nothing. Keep format strings to plain `{}` with integer or `&str`
//! arguments so they are valid for both backends.

#![allow(unused_macros, unused_imports)]

#[cfg(feature = "defmt")]
pub(crate) use defmt::{debug, error, info, trace, warn};

#[cfg(all(feature = "tracing", not(feature = "defmt")))]
pub(crate) use tracing::{debug, error, info, trace, warn};

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
macro_rules! discard {
    ($($arg:tt)+) => {{
        if false {
            let _ = core::format_args!($($arg)+);
        }
    }};
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::logging::discard!($($arg)+) };
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::logging::discard!($($arg)+) };
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
macro_rules! info {
    ($($arg:tt)+) => { $crate::logging::discard!($($arg)+) };
}

// `warn` itself would clash with the built-in lint attribute.
#[cfg(not(any(feature = "defmt", feature = "tracing")))]
macro_rules! warni {
    ($($arg:tt)+) => { $crate::logging::discard!($($arg)+) };
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
macro_rules! error {
    ($($arg:tt)+) => { $crate::logging::discard!($($arg)+) };
}

#[cfg(not(any(feature = "defmt", feature = "tracing")))]
pub(crate) use {debug, discard, error, info, trace, warni as warn};

#[cfg(test)]
mod tests {
    use super::{debug, error, info, trace, warn};

    #[test]
    fn every_level_accepts_integer_arguments() {
        let ep: u8 = 0x01;
        trace!("ep {}", ep);
        debug!("ep {}", ep);
        info!("ep {} armed {}", ep, 2usize);
        warn!("ep {} refused", ep);
        error!("ep {} failed", ep);
    }
}
