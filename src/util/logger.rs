//! Console logging macros.
//!
//! All macros print a colored level tag and a UTC timestamp in front of the
//! formatted message. `step!` additionally prefixes a flight id and pipeline
//! step. `event!` lines are only emitted when the `LOG_ORTHOFLOW_EVENTS`
//! environment variable is set; they trace state transitions and individual
//! external calls.

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! step {
    ($flight:expr, $step:expr, $($arg:tt)*) => {
        println!(
            "\x1b[1;34m[STEP] [{}]\x1b[0m {} {}: {}",
            chrono::Utc::now().format("%H:%M:%S"),
            $flight,
            $step,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_ORTHOFLOW_EVENTS").is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S"), format!($($arg)*))
        }
    };
}
