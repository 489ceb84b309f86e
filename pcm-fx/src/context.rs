//! Explicit logging context.
//!
//! Nothing in this crate logs through an implicit global. The embedding
//! application builds a [`Context`] during pipeline setup and passes it to
//! the constructors that report progress. Only setup, teardown and
//! structural operations (chain add/remove) log; the per-sample and
//! per-block paths never do.
//!
//! ```ignore
//! static LOGGER: MyUartLogger = MyUartLogger::new();
//!
//! let ctx = Context::new(&LOGGER).with_max_level(LevelFilter::Debug);
//! let mut pipe = StreamPipe::from_config(ctx, &config, source, sink)?;
//! ```

use core::fmt;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Default log target for records emitted by this crate.
pub const DEFAULT_TARGET: &str = "pcm_fx";

/// Logger handle plus filtering, passed explicitly to pipeline setup code.
#[derive(Clone, Copy)]
pub struct Context {
    logger: &'static dyn Log,
    target: &'static str,
    max_level: LevelFilter,
}

impl Context {
    /// Log through `logger` at every level up to `Info`.
    pub fn new(logger: &'static dyn Log) -> Self {
        Context {
            logger,
            target: DEFAULT_TARGET,
            max_level: LevelFilter::Info,
        }
    }

    /// Log through whatever logger is installed in the `log` facade.
    pub fn global() -> Self {
        Self::new(log::logger())
    }

    /// Discard all records.
    pub fn silent() -> Self {
        Context {
            logger: &NOP_LOGGER,
            target: DEFAULT_TARGET,
            max_level: LevelFilter::Off,
        }
    }

    /// Log under `target` instead of the crate name.
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// Drop records more verbose than `level`.
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    /// Target attached to every record.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Most verbose level this context emits.
    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Whether a record at `level` would be forwarded.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
            && self
                .logger
                .enabled(&Metadata::builder().level(level).target(self.target).build())
    }

    /// Forward one record. Prefer the crate-internal `ctx_log!` family.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.logger.log(
            &Record::builder()
                .level(level)
                .target(self.target)
                .module_path_static(Some(module_path!()))
                .args(args)
                .build(),
        );
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("target", &self.target)
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

struct NopLogger;

impl Log for NopLogger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _: &Record<'_>) {}

    fn flush(&self) {}
}

static NOP_LOGGER: NopLogger = NopLogger;

macro_rules! ctx_info {
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.log(::log::Level::Info, format_args!($($arg)+))
    };
}

macro_rules! ctx_debug {
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.log(::log::Level::Debug, format_args!($($arg)+))
    };
}

macro_rules! ctx_warn {
    ($ctx:expr, $($arg:tt)+) => {
        $ctx.log(::log::Level::Warn, format_args!($($arg)+))
    };
}

pub(crate) use {ctx_debug, ctx_info, ctx_warn};
