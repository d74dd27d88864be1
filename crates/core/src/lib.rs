pub mod command;
pub mod config;
pub mod fetcher;
pub mod formats;
pub mod progress;
pub mod resolver;
pub mod runner;
pub mod testing;

pub use command::{
    CommandBuilder, CommandSpec, DownloadRequest, MediaKind, RequestError, Resolution,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use fetcher::{DownloadReport, FetchError, MediaFetcher, ToolStatus, YtDlpFetcher};
pub use formats::{AvailableFormats, FormatDescriptor, FormatQuery};
pub use progress::{FileProgressSink, MemoryProgressSink, ProgressSink, ProgressState};
pub use resolver::{BinaryResolver, ExecutableSpec, ResolveError, ResolvedBinary, Tool};
pub use runner::{ProcessResult, ProcessRunner, RunError};
