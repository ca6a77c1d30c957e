pub mod config;
pub mod debrid;
pub mod hashlist;
pub mod matching;
pub mod metadata;
pub mod metrics;
pub mod sources;
pub mod sync;
pub mod testing;
#[cfg(test)]
mod test_support;
pub mod transport;
pub mod upgrade;
pub mod watchlist;

pub use config::{
    load_config, load_config_from_str, validate_config, validate_preferences, Config, ConfigError,
    DebridConfig, HashListConfig, ProxyConfig, SanitizedConfig, ScanConfig, ServerConfig,
    WatchlistConfig,
};
pub use debrid::{DebridClient, DebridError};
pub use hashlist::{HashListError, HashListIndex};
pub use matching::{
    evaluate, group_key, is_upgrade, matches, select_best, GroupingStrategy, HdrPreference,
    MatchRejection, Preferences, ReleaseType,
};
pub use metadata::{
    clean_title, extract, Candidate, CodecKind, ContentType, HdrTier, QualityTier,
    ReleaseMetadata, ReleaseSize,
};
pub use sources::{
    CandidateSource, CollaboratorError, HeldContentSource, HeldItem, HeldStatus, SubmissionSink,
    WatchlistItem, WatchlistSource,
};
pub use sync::{SubmittedRelease, SyncReport, SyncRunner};
pub use transport::{ProxyRotation, TransportError};
pub use upgrade::{UpgradeMatch, UpgradeReport, UpgradeScanner};
pub use watchlist::{TraktClient, WatchlistError};
