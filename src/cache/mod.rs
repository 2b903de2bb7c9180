// Persistent per-file result cache and in-process memoization
//
// Layout on disk:
//   <cache_root>/<run_name>/<fingerprint>/<file_name>_<fingerprint>.msgpack
//
// Each entry is a versioned MessagePack record. An entry is served only while
// it was written after the source file's last modification; staleness is
// judged by modification time alone, not by content. Any failure to read an
// entry (absent, stale, unreadable, torn, other format version) is a miss and
// the caller recomputes; cache errors never reach the run result.
//
// `Memo` is the explicit in-process counterpart: results keyed by function
// name plus argument fingerprint, with targeted invalidation.

mod memo;
mod record;
mod store;

pub use memo::{Memo, MemoKey};
pub use record::{CacheRecord, CACHE_FORMAT_VERSION};
pub use store::{CacheError, CacheStore};
