pub mod candidate;
pub mod category;
pub mod merge;
pub mod record;
pub mod scoring;
pub mod vocab;

pub use candidate::{KeywordPlace, PhotoRef, RichPlace, price_cap};
pub use category::Category;
pub use merge::{ForceFlags, RecordUpdate, TagTrigger, diff, fill};
pub use record::{DerivedFields, Presence, Record, RecordField};
pub use scoring::{Ranked, Scorable, best_match, build_query, rank, score};
pub use vocab::{Vocabularies, Vocabulary, normalize_tags};
