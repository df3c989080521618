// Aggregation engine - derives statistics from the reading ledger and
// catalog. Read-only: every function takes the request's connection and
// computes its result with grouped queries, never touching rows.

mod authors;
mod challenges;
mod rankings;
mod reading;
mod weekly;

pub use authors::{author_stats, AuthorStats};
pub use challenges::{reading_challenges, ChallengeStatus, Challenges};
pub use rankings::{available_years, most_read_book, MostReadBook};
pub use reading::{reading_stats, ReadingStats};
pub use weekly::{weekly_reads, DayCount, DateRange, WeeklyReads};
