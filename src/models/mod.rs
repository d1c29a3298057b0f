//! Data models for Librarium

pub mod book;
pub mod loan;
pub mod stats;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, PopularBook};
pub use loan::{Loan, LoanDetails, LoanHistoryEntry, LoanView, ReturnedLoan};
pub use stats::{Dashboard, LibrarySummary};
pub use user::{RegisterUser, User, UserClaims};
