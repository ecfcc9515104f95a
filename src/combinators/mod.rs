//! # Control-flow combinators.
//!
//! Every combinator is itself a [`Task`](crate::Task), so flows nest freely.
//!
//! | Combinator    | Runs                          | Delivers                              |
//! |---------------|-------------------------------|---------------------------------------|
//! | [`Series`]    | tasks one after another       | `Vec<T>` in order, or first failure   |
//! | [`Waterfall`] | stages, each fed the previous | last stage's value, or first failure  |
//! | [`Each`]      | one branch per item, fan-out  | `()` after all, or first failure      |
//! | [`Parallel`]  | tasks concurrently            | `Vec<T>` in task order, or first fail |
//! | [`Retry`]     | a task up to `times + 1`      | first success, or last failure        |
//! | [`Forever`]   | a task while it succeeds      | its first failure                     |

mod each;
mod forever;
mod parallel;
mod retry;
mod series;
mod waterfall;

pub use each::Each;
pub use forever::Forever;
pub use parallel::Parallel;
pub use retry::Retry;
pub use series::Series;
pub use waterfall::Waterfall;
