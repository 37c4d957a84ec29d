//! Pure extraction helpers.
//!
//! Nothing in here touches the network or a browser: every function takes
//! page HTML or JSON that was obtained elsewhere, so the parsing and merging
//! rules can be tested on fixtures.

mod dom;
mod merge;
mod state;

pub use dom::scrape_note_cards;
pub use merge::{merge_strategies, merge_unique, Keyed, StrategyOutput};
pub use state::{extract_initial_state, pointer};
