//! Page builders: fetch, project and prepare data for rendering

mod detail;
mod list;

pub use detail::{known_uids, DetailPage};
pub use list::{ListPage, ListState, LoadOutcome};
