pub mod notice;
pub mod table;

pub use notice::{Notice, NoticeLevel};
pub use table::{LoadState, Panel, RecordTable};
