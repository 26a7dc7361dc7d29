pub mod history;
pub mod print;
