pub mod retention;
pub mod storage;
