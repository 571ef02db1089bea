pub mod bucket;
pub mod diag;
pub mod fetch;
pub mod index;
pub mod render;
pub mod scale;
pub mod session;
pub mod stations;
pub mod timecodec;
pub mod traffic;
pub mod trips;
