pub mod canonical;
pub mod cid;
pub mod logging;
