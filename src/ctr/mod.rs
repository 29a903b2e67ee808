pub mod sources;
pub mod table;

pub use sources::CtrSource;
pub use table::{
    CtrLookup, CtrRange, CtrTable, CtrValue, OverflowPolicy, MAX_POSITION, MIN_POSITION,
};
