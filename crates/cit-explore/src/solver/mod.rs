pub mod encode;
pub mod rng;
pub mod search;

pub use encode::{CnfClauses, EncodedSpace, EncodingError};
pub use search::{Feasibility, SearchError};
