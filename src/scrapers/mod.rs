pub mod subscan; // Block-explorer lookup for block-number → block-hash resolution

pub use subscan::SubscanClient;
