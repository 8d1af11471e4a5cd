//! Upstream adapters implementing [`BrokerageSource`](crate::source::BrokerageSource).

mod robinhood;

pub use robinhood::RobinhoodAdapter;
