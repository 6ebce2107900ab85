use crate::execution::Revertible;
use alloy_primitives::aliases::U112;
use alloy_primitives::{Address, Log, U256};
use alloy_sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use strum::VariantNames;
use strum_macros::{Display, IntoStaticStr, VariantNames};
use tracing::debug;

/// Solidity signatures of the notifications, for observers that consume ABI logs.
pub mod abi {
    use alloy_sol_types::sol;

    sol! {
        event PairCreated(address indexed token0, address indexed token1, address pair);
        event Mint(address indexed sender, uint256 amount0, uint256 amount1);
        event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to);
        event Swap(
            address indexed sender,
            uint256 amount0In,
            uint256 amount1In,
            uint256 amount0Out,
            uint256 amount1Out,
            address indexed to
        );
        event Sync(uint112 reserve0, uint112 reserve1);
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
}

#[derive(Clone, Debug, Display, PartialEq, Eq, IntoStaticStr, VariantNames, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DexEvent {
    PairCreated { token0: Address, token1: Address, pair: Address },
    Mint { sender: Address, amount0: U256, amount1: U256 },
    Burn { sender: Address, amount0: U256, amount1: U256, to: Address },
    Swap { sender: Address, amount0_in: U256, amount1_in: U256, amount0_out: U256, amount1_out: U256, to: Address },
    Sync { reserve0: U256, reserve1: U256 },
    Transfer { from: Address, to: Address, value: U256 },
    Approval { owner: Address, spender: Address, value: U256 },
}

impl DexEvent {
    pub fn names() -> &'static [&'static str] {
        Self::VARIANTS
    }
}

/// A notification together with the component that emitted it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    pub emitter: Address,
    pub event: DexEvent,
}

impl EmittedEvent {
    /// ABI log as a ledger platform would record it.
    pub fn to_log(&self) -> Log {
        let data = match self.event {
            DexEvent::PairCreated { token0, token1, pair } => abi::PairCreated { token0, token1, pair }.encode_log_data(),
            DexEvent::Mint { sender, amount0, amount1 } => abi::Mint { sender, amount0, amount1 }.encode_log_data(),
            DexEvent::Burn { sender, amount0, amount1, to } => abi::Burn { sender, amount0, amount1, to }.encode_log_data(),
            DexEvent::Swap { sender, amount0_in, amount1_in, amount0_out, amount1_out, to } => abi::Swap {
                sender,
                amount0In: amount0_in,
                amount1In: amount1_in,
                amount0Out: amount0_out,
                amount1Out: amount1_out,
                to,
            }
            .encode_log_data(),
            DexEvent::Sync { reserve0, reserve1 } => {
                abi::Sync { reserve0: U112::saturating_from(reserve0), reserve1: U112::saturating_from(reserve1) }.encode_log_data()
            }
            DexEvent::Transfer { from, to, value } => abi::Transfer { from, to, value }.encode_log_data(),
            DexEvent::Approval { owner, spender, value } => abi::Approval { owner, spender, value }.encode_log_data(),
        };
        Log { address: self.emitter, data }
    }
}

/// Append-only notification log shared by every component of one exchange.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: RwLock<Vec<EmittedEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, emitter: Address, event: DexEvent) {
        debug!(%emitter, event = %event, "Emit");
        self.entries.write().unwrap_or_else(PoisonError::into_inner).push(EmittedEvent { emitter, event });
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Events recorded at or after `cursor`, a value previously read from [`EventLog::len`].
    pub fn since(&self, cursor: usize) -> Vec<EmittedEvent> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(cursor..).map(<[EmittedEvent]>::to_vec).unwrap_or_default()
    }

    pub fn emitted_by(&self, emitter: Address) -> Vec<DexEvent> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().filter(|entry| entry.emitter == emitter).map(|entry| entry.event.clone()).collect()
    }

    pub fn logs(&self) -> Vec<Log> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().map(EmittedEvent::to_log).collect()
    }
}

impl Revertible for EventLog {
    type Snapshot = usize;

    fn snapshot(&self) -> usize {
        self.len()
    }

    fn restore(&self, snapshot: usize) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).truncate(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let event = DexEvent::Sync { reserve0: U256::from(1), reserve1: U256::from(2) };
        assert_eq!(format!("{}", event), "Sync");
        let name: &'static str = (&event).into();
        assert_eq!(name, "Sync");
        assert!(DexEvent::names().contains(&"PairCreated"));
        assert_eq!(DexEvent::names().len(), 7);
    }

    #[test]
    fn test_serialize_event() -> eyre::Result<()> {
        let event = EmittedEvent {
            emitter: Address::repeat_byte(2),
            event: DexEvent::Mint { sender: Address::repeat_byte(1), amount0: U256::from(10), amount1: U256::from(20) },
        };
        let serialized = serde_json::to_string(&event)?;
        assert_eq!(
            serialized,
            "{\"emitter\":\"0x0202020202020202020202020202020202020202\",\"event\":{\"event\":\"Mint\",\"sender\":\"0x0101010101010101010101010101010101010101\",\"amount0\":\"0xa\",\"amount1\":\"0x14\"}}"
        );
        let deserialized: EmittedEvent = serde_json::from_str(&serialized)?;
        assert_eq!(deserialized, event);
        Ok(())
    }

    #[test]
    fn test_swap_log_round_trips_through_abi() -> eyre::Result<()> {
        let sender = Address::repeat_byte(1);
        let to = Address::repeat_byte(3);
        let emitted = EmittedEvent {
            emitter: Address::repeat_byte(2),
            event: DexEvent::Swap {
                sender,
                amount0_in: U256::from(1_000),
                amount1_in: U256::ZERO,
                amount0_out: U256::ZERO,
                amount1_out: U256::from(996),
                to,
            },
        };

        let log = emitted.to_log();
        assert_eq!(log.address, Address::repeat_byte(2));
        assert_eq!(log.data.topics()[0], abi::Swap::SIGNATURE_HASH);
        assert_eq!(log.data.topics().len(), 3);

        let decoded = abi::Swap::decode_log_data(&log.data)?;
        assert_eq!(decoded.sender, sender);
        assert_eq!(decoded.to, to);
        assert_eq!(decoded.amount0In, U256::from(1_000));
        assert_eq!(decoded.amount1Out, U256::from(996));
        Ok(())
    }

    #[test]
    fn test_restore_truncates() {
        let log = EventLog::new();
        log.emit(Address::ZERO, DexEvent::Sync { reserve0: U256::ZERO, reserve1: U256::ZERO });
        let snapshot = log.snapshot();
        log.emit(Address::ZERO, DexEvent::Sync { reserve0: U256::from(1), reserve1: U256::from(1) });
        assert_eq!(log.since(snapshot).len(), 1);

        log.restore(snapshot);
        assert_eq!(log.len(), 1);
        assert!(log.since(5).is_empty());
    }
}
