use alloy_primitives::utils::Unit;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::default::Default;
use std::hash::{Hash, Hasher};

/// Metadata of a fungible token known to a ledger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    decimals: u8,
    name: Option<String>,
    symbol: Option<String>,
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.get_address()
    }
}

impl Eq for Token {}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.get_address())
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Token {
    pub fn new(address: Address) -> Token {
        Token { address, decimals: 18, ..Token::default() }
    }

    pub fn new_with_data(address: Address, symbol: Option<String>, name: Option<String>, decimals: Option<u8>) -> Token {
        Token { address, symbol, name, decimals: decimals.unwrap_or(18) }
    }

    // For testing purposes
    pub fn repeat_byte(byte: u8) -> Token {
        Token::new(Address::repeat_byte(byte))
    }

    pub fn random() -> Token {
        Token::new(Address::random())
    }

    pub fn get_symbol(&self) -> String {
        self.symbol.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_name(&self) -> String {
        self.name.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_decimals(&self) -> u8 {
        self.decimals
    }

    pub fn get_exp(&self) -> U256 {
        if self.decimals == 18 { Unit::ETHER.wei() } else { U256::from(10).pow(U256::from(self.decimals)) }
    }

    pub fn get_address(&self) -> Address {
        self.address
    }

    /// Whole units expressed in the token's smallest denomination.
    pub fn expand(&self, units: u64) -> U256 {
        U256::from(units) * self.get_exp()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_serialize() {
        let token = Token::new_with_data(Address::repeat_byte(0x11), Some("TKA".to_string()), None, Some(18));

        let serialized = serde_json::to_string(&token).unwrap();
        assert_eq!(
            serialized,
            "{\"address\":\"0x1111111111111111111111111111111111111111\",\"decimals\":18,\"name\":null,\"symbol\":\"TKA\"}"
        );
    }

    #[test]
    fn test_expand() {
        let eighteen = Token::repeat_byte(1);
        assert_eq!(eighteen.expand(4), U256::from(4_000_000_000_000_000_000u128));

        let six = Token::new_with_data(Address::repeat_byte(2), Some("USDC".to_string()), None, Some(6));
        assert_eq!(six.expand(3), U256::from(3_000_000u64));
        assert_eq!(six.get_symbol(), "USDC");
    }
}
