use crate::dex::Dex;
use crate::ledger::{InMemoryLedger, TokenLedger};
use crate::utils::Token;
use alloy_primitives::{Address, U256};

pub(crate) const ALICE: Address = Address::repeat_byte(0xa1);
pub(crate) const BOB: Address = Address::repeat_byte(0xb0);

pub(crate) fn expand_to_18_decimals(units: u64) -> U256 {
    Token::repeat_byte(0).expand(units)
}

/// Exchange with TKA (0x11..) and TKB (0x22..) deployed and ALICE holding 10M of each,
/// approved for the router.
pub(crate) fn setup() -> (Dex<InMemoryLedger>, Address, Address) {
    let dex = Dex::default();
    let token_a = dex.ledger().deploy(Token::new_with_data(Address::repeat_byte(0x11), Some("TKA".to_string()), None, None));
    let token_b = dex.ledger().deploy(Token::new_with_data(Address::repeat_byte(0x22), Some("TKB".to_string()), None, None));
    fund(&dex, token_a, ALICE, expand_to_18_decimals(10_000_000));
    fund(&dex, token_b, ALICE, expand_to_18_decimals(10_000_000));
    (dex, token_a, token_b)
}

pub(crate) fn fund(dex: &Dex<InMemoryLedger>, token: Address, holder: Address, amount: U256) {
    assert!(dex.ledger().mint(token, holder, amount));
    assert!(dex.ledger().approve(token, holder, dex.router().address(), U256::MAX));
}
