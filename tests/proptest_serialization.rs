//! Property-based tests for wire serialization
//!
//! These tests verify that the money and timestamp types survive the
//! service's JSON quirks: integer cents, float-encoded dates and
//! PascalCase field names.

use proptest::prelude::*;
use serde_json::json;

use mangopay::{Money, UnixTime, Wallet};

/// Generate three-letter currency codes
fn arb_currency() -> impl Strategy<Value = String> {
    "[A-Z]{3}"
}

/// Generate arbitrary amounts of money, i64 extremes included
fn arb_money() -> impl Strategy<Value = Money> {
    (arb_currency(), any::<i64>()).prop_map(|(currency, amount)| Money { currency, amount })
}

proptest! {
    /// Amounts survive a JSON round trip bit-exactly
    #[test]
    fn money_round_trips_exactly(money in arb_money()) {
        let encoded = serde_json::to_string(&money).expect("money should encode");
        let decoded: Money = serde_json::from_str(&encoded).expect("money should decode");
        prop_assert_eq!(decoded, money);
    }

    /// Display output is always units, two-digit cents and the currency
    #[test]
    fn money_display_keeps_two_digit_cents(money in arb_money()) {
        let text = money.to_string();
        prop_assert!(text.ends_with(&money.currency));
        let number = text.trim_end_matches(&money.currency).trim_end();
        let (units, cents) = number.rsplit_once('.').expect("display should contain a decimal point");
        prop_assert!(!units.is_empty());
        prop_assert_eq!(cents.len(), 2);
        prop_assert!(cents.chars().all(|c| c.is_ascii_digit()));
    }

    /// Timestamps round trip through their integer wire form
    #[test]
    fn unix_time_round_trips(seconds in any::<i64>()) {
        let encoded = serde_json::to_string(&UnixTime(seconds)).expect("time should encode");
        let decoded: UnixTime = serde_json::from_str(&encoded).expect("time should decode");
        prop_assert_eq!(decoded, UnixTime(seconds));
    }

    /// Float-encoded dates truncate to whole seconds
    #[test]
    fn unix_time_truncates_float_wire_forms(seconds in 0i64..4_102_444_800) {
        let decoded: UnixTime =
            serde_json::from_str(&format!("{seconds}.0")).expect("float time should decode");
        prop_assert_eq!(decoded, UnixTime(seconds));
    }
}

/// Tests for decoding whole entity replies
mod wallet_reply_tests {
    use super::*;

    /// Generate wallet replies the way the service writes them, with
    /// dates as integers or floats
    fn arb_wallet_reply() -> impl Strategy<Value = (serde_json::Value, String, i64)> {
        (
            "[A-Z0-9]{1,12}",
            arb_money(),
            0i64..4_102_444_800,
            any::<bool>(),
        )
            .prop_map(|(id, balance, date, float_date)| {
                let creation_date = if float_date { json!(date as f64) } else { json!(date) };
                let reply = json!({
                    "Id": id,
                    "Owners": ["U1"],
                    "Description": "wallet",
                    "Currency": balance.currency.clone(),
                    "Balance": { "Currency": balance.currency, "Amount": balance.amount },
                    "CreationDate": creation_date
                });
                (reply, id, date)
            })
    }

    proptest! {
        /// Wallet replies decode whichever date form the service picked
        #[test]
        fn wallet_decodes_any_reply((reply, id, date) in arb_wallet_reply()) {
            let wallet: Wallet = serde_json::from_value(reply).expect("reply should decode");
            prop_assert_eq!(wallet.ident.id, id);
            prop_assert_eq!(wallet.ident.creation_date, UnixTime(date));
            prop_assert_eq!(wallet.owners.len(), 1);
        }
    }
}
