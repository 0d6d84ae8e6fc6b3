use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::{BetChoice, BetType};

/// Maximum display name length.
pub const MAX_NAME_LENGTH: usize = 32;

/// Length of the public display id.
pub const UID_LENGTH: usize = 6;

const UID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Basis points denominator for payout ratios and commissions.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Preset amounts offered by the bet modal.
pub const QUICK_AMOUNTS: [u64; 4] = [10, 100, 1_000, 10_000];

/// Increment of the bet modal's +/- buttons.
pub const AMOUNT_STEP: u64 = 10;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum AccountInvariantError {
    #[error("user name is empty")]
    EmptyName,
    #[error("user name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Public display id, e.g. `K29Q0B`.
    pub uid: String,
    pub name: String,
    pub email: String,
    /// Stored in clear text; credentials belong to the host's auth layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub mobile: String,
    /// Base64 data URL of the profile image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub balance: u64,
    pub promo_code: String,
    pub role: UserRole,
    pub is_blocked: bool,
    pub total_bets: u64,
    pub total_wins: u64,
    pub total_loss: u64,
}

impl User {
    pub fn new(id: String, uid: String, name: String) -> Self {
        let promo_code = uid.clone();
        Self {
            id,
            uid,
            name,
            promo_code,
            ..Default::default()
        }
    }

    pub fn validate_invariants(&self) -> Result<(), AccountInvariantError> {
        validate_name(&self.name)
    }
}

pub fn validate_name(name: &str) -> Result<(), AccountInvariantError> {
    if name.trim().is_empty() {
        return Err(AccountInvariantError::EmptyName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        return Err(AccountInvariantError::NameTooLong {
            len,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Random six-character display id drawn from `A-Z0-9`.
pub fn generate_uid<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..UID_LENGTH)
        .map(|_| UID_ALPHABET[rng.gen_range(0..UID_ALPHABET.len())] as char)
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WithdrawalMethod {
    Upi,
    Bank,
}

/// Payout destination of a withdrawal request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "UPPERCASE")]
pub enum WithdrawalDetails {
    Upi {
        upi_id: String,
    },
    Bank {
        holder: String,
        account_number: String,
        ifsc: String,
    },
}

impl WithdrawalDetails {
    pub fn method(&self) -> WithdrawalMethod {
        match self {
            WithdrawalDetails::Upi { .. } => WithdrawalMethod::Upi,
            WithdrawalDetails::Bank { .. } => WithdrawalMethod::Bank,
        }
    }

    /// Every field must be filled; a UPI handle looks like `name@bank`.
    pub fn is_complete(&self) -> bool {
        match self {
            WithdrawalDetails::Upi { upi_id } => {
                let mut parts = upi_id.trim().splitn(2, '@');
                let user = parts.next().unwrap_or_default();
                let bank = parts.next().unwrap_or_default();
                !user.is_empty() && !bank.is_empty()
            }
            WithdrawalDetails::Bank {
                holder,
                account_number,
                ifsc,
            } => [holder, account_number, ifsc]
                .iter()
                .all(|field| !field.trim().is_empty()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: u64,
    pub status: TransactionStatus,
    pub date: NaiveDateTime,
    /// Payment reference supplied with a deposit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal: Option<WithdrawalDetails>,
}

impl Transaction {
    pub fn is_approved(&self) -> bool {
        self.status == TransactionStatus::Approved
    }
}

/// Operator-controlled game settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub min_bet: u64,
    /// Total return on a winning colour bet, in basis points of the stake.
    pub win_ratio_color_bps: u64,
    pub win_ratio_number_bps: u64,
    pub win_ratio_size_bps: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_logo: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_bet: 10,
            win_ratio_color_bps: 20_000,
            win_ratio_number_bps: 90_000,
            win_ratio_size_bps: 20_000,
            app_logo: None,
        }
    }
}

impl Settings {
    pub fn ratio_bps(&self, bet_type: BetType) -> u64 {
        match bet_type {
            BetType::Color => self.win_ratio_color_bps,
            BetType::Number => self.win_ratio_number_bps,
            BetType::Size => self.win_ratio_size_bps,
        }
    }

    /// Total amount returned for a winning bet of `amount` on `choice`.
    pub fn payout(&self, choice: &BetChoice, amount: u64) -> u64 {
        let scaled = (amount as u128) * (self.ratio_bps(choice.bet_type()) as u128)
            / (BPS_DENOMINATOR as u128);
        scaled.min(u64::MAX as u128) as u64
    }
}

/// One level of the referral programme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralTier {
    pub level: u8,
    pub commission_bps: u64,
}

impl ReferralTier {
    pub fn commission(&self, amount: u64) -> u64 {
        amount.saturating_mul(self.commission_bps) / BPS_DENOMINATOR
    }

    pub fn percent(&self) -> u64 {
        self.commission_bps / 100
    }
}

pub const REFERRAL_TIERS: [ReferralTier; 3] = [
    ReferralTier {
        level: 1,
        commission_bps: 4_000,
    },
    ReferralTier {
        level: 2,
        commission_bps: 2_000,
    },
    ReferralTier {
        level: 3,
        commission_bps: 1_000,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Digit, Size};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generate_uid() {
        let mut rng = StdRng::seed_from_u64(42);
        let uid = generate_uid(&mut rng);
        assert_eq!(uid.len(), UID_LENGTH);
        assert!(uid
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

        let mut again = StdRng::seed_from_u64(42);
        assert_eq!(generate_uid(&mut again), uid);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Asha").is_ok());
        assert_eq!(validate_name("   "), Err(AccountInvariantError::EmptyName));
        assert!(matches!(
            validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(AccountInvariantError::NameTooLong { len: 33, max: 32 })
        ));
    }

    #[test]
    fn test_default_payouts() {
        let settings = Settings::default();
        assert_eq!(settings.payout(&BetChoice::Color(Color::Red), 100), 200);
        assert_eq!(settings.payout(&BetChoice::Size(Size::Big), 15), 30);
        assert_eq!(
            settings.payout(&BetChoice::Number(Digit::new(3).unwrap()), 10),
            90
        );
    }

    #[test]
    fn test_payout_saturates() {
        let settings = Settings::default();
        assert_eq!(
            settings.payout(&BetChoice::Number(Digit::new(3).unwrap()), u64::MAX),
            u64::MAX
        );
    }

    #[test]
    fn test_referral_tiers() {
        assert_eq!(
            REFERRAL_TIERS.iter().map(|t| t.percent()).collect::<Vec<_>>(),
            vec![40, 20, 10]
        );
        assert_eq!(REFERRAL_TIERS[0].commission(250), 100);
        assert_eq!(REFERRAL_TIERS[2].commission(99), 9);
    }

    #[test]
    fn test_withdrawal_details_complete() {
        assert!(WithdrawalDetails::Upi {
            upi_id: "asha@okbank".into()
        }
        .is_complete());
        assert!(!WithdrawalDetails::Upi {
            upi_id: "asha".into()
        }
        .is_complete());
        assert!(!WithdrawalDetails::Upi {
            upi_id: "@okbank".into()
        }
        .is_complete());
        let bank = WithdrawalDetails::Bank {
            holder: "Asha".into(),
            account_number: "001122".into(),
            ifsc: "".into(),
        };
        assert!(!bank.is_complete());
        assert_eq!(bank.method(), WithdrawalMethod::Bank);
    }

    #[test]
    fn test_settings_partial_config() {
        let settings: Settings = serde_json::from_str(r#"{"min_bet": 50}"#).unwrap();
        assert_eq!(settings.min_bet, 50);
        assert_eq!(settings.win_ratio_number_bps, 90_000);
    }
}
