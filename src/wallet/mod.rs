//! Wallet ledger and bet placement

pub mod balance;
pub mod betslip;
pub mod deposit;
pub mod placement;
pub mod users;
pub mod verification;
pub mod withdrawal;

pub use balance::{apply_delta_in, BalanceStore};
pub use betslip::{round2, BetSlip, SlipChange};
pub use deposit::DepositIntake;
pub use placement::BetPlacement;
pub use users::UserDirectory;
pub use verification::{DocumentUpload, VerificationWorkflow};
pub use withdrawal::{withdrawable_amount, WithdrawalWorkflow};
