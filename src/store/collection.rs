/// Document collections, one sled tree each
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    strum_macros::Display, strum_macros::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Users,
    Withdrawals,
    Deposits,
    DepositNotifications,
    ManualDeposits,
    WalletTransactions,
    UserBets,
    Verifications,
    GameAssets,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Users,
        Collection::Withdrawals,
        Collection::Deposits,
        Collection::DepositNotifications,
        Collection::ManualDeposits,
        Collection::WalletTransactions,
        Collection::UserBets,
        Collection::Verifications,
        Collection::GameAssets,
    ];
}

/// Key of a record owned by a user, so a user's records share a scan prefix
pub fn user_scoped_key(user_id: &str, record_id: &str) -> String {
    format!("{}/{}", user_id, record_id)
}

pub fn user_prefix(user_id: &str) -> String {
    format!("{}/", user_id)
}
