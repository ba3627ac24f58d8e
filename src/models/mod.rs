pub use api_response::*;
pub use bet::*;
pub use game_asset::*;
pub use ledger::*;
pub use review_fsm::*;
pub use review_requests::*;
pub use user::*;
pub use verification::*;
pub use wallet_errors::*;

pub mod api_response;
pub mod bet;
pub mod game_asset;
pub mod ledger;
pub mod review_fsm;
pub mod review_requests;
pub mod user;
pub mod verification;
pub mod wallet_errors;
