pub use plan::WithdrawalPlan;
pub use submitter::{truncate_error, WithdrawalSubmitter, ERROR_DISPLAY_LIMIT};
pub use withdrawal_encoder::WithdrawalEncoder;

mod plan;
mod submitter;
mod withdrawal_encoder;
