use crate::Amount;
use crate::model::{PaymentMethod, Step};

/// Visibility and enablement of the generic Back / Continue controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavControls {
    pub show_back: bool,
    pub show_continue: bool,
    pub continue_enabled: bool,
}

/// Compute the generic navigation controls for a step.
///
/// Steps that render their own forward action (review, success, and the
/// crypto and bank detail forms) get no generic controls at all.
pub fn navigation(step: Step, method: PaymentMethod, amount: Amount) -> NavControls {
    match (step, method) {
        (Step::Review | Step::Success, _) => NavControls::default(),
        (Step::Details, PaymentMethod::Crypto | PaymentMethod::Bank) => NavControls::default(),
        _ => NavControls {
            show_back: step != Step::Method,
            show_continue: step != Step::Details,
            continue_enabled: !(step == Step::Amount && !amount.is_positive()),
        },
    }
}
