use crate::Amount;
use crate::config::WizardConfig;
use crate::model::{
    CryptoNetwork, Currency, PaymentMethod, Step, Transaction, TransactionStatus,
};
use crate::wizard::details::{
    BankForm, CardDetails, CardField, CardForm, CryptoForm, DetailCollector, PaymentDetails,
};
use crate::wizard::error::{PaymentError, WizardError};
use crate::wizard::navigation::{NavControls, navigation};

/// A user action on the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectMethod(PaymentMethod),
    SetAmount(Amount),
    SetCurrency(Currency),
    /// Generic Continue control.
    Continue,
    /// Generic Back control, or the review step's own Back.
    Back,
    EditCard(CardField, String),
    SelectNetwork(CryptoNetwork),
    /// The detail form's own forward action (Pay Now, I've sent the payment, ...).
    SubmitDetails,
    Confirm,
    /// Close the success screen.
    Dismiss,
    ViewHistory,
    Cancel,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SelectMethod(_) => "select method",
            Event::SetAmount(_) => "set amount",
            Event::SetCurrency(_) => "set currency",
            Event::Continue => "continue",
            Event::Back => "back",
            Event::EditCard(..) => "edit card",
            Event::SelectNetwork(_) => "select network",
            Event::SubmitDetails => "submit details",
            Event::Confirm => "confirm",
            Event::Dismiss => "dismiss",
            Event::ViewHistory => "view history",
            Event::Cancel => "cancel",
        }
    }
}

/// Work the controller has to carry out after a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Settle this snapshot; its status is already `Processing`.
    StartSettlement(Transaction),
    Complete,
    Cancel,
    ViewHistory,
}

/// How a wizard run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    Completed,
    Cancelled,
}

/// Everything one top-up attempt knows about.
#[derive(Debug, Clone)]
pub struct WizardState {
    step: Step,
    method: PaymentMethod,
    amount: Amount,
    currency: Currency,
    card: CardForm,
    crypto: CryptoForm,
    bank: BankForm,
    card_data: Option<CardDetails>,
    details: Option<PaymentDetails>,
    transaction: Option<Transaction>,
    closed: Option<Closure>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: Step::Method,
            method: PaymentMethod::Card,
            amount: Amount::from_scaled(1_000_000),
            currency: Currency::USD,
            card: CardForm::new(),
            crypto: CryptoForm::default(),
            bank: BankForm::new(),
            card_data: None,
            details: None,
            transaction: None,
            closed: None,
        }
    }
}

/// Accessors
impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn card_form(&self) -> &CardForm {
        &self.card
    }

    pub fn crypto_form(&self) -> &CryptoForm {
        &self.crypto
    }

    pub fn bank_form(&self) -> &BankForm {
        &self.bank
    }

    /// Card fields from the last successful card submission.
    pub fn card_data(&self) -> Option<&CardDetails> {
        self.card_data.as_ref()
    }

    /// Details from the last successful submission, whatever the method.
    pub fn details(&self) -> Option<&PaymentDetails> {
        self.details.as_ref()
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// True while a settlement is in flight.
    pub fn is_processing(&self) -> bool {
        self.transaction
            .as_ref()
            .is_some_and(|tx| tx.status() == TransactionStatus::Processing)
    }

    pub fn closure(&self) -> Option<Closure> {
        self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    /// Cancel is offered on every step but the last, and not mid-settlement.
    pub fn can_cancel(&self) -> bool {
        !self.is_closed() && self.step != Step::Success && !self.is_processing()
    }

    pub fn navigation(&self) -> NavControls {
        navigation(self.step, self.method, self.amount)
    }
}

/// Step sequencer
impl WizardState {
    /// Move to the next step. No-op on the last one.
    pub fn advance(&mut self) {
        if let Some(next) = self.step.next() {
            self.step = next;
        }
    }

    /// Move to the previous step. No-op on the first one.
    pub fn retreat(&mut self) {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
    }
}

/// Transitions
impl WizardState {
    /// Apply one event. A rejected event leaves the state as it was, except
    /// that a failed detail submission records its field errors on the form.
    pub fn apply(&mut self, event: &Event, config: &WizardConfig) -> Result<Effect, WizardError> {
        if self.is_closed() {
            return Err(WizardError::Closed);
        }

        match event {
            Event::SelectMethod(method) => {
                self.expect_step(event, &[Step::Method])?;
                self.method = *method;
                self.currency = Currency::default_for(*method);
            }
            Event::SetAmount(amount) => {
                self.expect_step(event, &[Step::Amount])?;
                if amount.is_negative() {
                    return Err(WizardError::NegativeAmount(*amount));
                }
                self.amount = *amount;
            }
            Event::SetCurrency(currency) => {
                // the crypto form carries its own token picker
                if self.method == PaymentMethod::Crypto {
                    self.expect_step(event, &[Step::Amount, Step::Details])?;
                } else {
                    self.expect_step(event, &[Step::Amount])?;
                }
                if !currency.is_compatible_with(self.method) {
                    return Err(WizardError::CurrencyMismatch {
                        currency: *currency,
                        method: self.method,
                    });
                }
                self.currency = *currency;
            }
            Event::Continue => {
                let nav = self.navigation();
                if !(nav.show_continue && nav.continue_enabled) {
                    return Err(self.blocked(event));
                }
                self.advance();
            }
            Event::Back => {
                let review_back = self.step == Step::Review && !self.is_processing();
                if !(self.navigation().show_back || review_back) {
                    return Err(self.blocked(event));
                }
                self.retreat();
            }
            Event::EditCard(field, value) => {
                self.expect_step(event, &[Step::Details])?;
                self.expect_method(event, PaymentMethod::Card)?;
                self.card.edit(*field, value);
            }
            Event::SelectNetwork(network) => {
                self.expect_step(event, &[Step::Details])?;
                self.expect_method(event, PaymentMethod::Crypto)?;
                self.crypto.select_network(*network);
            }
            Event::SubmitDetails => {
                self.expect_step(event, &[Step::Details])?;
                self.submit_details(config.cere_price)?;
            }
            Event::Confirm => return self.begin_confirmation(event),
            Event::Dismiss => {
                self.expect_step(event, &[Step::Success])?;
                self.closed = Some(Closure::Completed);
                return Ok(Effect::Complete);
            }
            Event::ViewHistory => {
                self.expect_step(event, &[Step::Success])?;
                return Ok(Effect::ViewHistory);
            }
            Event::Cancel => {
                if self.step == Step::Success {
                    return Err(WizardError::WrongStep {
                        action: event.name(),
                        step: self.step,
                    });
                }
                if self.is_processing() {
                    return Err(WizardError::AlreadyProcessing);
                }
                self.closed = Some(Closure::Cancelled);
                return Ok(Effect::Cancel);
            }
        }

        Ok(Effect::None)
    }

    /// Snapshot the current form into a new `Pending` transaction, replacing
    /// any earlier one.
    ///
    /// Crypto transactions always record the default network. The network
    /// picked on the crypto form only changes the deposit instructions.
    pub fn materialize(&mut self, cere_price: Amount) -> &Transaction {
        let tx = Transaction::new(
            self.amount,
            self.currency,
            self.method,
            CryptoNetwork::default(),
            cere_price,
        );
        self.transaction.insert(tx)
    }

    /// Apply the outcome of an in-flight settlement.
    ///
    /// Success completes the transaction and moves to `Success`. Failure marks
    /// it `Failed` and stays on `Review` so the user can retry.
    pub fn settle(&mut self, outcome: Result<(), PaymentError>) -> Result<(), WizardError> {
        let tx = self.transaction.as_mut().ok_or(WizardError::NoTransaction)?;
        if tx.status() != TransactionStatus::Processing {
            return Err(WizardError::NotProcessing);
        }

        match outcome {
            Ok(()) => {
                tx.set_status(TransactionStatus::Completed);
                self.advance();
                Ok(())
            }
            Err(e) => {
                tx.set_status(TransactionStatus::Failed);
                Err(e.into())
            }
        }
    }
}

/// Private API
impl WizardState {
    fn expect_step(&self, event: &Event, allowed: &[Step]) -> Result<(), WizardError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action: event.name(),
                step: self.step,
            })
        }
    }

    fn expect_method(&self, event: &Event, method: PaymentMethod) -> Result<(), WizardError> {
        if self.method == method {
            Ok(())
        } else {
            Err(WizardError::WrongMethod {
                action: event.name(),
                method: self.method,
            })
        }
    }

    fn blocked(&self, event: &Event) -> WizardError {
        WizardError::NavigationBlocked {
            action: event.name(),
            step: self.step,
        }
    }

    fn collector(&mut self) -> &mut dyn DetailCollector {
        match self.method {
            PaymentMethod::Card => &mut self.card,
            PaymentMethod::Crypto => &mut self.crypto,
            PaymentMethod::Bank => &mut self.bank,
        }
    }

    /// Collect the method's details, then materialize and move to review.
    fn submit_details(&mut self, cere_price: Amount) -> Result<(), WizardError> {
        let (amount, currency) = (self.amount, self.currency);
        let details = self.collector().collect(amount, currency)?;

        if let PaymentDetails::Card(card) = &details {
            self.card_data = Some(card.clone());
        }
        self.details = Some(details);
        self.materialize(cere_price);
        self.advance();
        Ok(())
    }

    fn begin_confirmation(&mut self, event: &Event) -> Result<Effect, WizardError> {
        self.expect_step(event, &[Step::Review])?;
        let tx = self.transaction.as_mut().ok_or(WizardError::NoTransaction)?;

        match tx.status() {
            TransactionStatus::Pending | TransactionStatus::Failed => {
                tx.set_status(TransactionStatus::Processing);
                Ok(Effect::StartSettlement(tx.clone()))
            }
            TransactionStatus::Processing => Err(WizardError::AlreadyProcessing),
            TransactionStatus::Completed => Err(WizardError::WrongStep {
                action: event.name(),
                step: self.step,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CryptoToken, FiatCurrency};
    use crate::wizard::details::DetailField;

    // test utils

    fn config() -> WizardConfig {
        WizardConfig::default()
    }

    fn apply(state: &mut WizardState, event: Event) -> Result<Effect, WizardError> {
        state.apply(&event, &config())
    }

    fn fill_card(state: &mut WizardState) {
        for (field, value) in [
            (CardField::Name, "Jane Doe"),
            (CardField::Number, "4242424242424242"),
            (CardField::Expiry, "12/27"),
            (CardField::Cvc, "123"),
        ] {
            apply(state, Event::EditCard(field, value.to_string())).unwrap();
        }
    }

    /// Walk a fresh wizard to the details step.
    fn at_details(method: PaymentMethod, amount: f64) -> WizardState {
        let mut state = WizardState::new();
        apply(&mut state, Event::SelectMethod(method)).unwrap();
        apply(&mut state, Event::Continue).unwrap();
        apply(&mut state, Event::SetAmount(Amount::from_float(amount))).unwrap();
        apply(&mut state, Event::Continue).unwrap();
        assert_eq!(state.step(), Step::Details);
        state
    }

    fn at_review(amount: f64) -> WizardState {
        let mut state = at_details(PaymentMethod::Card, amount);
        fill_card(&mut state);
        apply(&mut state, Event::SubmitDetails).unwrap();
        assert_eq!(state.step(), Step::Review);
        state
    }

    #[test]
    fn new_state_defaults() {
        let state = WizardState::new();
        assert_eq!(state.step(), Step::Method);
        assert_eq!(state.method(), PaymentMethod::Card);
        assert_eq!(state.amount(), Amount::from_float(100.0));
        assert_eq!(state.currency(), Currency::USD);
        assert!(state.card_data().is_none());
        assert!(state.transaction().is_none());
        assert!(!state.is_processing());
        assert!(state.can_cancel());
    }

    // Step sequencer

    #[test]
    fn advance_and_retreat_stop_at_the_ends() {
        let mut state = WizardState::new();
        state.retreat();
        assert_eq!(state.step(), Step::Method);
        for _ in 0..10 {
            state.advance();
        }
        assert_eq!(state.step(), Step::Success);
        state.retreat();
        assert_eq!(state.step(), Step::Review);
    }

    #[test]
    fn every_move_sequence_stays_in_range_and_moves_one_step() {
        // all sequences of 8 advance/retreat calls
        for mask in 0u32..(1 << 8) {
            let mut state = WizardState::new();
            for bit in 0..8 {
                let before = state.step().index() as isize;
                if mask & (1 << bit) != 0 {
                    state.advance();
                } else {
                    state.retreat();
                }
                let after = state.step().index() as isize;
                assert!(Step::ALL.contains(&state.step()));
                assert!((after - before).abs() <= 1);
            }
        }
    }

    // Method and currency

    #[test]
    fn method_change_resets_currency() {
        let methods = [PaymentMethod::Card, PaymentMethod::Crypto, PaymentMethod::Bank];
        for from in methods {
            for to in methods {
                let mut state = WizardState::new();
                apply(&mut state, Event::SelectMethod(from)).unwrap();
                apply(&mut state, Event::Continue).unwrap();
                let other = if from == PaymentMethod::Crypto {
                    Currency::Crypto(CryptoToken::Dai)
                } else {
                    Currency::Fiat(FiatCurrency::Gbp)
                };
                apply(&mut state, Event::SetCurrency(other)).unwrap();
                apply(&mut state, Event::Back).unwrap();

                apply(&mut state, Event::SelectMethod(to)).unwrap();
                assert_eq!(state.currency(), Currency::default_for(to));
                assert!(state.currency().is_compatible_with(to));
            }
        }
    }

    #[test]
    fn incompatible_currency_is_rejected() {
        let mut state = WizardState::new();
        apply(&mut state, Event::Continue).unwrap();
        let result = apply(&mut state, Event::SetCurrency(Currency::USDT));
        assert!(matches!(
            result,
            Err(WizardError::CurrencyMismatch {
                method: PaymentMethod::Card,
                ..
            })
        ));
        assert_eq!(state.currency(), Currency::USD);
    }

    #[test]
    fn method_only_selectable_on_method_step() {
        let mut state = WizardState::new();
        apply(&mut state, Event::Continue).unwrap();
        let result = apply(&mut state, Event::SelectMethod(PaymentMethod::Bank));
        assert!(matches!(
            result,
            Err(WizardError::WrongStep {
                step: Step::Amount,
                ..
            })
        ));
        assert_eq!(state.method(), PaymentMethod::Card);
    }

    // Amount and navigation

    #[test]
    fn zero_amount_blocks_continue() {
        let mut state = WizardState::new();
        apply(&mut state, Event::Continue).unwrap();
        apply(&mut state, Event::SetAmount(Amount::ZERO)).unwrap();

        let result = apply(&mut state, Event::Continue);
        assert!(matches!(
            result,
            Err(WizardError::NavigationBlocked {
                step: Step::Amount,
                ..
            })
        ));
        assert_eq!(state.step(), Step::Amount);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut state = WizardState::new();
        apply(&mut state, Event::Continue).unwrap();
        let result = apply(&mut state, Event::SetAmount(Amount::from_float(-5.0)));
        assert!(matches!(result, Err(WizardError::NegativeAmount(_))));
        assert_eq!(state.amount(), Amount::from_float(100.0));
    }

    #[test]
    fn back_is_hidden_on_method_step() {
        let mut state = WizardState::new();
        assert!(matches!(
            apply(&mut state, Event::Back),
            Err(WizardError::NavigationBlocked { .. })
        ));
    }

    #[test]
    fn card_details_has_back_but_no_continue() {
        let mut state = at_details(PaymentMethod::Card, 50.0);
        assert!(matches!(
            apply(&mut state, Event::Continue),
            Err(WizardError::NavigationBlocked { .. })
        ));
        apply(&mut state, Event::Back).unwrap();
        assert_eq!(state.step(), Step::Amount);
    }

    #[test]
    fn crypto_details_has_no_generic_navigation() {
        let mut state = at_details(PaymentMethod::Crypto, 50.0);
        assert!(apply(&mut state, Event::Back).is_err());
        assert!(apply(&mut state, Event::Continue).is_err());
        assert_eq!(state.step(), Step::Details);
    }

    // Details submission and materialization

    #[test]
    fn invalid_card_blocks_materialization() {
        let mut state = at_details(PaymentMethod::Card, 50.0);
        apply(&mut state, Event::EditCard(CardField::Name, "Jane".into())).unwrap();

        let result = apply(&mut state, Event::SubmitDetails);
        let Err(WizardError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(state.card_form().errors().get(DetailField::Card(CardField::Number)).is_some());
        assert!(state.transaction().is_none());
        assert!(state.card_data().is_none());
        assert_eq!(state.step(), Step::Details);
    }

    #[test]
    fn card_submission_materializes_transaction() {
        let state = at_review(250.0);
        let tx = state.transaction().unwrap();
        assert_eq!(tx.amount(), Amount::from_float(250.0));
        assert_eq!(tx.currency(), Currency::USD);
        assert_eq!(tx.method(), PaymentMethod::Card);
        assert_eq!(tx.amount_in_cere(), Amount::from_float(5000.0));
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.network(), None);
        assert_eq!(state.card_data().unwrap().name, "Jane Doe");
    }

    #[test]
    fn card_edits_rejected_for_other_methods() {
        let mut state = at_details(PaymentMethod::Bank, 50.0);
        let result = apply(&mut state, Event::EditCard(CardField::Cvc, "123".into()));
        assert!(matches!(
            result,
            Err(WizardError::WrongMethod {
                method: PaymentMethod::Bank,
                ..
            })
        ));
    }

    #[test]
    fn crypto_submission_records_default_network_and_token() {
        let mut state = at_details(PaymentMethod::Crypto, 100.0);
        apply(&mut state, Event::SelectNetwork(CryptoNetwork::Avalanche)).unwrap();
        apply(&mut state, Event::SetCurrency(Currency::Crypto(CryptoToken::Usdc))).unwrap();
        apply(&mut state, Event::SubmitDetails).unwrap();

        assert_eq!(state.step(), Step::Review);
        let tx = state.transaction().unwrap();
        assert_eq!(tx.network(), Some(CryptoNetwork::Ethereum));
        assert_eq!(tx.currency(), Currency::Crypto(CryptoToken::Usdc));
        assert_eq!(tx.amount_in_cere(), Amount::from_float(2000.0));
        assert!(state.card_data().is_none());

        // the picked network still drives the deposit instructions
        let Some(PaymentDetails::Crypto(instructions)) = state.details() else {
            panic!("expected crypto instructions");
        };
        assert_eq!(instructions.network, CryptoNetwork::Avalanche);
    }

    #[test]
    fn crypto_defaults_to_ethereum() {
        let mut state = at_details(PaymentMethod::Crypto, 10.0);
        apply(&mut state, Event::SubmitDetails).unwrap();
        let tx = state.transaction().unwrap();
        assert_eq!(tx.network(), Some(CryptoNetwork::Ethereum));
        assert_eq!(tx.currency(), Currency::USDT);
    }

    #[test]
    fn bank_submission_reaches_review() {
        let mut state = at_details(PaymentMethod::Bank, 75.0);
        apply(&mut state, Event::SubmitDetails).unwrap();
        assert_eq!(state.step(), Step::Review);
        assert!(matches!(state.details(), Some(PaymentDetails::Bank(_))));
        assert_eq!(state.transaction().unwrap().network(), None);
    }

    #[test]
    fn amount_in_cere_tracks_amount_at_materialization() {
        for value in [0.01, 1.0, 33.33, 250.0, 10_000.0] {
            let state = at_review(value);
            let tx = state.transaction().unwrap();
            let expected = tx.amount().to_f64() / 0.05;
            assert!((tx.amount_in_cere().to_f64() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn resubmission_creates_new_transaction() {
        let mut state = at_review(20.0);
        let first = state.transaction().unwrap().id().clone();

        apply(&mut state, Event::Back).unwrap();
        apply(&mut state, Event::SubmitDetails).unwrap();
        let second = state.transaction().unwrap().id().clone();

        assert_ne!(first, second);
    }

    #[test]
    fn navigation_never_touches_transaction_identity() {
        let mut state = at_review(20.0);
        let tx = state.transaction().unwrap().clone();

        for _ in 0..3 {
            let _ = state.navigation();
            state.retreat();
        }
        for _ in 0..6 {
            state.advance();
        }
        let after = state.transaction().unwrap();
        assert_eq!(after.id(), tx.id());
        assert_eq!(after.timestamp(), tx.timestamp());
        assert_eq!(after.status(), TransactionStatus::Pending);
    }

    // Confirmation

    #[test]
    fn confirm_marks_processing_and_requests_settlement() {
        let mut state = at_review(250.0);
        let effect = apply(&mut state, Event::Confirm).unwrap();

        let Effect::StartSettlement(snapshot) = effect else {
            panic!("expected settlement effect");
        };
        assert_eq!(snapshot.status(), TransactionStatus::Processing);
        assert!(state.is_processing());
        assert!(!state.can_cancel());
    }

    #[test]
    fn second_confirm_is_rejected_while_processing() {
        let mut state = at_review(250.0);
        apply(&mut state, Event::Confirm).unwrap();
        assert!(matches!(
            apply(&mut state, Event::Confirm),
            Err(WizardError::AlreadyProcessing)
        ));
        assert!(matches!(
            apply(&mut state, Event::Back),
            Err(WizardError::NavigationBlocked { .. })
        ));
    }

    #[test]
    fn successful_settlement_completes_and_advances() {
        let mut state = at_review(250.0);
        let id = state.transaction().unwrap().id().clone();
        apply(&mut state, Event::Confirm).unwrap();

        state.settle(Ok(())).unwrap();
        let tx = state.transaction().unwrap();
        assert_eq!(tx.status(), TransactionStatus::Completed);
        assert_eq!(tx.id(), &id);
        assert_eq!(state.step(), Step::Success);
        assert!(!state.is_processing());

        // a stray second completion changes nothing
        assert!(matches!(state.settle(Ok(())), Err(WizardError::NotProcessing)));
        assert_eq!(state.step(), Step::Success);
    }

    #[test]
    fn failed_settlement_stays_on_review_and_can_retry() {
        let mut state = at_review(250.0);
        let tx = state.transaction().unwrap().clone();
        apply(&mut state, Event::Confirm).unwrap();

        let result = state.settle(Err(PaymentError::Declined("insufficient funds".into())));
        assert!(matches!(result, Err(WizardError::Payment(PaymentError::Declined(_)))));
        assert_eq!(state.step(), Step::Review);
        assert!(!state.is_processing());
        let failed = state.transaction().unwrap();
        assert_eq!(failed.status(), TransactionStatus::Failed);
        assert_eq!(failed.id(), tx.id());
        assert_eq!(failed.timestamp(), tx.timestamp());

        apply(&mut state, Event::Confirm).unwrap();
        state.settle(Ok(())).unwrap();
        assert_eq!(state.step(), Step::Success);
        assert_eq!(state.transaction().unwrap().id(), tx.id());
    }

    #[test]
    fn confirm_outside_review_is_rejected() {
        let mut state = at_details(PaymentMethod::Card, 10.0);
        assert!(matches!(
            apply(&mut state, Event::Confirm),
            Err(WizardError::WrongStep {
                step: Step::Details,
                ..
            })
        ));
    }

    // Closing

    #[test]
    fn dismiss_closes_once() {
        let mut state = at_review(10.0);
        apply(&mut state, Event::Confirm).unwrap();
        state.settle(Ok(())).unwrap();

        assert_eq!(apply(&mut state, Event::ViewHistory).unwrap(), Effect::ViewHistory);
        assert_eq!(apply(&mut state, Event::Dismiss).unwrap(), Effect::Complete);
        assert_eq!(state.closure(), Some(Closure::Completed));
        assert!(matches!(apply(&mut state, Event::Dismiss), Err(WizardError::Closed)));
    }

    #[test]
    fn cancel_is_unavailable_on_success() {
        let mut state = at_review(10.0);
        apply(&mut state, Event::Confirm).unwrap();
        assert!(matches!(
            apply(&mut state, Event::Cancel),
            Err(WizardError::AlreadyProcessing)
        ));
        state.settle(Ok(())).unwrap();
        assert!(matches!(
            apply(&mut state, Event::Cancel),
            Err(WizardError::WrongStep {
                step: Step::Success,
                ..
            })
        ));
    }

    #[test]
    fn cancel_closes_the_wizard() {
        let mut state = at_details(PaymentMethod::Bank, 10.0);
        assert_eq!(apply(&mut state, Event::Cancel).unwrap(), Effect::Cancel);
        assert_eq!(state.closure(), Some(Closure::Cancelled));
        assert!(matches!(apply(&mut state, Event::SubmitDetails), Err(WizardError::Closed)));
    }
}
