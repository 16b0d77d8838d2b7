// Checkout wizard flow: Amount -> Currency -> Review -> Pay
use super::payment::CryptoCurrency;
use super::wizard::WizardFlow;
use serde::{Deserialize, Serialize};

pub const MIN_TOP_UP_USD: f64 = 10.0;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub amount: Option<f64>,
    pub currency: Option<CryptoCurrency>,
}

impl CheckoutDraft {
    fn amount_valid(&self) -> bool {
        self.amount
            .is_some_and(|a| a.is_finite() && a >= MIN_TOP_UP_USD)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutPatch {
    pub amount: Option<f64>,
    pub currency: Option<CryptoCurrency>,
}

pub struct CheckoutFlow;

impl WizardFlow for CheckoutFlow {
    type Draft = CheckoutDraft;
    type Patch = CheckoutPatch;

    const NAME: &'static str = "checkout";
    const STEPS: &'static [&'static str] = &["amount", "currency", "review", "pay"];

    fn step_valid(draft: &CheckoutDraft, step: usize) -> bool {
        match step {
            1 => draft.amount_valid(),
            2 => draft.currency.is_some(),
            _ => draft.amount_valid() && draft.currency.is_some(),
        }
    }

    fn apply(draft: &mut CheckoutDraft, patch: CheckoutPatch) {
        if let Some(amount) = patch.amount {
            draft.amount = Some(amount);
        }
        if let Some(currency) = patch.currency {
            draft.currency = Some(currency);
        }
    }
}
