// Checkout service - crypto quotes and the top-up wizard
use crate::application::account_service::AccountService;
use crate::application::session_service::{SessionError, SessionService};
use crate::application::wizard_registry::{RegistryError, WizardRegistry, WizardView};
use crate::domain::catalog::Transaction;
use crate::domain::checkout::{CheckoutDraft, CheckoutFlow};
use crate::domain::payment::{quote, CryptoCurrency, PaymentAddresses, Quote};
use crate::domain::user::{FormError, User};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Wizard(#[from] RegistryError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Validation(#[from] FormError),
}

#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub wizard: WizardView<CheckoutDraft>,
    pub quote: Quote,
    pub transaction: Transaction,
    pub user: User,
}

#[derive(Clone)]
pub struct CheckoutService {
    wizards: WizardRegistry<CheckoutFlow>,
    session: SessionService,
    accounts: AccountService,
    addresses: PaymentAddresses,
    confirmation_delay: Duration,
}

impl CheckoutService {
    pub fn new(
        session: SessionService,
        accounts: AccountService,
        addresses: PaymentAddresses,
        confirmation_delay: Duration,
    ) -> Self {
        Self {
            wizards: WizardRegistry::new(),
            session,
            accounts,
            addresses,
            confirmation_delay,
        }
    }

    pub fn wizards(&self) -> &WizardRegistry<CheckoutFlow> {
        &self.wizards
    }

    pub fn quote(&self, usd: f64, currency: CryptoCurrency) -> Result<Quote, CheckoutError> {
        if !usd.is_finite() || usd <= 0.0 {
            return Err(FormError::new("amount", "amount must be a positive number").into());
        }
        Ok(quote(usd, currency, &self.addresses))
    }

    /// Terminal "Pay" action: wait for the pretend confirmation, then credit
    /// the balance and record the transaction.
    pub async fn submit(&self, id: Uuid) -> Result<Receipt, CheckoutError> {
        self.session.require_user().await?;
        let draft = self.wizards.begin_submit(id).await?;

        match self.settle(&draft).await {
            Ok((quote, transaction, user)) => {
                let wizard = self.wizards.finish_submit(id).await?;
                Ok(Receipt {
                    wizard,
                    quote,
                    transaction,
                    user,
                })
            }
            Err(e) => {
                tracing::warn!("Checkout wizard {} failed: {}", id, e);
                self.wizards.abort_submit(id).await;
                Err(e)
            }
        }
    }

    async fn settle(&self, draft: &CheckoutDraft) -> Result<(Quote, Transaction, User), CheckoutError> {
        let (Some(usd), Some(currency)) = (draft.amount, draft.currency) else {
            return Err(FormError::new("amount", "amount and currency are required").into());
        };
        let quote = self.quote(usd, currency)?;

        tokio::time::sleep(self.confirmation_delay).await;

        // The user may have signed out while the payment was confirming
        let user = self
            .session
            .update_balance(usd)
            .await?
            .ok_or(SessionError::Unauthorized)?;
        let transaction = self
            .accounts
            .record_transaction(usd, currency.code(), Some(quote.amount))
            .await;

        tracing::info!(
            "Credited {:.2} USD ({} {}) to {}",
            usd,
            quote.amount,
            currency.code(),
            user.email
        );
        Ok((quote, transaction, user))
    }
}
