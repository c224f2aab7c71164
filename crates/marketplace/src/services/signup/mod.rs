//! Signup workflow.
//!
//! ```text
//! CollectingBasicInfo -> CollectingCredentials -> AwaitingVerificationCode
//!     -> CollectingAddress -> Completed
//! ```
//!
//! `Failed` is entered only when the auth identity was created but the user
//! record could not be written. Every other failure keeps the current step,
//! records a message for display, and can be retried by resubmitting.
//!
//! The verification code is confirmed when it is submitted, so an identity is
//! only ever created for a confirmed phone number, and a user record is only
//! written once both confirmation and identity creation have succeeded.

mod error;
mod forms;

use std::fmt;

use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

use bazaar_core::{Email, Fssai, Gstin, Pincode, PhoneNumber, Role, UserId};

use crate::auth::AuthProvider;
use crate::db::UserRepository;
use crate::lookup::{PostalDetails, PostalLookup};
use crate::models::UserRecord;
use crate::store::DocumentStore;
use crate::validation::{ValidationError, require};
use crate::verification::{Challenge, VerificationProvider};

pub use error::SignupError;
pub use forms::{AddressForm, BasicInfoForm, Credentials, CredentialsForm};

/// Where the workflow is, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStep {
    CollectingBasicInfo,
    CollectingCredentials,
    AwaitingVerificationCode,
    CollectingAddress,
    Completed,
    Failed,
}

impl fmt::Display for SignupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CollectingBasicInfo => "collecting basic info",
            Self::CollectingCredentials => "collecting credentials",
            Self::AwaitingVerificationCode => "awaiting the verification code",
            Self::CollectingAddress => "collecting the address",
            Self::Completed => "completed",
            Self::Failed => "failed",
        })
    }
}

/// Workflow state, carrying everything entered so far.
#[derive(Debug, Clone)]
pub enum SignupState {
    CollectingBasicInfo {
        prefill: Option<BasicInfoForm>,
    },
    CollectingCredentials {
        basic: BasicInfoForm,
        prefill: Option<CredentialsForm>,
    },
    AwaitingVerificationCode {
        basic: BasicInfoForm,
        credentials: Credentials,
        challenge: Challenge,
    },
    CollectingAddress {
        basic: BasicInfoForm,
        credentials: Credentials,
        phone: PhoneNumber,
        draft: AddressForm,
    },
    Completed {
        record: UserRecord,
    },
    Failed {
        reason: String,
        orphaned_uid: Option<UserId>,
    },
}

impl SignupState {
    #[must_use]
    pub const fn step(&self) -> SignupStep {
        match self {
            Self::CollectingBasicInfo { .. } => SignupStep::CollectingBasicInfo,
            Self::CollectingCredentials { .. } => SignupStep::CollectingCredentials,
            Self::AwaitingVerificationCode { .. } => SignupStep::AwaitingVerificationCode,
            Self::CollectingAddress { .. } => SignupStep::CollectingAddress,
            Self::Completed { .. } => SignupStep::Completed,
            Self::Failed { .. } => SignupStep::Failed,
        }
    }
}

/// One user's pass through signup.
pub struct SignupWorkflow<'a, A, V, S, P> {
    auth: &'a A,
    verifier: &'a V,
    store: &'a S,
    postal: &'a P,
    role: Role,
    state: SignupState,
    last_error: Option<String>,
}

impl<'a, A, V, S, P> SignupWorkflow<'a, A, V, S, P>
where
    A: AuthProvider,
    V: VerificationProvider,
    S: DocumentStore,
    P: PostalLookup,
{
    /// Start a signup for an account with `role`.
    #[must_use]
    pub const fn new(auth: &'a A, verifier: &'a V, store: &'a S, postal: &'a P, role: Role) -> Self {
        Self {
            auth,
            verifier,
            store,
            postal,
            role,
            state: SignupState::CollectingBasicInfo { prefill: None },
            last_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &SignupState {
        &self.state
    }

    #[must_use]
    pub const fn step(&self) -> SignupStep {
        self.state.step()
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Message from the most recent failed action, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The written record, once completed.
    #[must_use]
    pub const fn record(&self) -> Option<&UserRecord> {
        match &self.state {
            SignupState::Completed { record } => Some(record),
            _ => None,
        }
    }

    /// Step 1. Only checks that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Validation` if a field is blank.
    pub fn submit_basic_info(&mut self, form: BasicInfoForm) -> Result<(), SignupError> {
        let SignupState::CollectingBasicInfo { .. } = &self.state else {
            return Err(self.wrong_step("submit basic info"));
        };

        let checked = require("Name", &form.name)
            .and_then(|_| require("Email", &form.email))
            .and_then(|_| require("Password", form.password.expose_secret()))
            .and_then(|_| require("Phone number", &form.phone));
        if let Err(e) = checked {
            self.state = SignupState::CollectingBasicInfo {
                prefill: Some(form),
            };
            return Err(self.reject(e));
        }

        self.advance(SignupState::CollectingCredentials {
            basic: form,
            prefill: None,
        });
        Ok(())
    }

    /// Step 2. Validates GSTIN then FSSAI, then requests a code for the
    /// `+91` phone number.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Validation` for a malformed GSTIN, FSSAI or phone
    /// number, and `SignupError::Verification` if the code request fails.
    #[instrument(skip_all, fields(role = %self.role))]
    pub async fn submit_credentials(&mut self, form: CredentialsForm) -> Result<(), SignupError> {
        let SignupState::CollectingCredentials { basic, .. } = &self.state else {
            return Err(self.wrong_step("submit credentials"));
        };
        let basic = basic.clone();

        let validated = Gstin::parse(&form.gstin)
            .map_err(ValidationError::from)
            .and_then(|gstin| Ok((gstin, Fssai::parse(&form.fssai)?)))
            .and_then(|(gstin, fssai)| {
                Ok((gstin, fssai, PhoneNumber::from_local(&basic.phone)?))
            });
        let (gstin, fssai, phone) = match validated {
            Ok(v) => v,
            Err(e) => {
                self.state = SignupState::CollectingCredentials {
                    basic,
                    prefill: Some(form),
                };
                return Err(self.reject(e));
            }
        };

        let challenge = match self.verifier.request_code(&phone).await {
            Ok(challenge) => challenge,
            Err(e) => {
                warn!(error = %e, "Verification code request failed");
                self.state = SignupState::CollectingCredentials {
                    basic,
                    prefill: Some(form),
                };
                return Err(self.reject(e));
            }
        };

        info!(phone = %phone, "Verification code requested");
        self.advance(SignupState::AwaitingVerificationCode {
            basic,
            credentials: Credentials { gstin, fssai },
            challenge,
        });
        Ok(())
    }

    /// Request a fresh code, replacing the outstanding challenge.
    ///
    /// The superseded challenge is invalidated with the provider, so only the
    /// latest code confirms.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Verification` if the request fails; the old
    /// challenge stays in place.
    pub async fn resend_code(&mut self) -> Result<(), SignupError> {
        let SignupState::AwaitingVerificationCode { challenge, .. } = &self.state else {
            return Err(self.wrong_step("resend the code"));
        };
        let superseded = challenge.clone();

        let fresh = match self.verifier.request_code(&superseded.phone).await {
            Ok(fresh) => fresh,
            Err(e) => return Err(self.reject(e)),
        };
        self.invalidate(&superseded).await;

        if let SignupState::AwaitingVerificationCode { challenge, .. } = &mut self.state {
            *challenge = fresh;
        }
        self.last_error = None;
        Ok(())
    }

    /// Step 3. Confirms the code with the provider before moving on.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Validation` for a blank code and
    /// `SignupError::Verification` if the provider rejects it. The challenge
    /// stays usable for another attempt.
    #[instrument(skip_all)]
    pub async fn submit_code(&mut self, code: &str) -> Result<(), SignupError> {
        let SignupState::AwaitingVerificationCode {
            basic,
            credentials,
            challenge,
        } = &self.state
        else {
            return Err(self.wrong_step("submit a verification code"));
        };

        let code = match require("Verification code", code) {
            Ok(code) => code,
            Err(e) => return Err(self.reject(e)),
        };

        if let Err(e) = self.verifier.confirm(challenge, code).await {
            return Err(self.reject(e));
        }

        info!(phone = %challenge.phone, "Phone number verified");
        let next = SignupState::CollectingAddress {
            basic: basic.clone(),
            credentials: credentials.clone(),
            phone: challenge.phone.clone(),
            draft: AddressForm::default(),
        };
        self.advance(next);
        Ok(())
    }

    /// Record a pincode edit on the address step.
    ///
    /// When the field reaches six characters the postal collaborator is
    /// asked for the district and state, which fill city and state. Lookup
    /// failures are logged and otherwise ignored.
    pub async fn pincode_changed(&mut self, pincode: &str) -> Option<PostalDetails> {
        let SignupState::CollectingAddress { draft, .. } = &mut self.state else {
            return None;
        };
        pincode.clone_into(&mut draft.pincode);

        if !Pincode::is_complete_input(pincode) {
            return None;
        }
        let pincode = match Pincode::parse(pincode) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Not looking up malformed pincode");
                return None;
            }
        };

        let details = match self.postal.lookup(&pincode).await {
            Ok(details) => details,
            Err(e) => {
                warn!(pincode = %pincode, error = %e, "Pincode lookup failed");
                return None;
            }
        };

        // The form may have moved on while the lookup was outstanding.
        if let SignupState::CollectingAddress { draft, .. } = &mut self.state
            && draft.pincode == pincode.as_str()
        {
            draft.city.clone_from(&details.district);
            draft.state.clone_from(&details.state);
        }
        Some(details)
    }

    /// Step 4. Creates the identity, tags it with the role, and writes the
    /// user record.
    ///
    /// # Errors
    ///
    /// - `SignupError::Validation` if an address field is blank
    /// - `SignupError::Auth` if the identity cannot be created (step unchanged)
    /// - `SignupError::RecordWrite` if the identity was created but the record
    ///   write failed; the workflow is then `Failed`
    #[instrument(skip_all, fields(role = %self.role))]
    pub async fn submit_address(&mut self, form: AddressForm) -> Result<UserRecord, SignupError> {
        let SignupState::CollectingAddress {
            basic,
            credentials,
            phone,
            ..
        } = &self.state
        else {
            return Err(self.wrong_step("submit the address"));
        };
        let (basic, credentials, phone) = (basic.clone(), credentials.clone(), phone.clone());

        let checked = require("Address", &form.address)
            .and_then(|_| require("Pincode", &form.pincode))
            .and_then(|_| require("City", &form.city))
            .and_then(|_| require("State", &form.state));
        if let Err(e) = checked {
            self.keep_address_draft(form);
            return Err(self.reject(e));
        }

        let identity = match self.auth.create_identity(&basic.email, &basic.password).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Identity creation failed");
                self.keep_address_draft(form);
                return Err(self.reject(e));
            }
        };

        if let Err(e) = self
            .auth
            .set_display_attribute(&identity.uid, self.role.as_str())
            .await
        {
            // The record also carries the role, so the session can still
            // be resolved.
            warn!(uid = %identity.uid, error = %e, "Could not set role display attribute");
        }

        let record = UserRecord {
            uid: identity.uid.clone(),
            name: basic.name.trim().to_owned(),
            email: identity.email.clone(),
            phone,
            gstin: credentials.gstin,
            fssai: credentials.fssai,
            address: form.address.trim().to_owned(),
            city: form.city.trim().to_owned(),
            state: form.state.trim().to_owned(),
            pincode: form.pincode.trim().to_owned(),
            role: self.role,
        };

        if let Err(source) = UserRepository::new(self.store).create(&record).await {
            let error = SignupError::RecordWrite {
                uid: identity.uid.clone(),
                source,
            };
            warn!(uid = %identity.uid, error = %error, "User record write failed after identity creation");
            self.last_error = Some(error.to_string());
            self.state = SignupState::Failed {
                reason: error.to_string(),
                orphaned_uid: Some(identity.uid),
            };
            return Err(error);
        }

        info!(uid = %record.uid, "Signup completed");
        self.advance(SignupState::Completed {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Return to the previous collecting step, keeping entered data as
    /// prefill. Leaving the code step invalidates the outstanding challenge.
    ///
    /// Returns `false` if there is no previous step.
    pub async fn back(&mut self) -> bool {
        let (previous, abandoned) = match &self.state {
            SignupState::CollectingCredentials { basic, .. } => (
                SignupState::CollectingBasicInfo {
                    prefill: Some(basic.clone()),
                },
                None,
            ),
            SignupState::AwaitingVerificationCode {
                basic,
                credentials,
                challenge,
            } => (
                SignupState::CollectingCredentials {
                    basic: basic.clone(),
                    prefill: Some(CredentialsForm::from(credentials)),
                },
                Some(challenge.clone()),
            ),
            SignupState::CollectingAddress {
                basic, credentials, ..
            } => (
                SignupState::CollectingCredentials {
                    basic: basic.clone(),
                    prefill: Some(CredentialsForm::from(credentials)),
                },
                None,
            ),
            SignupState::CollectingBasicInfo { .. }
            | SignupState::Completed { .. }
            | SignupState::Failed { .. } => return false,
        };

        if let Some(challenge) = abandoned {
            info!("Abandoning phone verification");
            self.invalidate(&challenge).await;
        }
        self.advance(previous);
        true
    }

    /// Invalidate a challenge the workflow no longer holds. A provider
    /// failure is logged; the challenge expires on the provider's side.
    async fn invalidate(&self, challenge: &Challenge) {
        if let Err(e) = self.verifier.invalidate(challenge).await {
            warn!(error = %e, "Could not invalidate verification challenge");
        }
    }

    /// The email the identity will be (or was) created with.
    #[must_use]
    pub fn email(&self) -> Option<Email> {
        let raw = match &self.state {
            SignupState::CollectingBasicInfo { prefill } => prefill.as_ref()?.email.as_str(),
            SignupState::CollectingCredentials { basic, .. }
            | SignupState::AwaitingVerificationCode { basic, .. }
            | SignupState::CollectingAddress { basic, .. } => basic.email.as_str(),
            SignupState::Completed { record } => return Some(record.email.clone()),
            SignupState::Failed { .. } => return None,
        };
        Email::parse(raw).ok()
    }

    fn keep_address_draft(&mut self, form: AddressForm) {
        if let SignupState::CollectingAddress { draft, .. } = &mut self.state {
            *draft = form;
        }
    }

    fn advance(&mut self, next: SignupState) {
        info!(from = %self.state.step(), to = %next.step(), "Signup step");
        self.state = next;
        self.last_error = None;
    }

    fn reject(&mut self, error: impl Into<SignupError>) -> SignupError {
        let error = error.into();
        self.last_error = Some(error.to_string());
        error
    }

    fn wrong_step(&mut self, action: &'static str) -> SignupError {
        self.reject(SignupError::WrongStep {
            action,
            step: self.state.step(),
        })
    }
}
