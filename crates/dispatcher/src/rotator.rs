//! Round-robin credential selection

use contracts::DeliveryCredential;

use crate::error::DispatchError;

/// One selection made by the rotator
#[derive(Debug, Clone, Copy)]
pub struct Rotation<'a> {
    /// Position of the credential in the configured list
    pub slot: usize,
    pub credential: &'a DeliveryCredential,
}

/// Cycles through a fixed, non-empty credential list
///
/// The counter starts at 0 for every job and advances once per attempted
/// recipient, independent of the cursor.
#[derive(Debug, Clone)]
pub struct CredentialRotator {
    credentials: Vec<DeliveryCredential>,
    counter: u64,
}

impl CredentialRotator {
    /// # Errors
    /// Returns `NoCredentials` for an empty list.
    pub fn new(credentials: Vec<DeliveryCredential>) -> Result<Self, DispatchError> {
        if credentials.is_empty() {
            return Err(DispatchError::NoCredentials);
        }
        Ok(Self {
            credentials,
            counter: 0,
        })
    }

    /// Select `list[counter mod N]` and advance the counter
    pub fn next_credential(&mut self) -> Rotation<'_> {
        let slot = (self.counter % self.credentials.len() as u64) as usize;
        self.counter += 1;
        Rotation {
            slot,
            credential: &self.credentials[slot],
        }
    }

    /// Selections made so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Number of credentials in rotation
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always false; construction rejects empty lists
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
